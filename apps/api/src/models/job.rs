use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A posting in the shared job catalog.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Job {
    pub id: Uuid,
    pub title: String,
    pub company: String,
    pub location: Option<String>,
    pub salary_range: Option<String>,
    pub description: String,
    pub requirements: Option<String>,
    /// Normalized skill names, deduplicated, in the order they were supplied.
    pub required_skills: Vec<String>,
    /// Free text such as "3+ years".
    pub experience_required: Option<String>,
    pub education_required: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Validated job input with normalized `required_skills`.
#[derive(Debug, Clone)]
pub struct NewJob {
    pub title: String,
    pub company: String,
    pub location: Option<String>,
    pub salary_range: Option<String>,
    pub description: String,
    pub requirements: Option<String>,
    pub required_skills: Vec<String>,
    pub experience_required: Option<String>,
    pub education_required: Option<String>,
}

impl NewJob {
    pub fn into_job(self, id: Uuid, created_at: DateTime<Utc>) -> Job {
        Job {
            id,
            title: self.title,
            company: self.company,
            location: self.location,
            salary_range: self.salary_range,
            description: self.description,
            requirements: self.requirements,
            required_skills: self.required_skills,
            experience_required: self.experience_required,
            education_required: self.education_required,
            created_at,
        }
    }
}
