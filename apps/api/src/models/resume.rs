use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Highest education level detected in a resume. Variant order is rank order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EducationLevel {
    #[default]
    Unspecified,
    HighSchool,
    Associate,
    Bachelor,
    Master,
    Phd,
}

impl EducationLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            EducationLevel::Unspecified => "unspecified",
            EducationLevel::HighSchool => "high_school",
            EducationLevel::Associate => "associate",
            EducationLevel::Bachelor => "bachelor",
            EducationLevel::Master => "master",
            EducationLevel::Phd => "phd",
        }
    }
}

impl fmt::Display for EducationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EducationLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unspecified" => Ok(EducationLevel::Unspecified),
            "high_school" => Ok(EducationLevel::HighSchool),
            "associate" => Ok(EducationLevel::Associate),
            "bachelor" => Ok(EducationLevel::Bachelor),
            "master" => Ok(EducationLevel::Master),
            "phd" => Ok(EducationLevel::Phd),
            other => Err(format!("unknown education level '{other}'")),
        }
    }
}

/// A stored, analyzed resume.
///
/// The serialized form is exactly the field set the web client reads; owner,
/// canonical text and archive location stay server-side.
#[derive(Debug, Clone, Serialize)]
pub struct Resume {
    pub id: Uuid,
    #[serde(skip)]
    pub owner: Uuid,
    pub filename: String,
    #[serde(skip)]
    pub raw_text: String,
    pub skills: Vec<String>,
    pub has_email: bool,
    pub has_phone: bool,
    pub education: EducationLevel,
    pub experience_years: u32,
    pub word_count: u32,
    pub ats_score: u32,
    #[serde(skip)]
    pub archive_key: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Everything needed to persist a resume. Produced by the analysis pipeline.
#[derive(Debug, Clone)]
pub struct NewResume {
    pub id: Uuid,
    pub owner: Uuid,
    pub filename: String,
    pub raw_text: String,
    pub skills: Vec<String>,
    pub has_email: bool,
    pub has_phone: bool,
    pub education: EducationLevel,
    pub experience_years: u32,
    pub word_count: u32,
    pub ats_score: u32,
    pub archive_key: Option<String>,
}

impl NewResume {
    pub fn into_resume(self, created_at: DateTime<Utc>) -> Resume {
        Resume {
            id: self.id,
            owner: self.owner,
            filename: self.filename,
            raw_text: self.raw_text,
            skills: self.skills,
            has_email: self.has_email,
            has_phone: self.has_phone,
            education: self.education,
            experience_years: self.experience_years,
            word_count: self.word_count,
            ats_score: self.ats_score,
            archive_key: self.archive_key,
            created_at,
        }
    }
}
