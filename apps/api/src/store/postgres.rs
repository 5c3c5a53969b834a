use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::info;
use uuid::Uuid;

use crate::models::job::{Job, NewJob};
use crate::models::resume::{NewResume, Resume};
use crate::models::user::{NewUser, User};
use crate::store::{Store, StoreError};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Row shape of `resumes`; converted into the domain `Resume` on read.
#[derive(Debug, FromRow)]
struct ResumeRow {
    id: Uuid,
    user_id: Uuid,
    filename: String,
    raw_text: String,
    skills: Vec<String>,
    has_email: bool,
    has_phone: bool,
    education: String,
    experience_years: i32,
    word_count: i32,
    ats_score: i32,
    archive_key: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<ResumeRow> for Resume {
    type Error = StoreError;

    fn try_from(row: ResumeRow) -> Result<Self, Self::Error> {
        let non_negative = |field: &str, v: i32| {
            u32::try_from(v)
                .map_err(|_| StoreError::Corrupt(format!("resume {} has negative {field}", row.id)))
        };
        Ok(Resume {
            id: row.id,
            owner: row.user_id,
            education: row.education.parse().map_err(StoreError::Corrupt)?,
            experience_years: non_negative("experience_years", row.experience_years)?,
            word_count: non_negative("word_count", row.word_count)?,
            ats_score: non_negative("ats_score", row.ats_score)?,
            filename: row.filename,
            raw_text: row.raw_text,
            skills: row.skills,
            has_email: row.has_email,
            has_phone: row.has_phone,
            archive_key: row.archive_key,
            created_at: row.created_at,
        })
    }
}

fn to_i32(field: &str, v: u32) -> Result<i32, StoreError> {
    i32::try_from(v).map_err(|_| StoreError::Corrupt(format!("{field} {v} is out of range")))
}

fn map_unique_violation(err: sqlx::Error, message: String) -> StoreError {
    match err {
        sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::Conflict(message),
        other => StoreError::Database(other),
    }
}

#[async_trait]
impl Store for PgStore {
    async fn create_user(&self, new: NewUser) -> Result<User, StoreError> {
        let email = new.email.clone();
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, email, password_hash, full_name, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&new.email)
        .bind(&new.password_hash)
        .bind(&new.full_name)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            map_unique_violation(e, format!("An account with email {email} already exists"))
        })
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(
            sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
                .bind(email)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn get_user(&self, id: Uuid) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound("User"))
    }

    async fn create_resume(&self, new: NewResume) -> Result<Resume, StoreError> {
        let row = sqlx::query_as::<_, ResumeRow>(
            r#"
            INSERT INTO resumes
                (id, user_id, filename, raw_text, skills, has_email, has_phone,
                 education, experience_years, word_count, ats_score, archive_key, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING *
            "#,
        )
        .bind(new.id)
        .bind(new.owner)
        .bind(&new.filename)
        .bind(&new.raw_text)
        .bind(&new.skills)
        .bind(new.has_email)
        .bind(new.has_phone)
        .bind(new.education.as_str())
        .bind(to_i32("experience_years", new.experience_years)?)
        .bind(to_i32("word_count", new.word_count)?)
        .bind(to_i32("ats_score", new.ats_score)?)
        .bind(&new.archive_key)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, format!("Resume {} already exists", new.id)))?;

        info!("Inserted resume {} for user {}", row.id, row.user_id);
        row.try_into()
    }

    async fn get_resume(&self, id: Uuid, requester: Uuid) -> Result<Resume, StoreError> {
        let row = sqlx::query_as::<_, ResumeRow>("SELECT * FROM resumes WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound("Resume"))?;

        if row.user_id != requester {
            return Err(StoreError::Forbidden);
        }
        row.try_into()
    }

    async fn list_resumes(&self, owner: Uuid) -> Result<Vec<Resume>, StoreError> {
        sqlx::query_as::<_, ResumeRow>(
            "SELECT * FROM resumes WHERE user_id = $1 ORDER BY created_at DESC, id ASC",
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(Resume::try_from)
        .collect()
    }

    async fn delete_resume(&self, id: Uuid, requester: Uuid) -> Result<Resume, StoreError> {
        // Row lock serializes this against concurrent deletes of the same resume.
        let mut tx = self.pool.begin().await?;

        let owner: Option<Uuid> =
            sqlx::query_scalar("SELECT user_id FROM resumes WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;

        match owner {
            None => return Err(StoreError::NotFound("Resume")),
            Some(owner) if owner != requester => return Err(StoreError::Forbidden),
            Some(_) => {}
        }

        let row = sqlx::query_as::<_, ResumeRow>("DELETE FROM resumes WHERE id = $1 RETURNING *")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        info!("Deleted resume {id} for user {requester}");
        row.try_into()
    }

    async fn create_job(&self, new: NewJob) -> Result<Job, StoreError> {
        let job = sqlx::query_as::<_, Job>(
            r#"
            INSERT INTO jobs
                (id, title, company, location, salary_range, description, requirements,
                 required_skills, experience_required, education_required, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&new.title)
        .bind(&new.company)
        .bind(&new.location)
        .bind(&new.salary_range)
        .bind(&new.description)
        .bind(&new.requirements)
        .bind(&new.required_skills)
        .bind(&new.experience_required)
        .bind(&new.education_required)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        info!("Inserted job {} ({} @ {})", job.id, job.title, job.company);
        Ok(job)
    }

    async fn get_job(&self, id: Uuid) -> Result<Job, StoreError> {
        sqlx::query_as::<_, Job>("SELECT * FROM jobs WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound("Job"))
    }

    async fn list_jobs(&self) -> Result<Vec<Job>, StoreError> {
        Ok(
            sqlx::query_as::<_, Job>("SELECT * FROM jobs ORDER BY created_at DESC, id ASC")
                .fetch_all(&self.pool)
                .await?,
        )
    }
}
