//! Resume/Job Store: persistence seam.
//!
//! `AppState` carries an `Arc<dyn Store>`: `PgStore` when `DATABASE_URL` is set,
//! `MemoryStore` otherwise (and in tests).
//!
//! Ownership checks live here so every backend distinguishes a missing resume
//! (`NotFound`) from one that belongs to someone else (`Forbidden`).

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::job::{Job, NewJob};
use crate::models::resume::{NewResume, Resume};
use crate::models::user::{NewUser, User};

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("resource belongs to another account")]
    Forbidden,

    #[error("{0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("stored row is invalid: {0}")]
    Corrupt(String),
}

#[async_trait]
pub trait Store: Send + Sync {
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn get_user(&self, id: Uuid) -> Result<User, StoreError>;

    async fn create_resume(&self, resume: NewResume) -> Result<Resume, StoreError>;
    /// Fails with `Forbidden` when `requester` is not the owner.
    async fn get_resume(&self, id: Uuid, requester: Uuid) -> Result<Resume, StoreError>;
    /// Newest first.
    async fn list_resumes(&self, owner: Uuid) -> Result<Vec<Resume>, StoreError>;
    /// Hard delete. Returns the removed resume.
    async fn delete_resume(&self, id: Uuid, requester: Uuid) -> Result<Resume, StoreError>;

    async fn create_job(&self, job: NewJob) -> Result<Job, StoreError>;
    async fn get_job(&self, id: Uuid) -> Result<Job, StoreError>;
    /// Newest first.
    async fn list_jobs(&self) -> Result<Vec<Job>, StoreError>;
}
