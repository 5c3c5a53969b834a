use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::job::{Job, NewJob};
use crate::models::resume::{NewResume, Resume};
use crate::models::user::{NewUser, User};
use crate::store::{Store, StoreError};

/// In-process store. Each map sits behind its own lock, so a delete and a read
/// of the same resume are serialized while jobs and users stay independent.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<Uuid, User>>,
    resumes: RwLock<HashMap<Uuid, Resume>>,
    jobs: RwLock<HashMap<Uuid, Job>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn check_owner(resume: &Resume, requester: Uuid) -> Result<(), StoreError> {
    if resume.owner != requester {
        return Err(StoreError::Forbidden);
    }
    Ok(())
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_user(&self, new: NewUser) -> Result<User, StoreError> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == new.email) {
            return Err(StoreError::Conflict(format!(
                "An account with email {} already exists",
                new.email
            )));
        }
        let user = User {
            id: Uuid::new_v4(),
            email: new.email,
            password_hash: new.password_hash,
            full_name: new.full_name,
            created_at: Utc::now(),
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn get_user(&self, id: Uuid) -> Result<User, StoreError> {
        let users = self.users.read().await;
        users.get(&id).cloned().ok_or(StoreError::NotFound("User"))
    }

    async fn create_resume(&self, new: NewResume) -> Result<Resume, StoreError> {
        let mut resumes = self.resumes.write().await;
        if resumes.contains_key(&new.id) {
            return Err(StoreError::Conflict(format!("Resume {} already exists", new.id)));
        }
        let resume = new.into_resume(Utc::now());
        resumes.insert(resume.id, resume.clone());
        Ok(resume)
    }

    async fn get_resume(&self, id: Uuid, requester: Uuid) -> Result<Resume, StoreError> {
        let resumes = self.resumes.read().await;
        let resume = resumes.get(&id).ok_or(StoreError::NotFound("Resume"))?;
        check_owner(resume, requester)?;
        Ok(resume.clone())
    }

    async fn list_resumes(&self, owner: Uuid) -> Result<Vec<Resume>, StoreError> {
        let resumes = self.resumes.read().await;
        let mut owned: Vec<Resume> = resumes
            .values()
            .filter(|r| r.owner == owner)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(owned)
    }

    async fn delete_resume(&self, id: Uuid, requester: Uuid) -> Result<Resume, StoreError> {
        let mut resumes = self.resumes.write().await;
        let resume = resumes.get(&id).ok_or(StoreError::NotFound("Resume"))?;
        check_owner(resume, requester)?;
        resumes.remove(&id).ok_or(StoreError::NotFound("Resume"))
    }

    async fn create_job(&self, new: NewJob) -> Result<Job, StoreError> {
        let job = new.into_job(Uuid::new_v4(), Utc::now());
        self.jobs.write().await.insert(job.id, job.clone());
        Ok(job)
    }

    async fn get_job(&self, id: Uuid) -> Result<Job, StoreError> {
        let jobs = self.jobs.read().await;
        jobs.get(&id).cloned().ok_or(StoreError::NotFound("Job"))
    }

    async fn list_jobs(&self) -> Result<Vec<Job>, StoreError> {
        let jobs = self.jobs.read().await;
        let mut all: Vec<Job> = jobs.values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(all)
    }
}
