use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::matching::matcher::{normalize_required_skills, rank_jobs, JobMatch};
use crate::models::job::{Job, NewJob};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct CreateJobRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub description: String,
    pub required_skills: Option<Vec<String>>,
    pub location: Option<String>,
    pub salary_range: Option<String>,
    pub requirements: Option<String>,
    pub experience_required: Option<String>,
    pub education_required: Option<String>,
}

#[derive(Serialize)]
pub struct JobResponse {
    pub job: Job,
}

#[derive(Serialize)]
pub struct CreatedJobResponse {
    pub message: &'static str,
    pub job: Job,
}

#[derive(Serialize)]
pub struct JobListResponse {
    pub jobs: Vec<Job>,
}

#[derive(Serialize)]
pub struct MatchListResponse {
    pub matches: Vec<JobMatch>,
}

fn optional_text(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// GET /api/jobs/list
pub async fn handle_list_jobs(
    State(state): State<AppState>,
) -> Result<Json<JobListResponse>, AppError> {
    let jobs = state.store.list_jobs().await?;
    Ok(Json(JobListResponse { jobs }))
}

/// GET /api/jobs/:id
pub async fn handle_get_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<JobResponse>, AppError> {
    let job = state.store.get_job(id).await?;
    Ok(Json(JobResponse { job }))
}

/// GET /api/jobs/match/:resume_id
pub async fn handle_match(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(resume_id): Path<Uuid>,
) -> Result<Json<MatchListResponse>, AppError> {
    let resume = state.store.get_resume(resume_id, auth.user_id).await?;
    let jobs = state.store.list_jobs().await?;
    let job_count = jobs.len();

    let scorer = state.match_scorer.clone();
    let matches = tokio::task::spawn_blocking(move || rank_jobs(scorer.as_ref(), &resume, jobs))
        .await
        .map_err(|e| AppError::Internal(e.into()))?;

    info!(
        user_id = %auth.user_id,
        %resume_id,
        jobs = job_count,
        suitable = matches.iter().filter(|m| m.outcome.match_score >= 50).count(),
        "Ranked job catalog"
    );
    Ok(Json(MatchListResponse { matches }))
}

/// POST /api/jobs/create
pub async fn handle_create_job(
    State(state): State<AppState>,
    auth: AuthUser,
    body: Result<Json<CreateJobRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedJobResponse>), AppError> {
    let missing = || AppError::Validation("Missing required fields".into());

    let Json(req) = body.map_err(|_| missing())?;
    let title = req.title.trim().to_string();
    let company = req.company.trim().to_string();
    let description = req.description.trim().to_string();
    let raw_skills = req.required_skills.ok_or_else(missing)?;
    if title.is_empty() || company.is_empty() || description.is_empty() {
        return Err(missing());
    }

    let required_skills =
        normalize_required_skills(&state.lexicon, &raw_skills).map_err(AppError::Validation)?;

    let job = state
        .store
        .create_job(NewJob {
            title,
            company,
            location: optional_text(req.location),
            salary_range: optional_text(req.salary_range),
            description,
            requirements: optional_text(req.requirements),
            required_skills,
            experience_required: optional_text(req.experience_required),
            education_required: optional_text(req.education_required),
        })
        .await?;

    info!(
        job_id = %job.id,
        created_by = %auth.email,
        skills = job.required_skills.len(),
        "Created job"
    );
    Ok((
        StatusCode::CREATED,
        Json(CreatedJobResponse {
            message: "Job created successfully",
            job,
        }),
    ))
}
