pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::analysis::extractor::MAX_INPUT_BYTES;
use crate::analysis::handlers as resume;
use crate::auth::handlers as auth;
use crate::matching::handlers as jobs;
use crate::state::AppState;

/// Room for multipart framing on top of a maximum-size document.
const BODY_OVERHEAD_BYTES: usize = 64 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health::health_handler))
        // Auth
        .route("/api/auth/register", post(auth::handle_register))
        .route("/api/auth/login", post(auth::handle_login))
        .route("/api/auth/me", get(auth::handle_me))
        // Resumes
        .route("/api/resume/upload", post(resume::handle_upload))
        .route("/api/resume/analyze", post(resume::handle_analyze))
        .route("/api/resume/list", get(resume::handle_list))
        .route(
            "/api/resume/:id",
            get(resume::handle_get).delete(resume::handle_delete),
        )
        // Jobs
        .route("/api/jobs/list", get(jobs::handle_list_jobs))
        .route("/api/jobs/create", post(jobs::handle_create_job))
        .route("/api/jobs/match/:resume_id", get(jobs::handle_match))
        .route("/api/jobs/:id", get(jobs::handle_get_job))
        .layer(DefaultBodyLimit::max(MAX_INPUT_BYTES + BODY_OVERHEAD_BYTES))
        .with_state(state)
}
