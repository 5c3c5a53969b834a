use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::auth::extractor::AuthUser;
use crate::auth::jwt::generate_token;
use crate::auth::password::{hash_password, validate_password_strength, verify_password};
use crate::errors::AppError;
use crate::models::user::{NewUser, User};
use crate::state::AppState;
use crate::store::StoreError;

#[derive(Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    pub full_name: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

#[derive(Serialize)]
pub struct MeResponse {
    pub user: User,
}

fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

fn issue_token(state: &AppState, user: User) -> Result<AuthResponse, AppError> {
    let token = generate_token(user.id, &user.email, &state.config.jwt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("token generation failed: {e}")))?;
    Ok(AuthResponse { token, user })
}

/// POST /api/auth/register
pub async fn handle_register(
    State(state): State<AppState>,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let Json(req) = body?;
    let email = normalize_email(&req.email);
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::Validation("A valid email is required".into()));
    }
    validate_password_strength(&req.password).map_err(AppError::Validation)?;

    let password = req.password;
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AppError::Internal(e.into()))?
        .map_err(|e| AppError::Internal(anyhow::anyhow!("password hashing failed: {e}")))?;

    let full_name = req
        .full_name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty());

    let user = state
        .store
        .create_user(NewUser {
            email,
            password_hash,
            full_name,
        })
        .await?;

    info!("Registered user {}", user.id);
    Ok((StatusCode::CREATED, Json(issue_token(&state, user)?)))
}

/// POST /api/auth/login
pub async fn handle_login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>, AppError> {
    let Json(req) = body?;
    let invalid = || AppError::Unauthorized("Invalid email or password".into());

    let email = normalize_email(&req.email);
    let user = state
        .store
        .find_user_by_email(&email)
        .await?
        .ok_or_else(invalid)?;

    let password = req.password;
    let stored_hash = user.password_hash.clone();
    let valid = tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash))
        .await
        .map_err(|e| AppError::Internal(e.into()))?
        .map_err(|e| AppError::Internal(anyhow::anyhow!("password verification failed: {e}")))?;

    if !valid {
        warn!("Failed login for user {}", user.id);
        return Err(invalid());
    }

    Ok(Json(issue_token(&state, user)?))
}

/// GET /api/auth/me
pub async fn handle_me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<MeResponse>, AppError> {
    // A valid token for a since-removed account is treated as unauthenticated.
    let user = state
        .store
        .get_user(auth.user_id)
        .await
        .map_err(|e| match e {
            StoreError::NotFound(_) => AppError::Unauthorized("Account no longer exists".into()),
            other => other.into(),
        })?;
    Ok(Json(MeResponse { user }))
}
