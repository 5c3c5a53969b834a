use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::JsonRejection,
        Multipart, Path, State,
    },
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::analysis::extractor::{
    canonicalize, check_size, extract_text, DocumentFormat, MAX_INPUT_BYTES,
};
use crate::analysis::pipeline::{analyze, AnalysisSummary};
use crate::archive::object_key;
use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::resume::Resume;
use crate::state::AppState;

/// Filename recorded for resumes submitted as pasted text.
pub const PASTED_FILENAME: &str = "pasted_resume.txt";

#[derive(Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub text: String,
}

#[derive(Serialize)]
pub struct AnalyzedResponse {
    pub message: &'static str,
    pub resume: Resume,
    pub analysis: AnalysisSummary,
}

#[derive(Serialize)]
pub struct ResumeResponse {
    pub resume: Resume,
}

#[derive(Serialize)]
pub struct ResumeListResponse {
    pub resumes: Vec<Resume>,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// Original upload kept alongside the parsed resume when archiving is enabled.
struct OriginalUpload {
    data: Bytes,
    content_type: &'static str,
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(format!(
            "File is too large; the limit is {MAX_INPUT_BYTES} bytes"
        ))
    } else {
        AppError::Validation(err.body_text())
    }
}

/// POST /api/resume/upload
pub async fn handle_upload(
    State(state): State<AppState>,
    auth: AuthUser,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<AnalyzedResponse>), AppError> {
    let mut multipart =
        multipart.map_err(|_| AppError::Validation("No file or text provided".into()))?;

    let mut upload = None;
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().trim().to_string();
        let content_type = field.content_type().map(str::to_string);
        let data = field.bytes().await.map_err(multipart_error)?;
        upload = Some((filename, content_type, data));
        break;
    }

    let (filename, content_type, data) =
        upload.ok_or_else(|| AppError::Validation("No file or text provided".into()))?;
    if filename.is_empty() {
        return Err(AppError::Validation("No file selected".into()));
    }

    let format = DocumentFormat::detect(content_type.as_deref(), &filename)?;
    let text = extract_text(
        data.clone(),
        format,
        state.config.extraction_timeout,
        state.parse_slots.clone(),
    )
    .await?;

    info!(
        user_id = %auth.user_id,
        ?format,
        bytes = data.len(),
        "Extracted text from {filename}"
    );

    let original = OriginalUpload {
        data,
        content_type: format.mime(),
    };
    let response = store_analyzed(
        &state,
        auth.user_id,
        filename,
        text,
        Some(original),
        "Resume uploaded and analyzed successfully",
    )
    .await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /api/resume/analyze
pub async fn handle_analyze(
    State(state): State<AppState>,
    auth: AuthUser,
    body: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AnalyzedResponse>), AppError> {
    let required = || AppError::Validation("Resume text is required".into());

    let Json(req) = body.map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge(format!(
                "Resume text is too large; the limit is {MAX_INPUT_BYTES} bytes"
            ))
        } else {
            required()
        }
    })?;
    check_size(req.text.len())?;

    let text = canonicalize(&req.text);
    if text.is_empty() {
        return Err(required());
    }

    let response = store_analyzed(
        &state,
        auth.user_id,
        PASTED_FILENAME.to_string(),
        text,
        None,
        "Resume analyzed successfully",
    )
    .await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Scores `text`, archives the original upload if configured, then persists the resume.
async fn store_analyzed(
    state: &AppState,
    owner: Uuid,
    filename: String,
    text: String,
    original: Option<OriginalUpload>,
    message: &'static str,
) -> Result<AnalyzedResponse, AppError> {
    let lexicon = state.lexicon.clone();
    let (analysis, text) = tokio::task::spawn_blocking(move || {
        let analysis = analyze(&lexicon, &text);
        (analysis, text)
    })
    .await
    .map_err(|e| AppError::Internal(e.into()))?;

    let id = Uuid::new_v4();
    let archive_key = match (&state.archive, original) {
        (Some(archive), Some(original)) => {
            let key = object_key(owner, id, &filename);
            archive
                .put(&key, original.data, original.content_type)
                .await?;
            Some(key)
        }
        _ => None,
    };

    let (new_resume, summary) =
        analysis.into_parts(id, owner, filename, text, archive_key.clone());

    let resume = match state.store.create_resume(new_resume).await {
        Ok(resume) => resume,
        Err(err) => {
            if let (Some(archive), Some(key)) = (&state.archive, archive_key.as_deref()) {
                if let Err(cleanup) = archive.delete(key).await {
                    warn!("Orphaned archived upload {key}: {cleanup}");
                }
            }
            return Err(err.into());
        }
    };

    info!(
        user_id = %owner,
        resume_id = %resume.id,
        ats_score = resume.ats_score,
        skills = resume.skills.len(),
        "Stored analyzed resume"
    );

    Ok(AnalyzedResponse {
        message,
        resume,
        analysis: summary,
    })
}

/// GET /api/resume/list
pub async fn handle_list(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ResumeListResponse>, AppError> {
    let resumes = state.store.list_resumes(auth.user_id).await?;
    Ok(Json(ResumeListResponse { resumes }))
}

/// GET /api/resume/:id
pub async fn handle_get(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ResumeResponse>, AppError> {
    let resume = state.store.get_resume(id, auth.user_id).await?;
    Ok(Json(ResumeResponse { resume }))
}

/// DELETE /api/resume/:id
pub async fn handle_delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    let removed = state.store.delete_resume(id, auth.user_id).await?;

    // The row is already gone; a failed object delete only leaves an orphan behind.
    if let (Some(archive), Some(key)) = (&state.archive, removed.archive_key.as_deref()) {
        if let Err(err) = archive.delete(key).await {
            warn!("Could not remove archived upload {key}: {err}");
        }
    }

    info!(user_id = %auth.user_id, resume_id = %id, "Deleted resume");
    Ok(Json(MessageResponse {
        message: "Resume deleted successfully",
    }))
}
