use axum::{
    extract::{Multipart, Query, State},
    Json,
};
use serde_json::{json, Value};

use crate::analysis::pipeline::{process_resume_upload, ResumeUpload};
use crate::analysis::store::{analyzed_candidate, history_for_candidate};
use crate::candidates::handlers::UserIdQuery;
use crate::candidates::profile::find_by_user;
use crate::errors::AppError;
use crate::models::recommendation::ResumeAnalysisRow;
use crate::models::user::UserRole;
use crate::state::AppState;
use crate::users::require_role;

/// Multipart field carrying the PDF.
const FILE_FIELD: &str = "file";

/// POST /api/v1/candidates/resume/analyze?user_id=
pub async fn handle_analyze_resume(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
    mut multipart: Multipart,
) -> Result<Json<Value>, AppError> {
    let user = require_role(
        &state.db,
        params.user_id,
        &[UserRole::Candidate],
        "upload resumes",
    )
    .await?;

    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Could not read uploaded file: {e}")))?;
        upload = Some(ResumeUpload { filename, bytes });
        break;
    }
    let upload = upload.ok_or_else(|| {
        AppError::Validation("No file uploaded (expected field 'file')".to_string())
    })?;

    let outcome = process_resume_upload(&state, &user, upload).await?;
    let skills_detected = outcome.report.skills.len();

    Ok(Json(json!({
        "status": "success",
        "message": "Resume analyzed successfully",
        "data": outcome.report,
        "metadata": {
            "analysis_id": outcome.analysis_id,
            "candidate_id": outcome.candidate_id,
            "skills_detected": skills_detected,
            "recommendations": outcome.recommendations,
            "resume_url": outcome.resume_url,
        }
    })))
}

/// GET /api/v1/candidates/analysis/latest?user_id=
pub async fn handle_latest_analysis(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<Value>, AppError> {
    Ok(Json(match analyzed_candidate(&state.db, params.user_id).await? {
        Some((_, report)) => json!({"has_analysis": true, "data": report}),
        None => json!({"has_analysis": false, "data": null}),
    }))
}

/// GET /api/v1/candidates/analysis/history?user_id=
pub async fn handle_analysis_history(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<Vec<ResumeAnalysisRow>>, AppError> {
    let Some(candidate) = find_by_user(&state.db, params.user_id).await? else {
        return Ok(Json(vec![]));
    };
    Ok(Json(history_for_candidate(&state.db, candidate.id).await?))
}
