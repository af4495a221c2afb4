//! Axum route handlers for candidate profiles, applications and interviews.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::candidates::applications::{self, ApplyRequest, CandidateApplicationRow};
use crate::candidates::interviews::{
    self, CandidateInterviewRow, ScheduleInterviewRequest, UpdateInterviewRequest,
};
use crate::candidates::profile::{self, CandidateProfile, ProfileUpdate};
use crate::errors::AppError;
use crate::models::candidate::{ApplicationRow, InterviewRow};
use crate::models::user::UserRole;
use crate::state::AppState;
use crate::users::require_role;

#[derive(Deserialize)]
pub struct UserIdQuery {
    pub user_id: Uuid,
}

#[derive(Deserialize)]
pub struct ProfileUpdateRequest {
    pub user_id: Uuid,
    #[serde(flatten)]
    pub update: ProfileUpdate,
}

/// GET /api/v1/candidates/me
pub async fn handle_get_profile(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<CandidateProfile>, AppError> {
    let user = require_role(
        &state.db,
        params.user_id,
        &[UserRole::Candidate],
        "view a candidate profile",
    )
    .await?;
    let candidate = profile::get_or_create(&state.db, &user).await?;
    Ok(Json(profile::load_profile(&state.db, candidate).await?))
}

/// PUT /api/v1/candidates/me
pub async fn handle_update_profile(
    State(state): State<AppState>,
    Json(req): Json<ProfileUpdateRequest>,
) -> Result<Json<CandidateProfile>, AppError> {
    if req.update.is_empty() {
        return Err(AppError::Validation("No profile fields to update".to_string()));
    }
    require_role(
        &state.db,
        req.user_id,
        &[UserRole::Candidate],
        "update a candidate profile",
    )
    .await?;

    let candidate = profile::find_by_user(&state.db, req.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Candidate profile not found".to_string()))?;
    let updated = profile::update_profile(&state.db, candidate.id, &req.update)
        .await?
        .ok_or_else(|| AppError::NotFound("Candidate profile not found".to_string()))?;

    Ok(Json(profile::load_profile(&state.db, updated).await?))
}

/// POST /api/v1/candidates/applications
pub async fn handle_apply(
    State(state): State<AppState>,
    Json(req): Json<ApplyRequest>,
) -> Result<(StatusCode, Json<ApplicationRow>), AppError> {
    require_role(&state.db, req.user_id, &[UserRole::Candidate], "apply to jobs").await?;
    let candidate = profile::find_by_user(&state.db, req.user_id)
        .await?
        .ok_or_else(|| AppError::Validation("Profile incomplete".to_string()))?;

    let source = req.source.as_deref().unwrap_or("web");
    let row = applications::create_application(&state.db, candidate.id, req.job_id, source).await?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// GET /api/v1/candidates/applications
pub async fn handle_list_applications(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<Vec<CandidateApplicationRow>>, AppError> {
    require_role(&state.db, params.user_id, &[UserRole::Candidate], "list applications").await?;
    let Some(candidate) = profile::find_by_user(&state.db, params.user_id).await? else {
        return Ok(Json(vec![]));
    };
    Ok(Json(applications::list_for_candidate(&state.db, candidate.id).await?))
}

/// GET /api/v1/interviews
pub async fn handle_list_interviews(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<Vec<CandidateInterviewRow>>, AppError> {
    require_role(&state.db, params.user_id, &[UserRole::Candidate], "view their interviews").await?;
    let Some(candidate) = profile::find_by_user(&state.db, params.user_id).await? else {
        return Ok(Json(vec![]));
    };
    Ok(Json(interviews::list_for_candidate(&state.db, candidate.id).await?))
}

/// POST /api/v1/interviews
pub async fn handle_schedule_interview(
    State(state): State<AppState>,
    Json(req): Json<ScheduleInterviewRequest>,
) -> Result<(StatusCode, Json<InterviewRow>), AppError> {
    let user = require_role(
        &state.db,
        req.user_id,
        &[UserRole::Recruiter, UserRole::Admin],
        "schedule interviews",
    )
    .await?;
    let row = interviews::schedule(&state.db, user.id, &req).await?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// PUT /api/v1/interviews/:id
pub async fn handle_update_interview(
    State(state): State<AppState>,
    Path(interview_id): Path<Uuid>,
    Json(req): Json<UpdateInterviewRequest>,
) -> Result<Json<InterviewRow>, AppError> {
    require_role(
        &state.db,
        req.user_id,
        &[UserRole::Recruiter, UserRole::Admin],
        "update interviews",
    )
    .await?;
    Ok(Json(interviews::update(&state.db, interview_id, &req).await?))
}
