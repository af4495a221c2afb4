//! Axum route handlers for companies and job postings.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::candidates::applications::{list_for_job, JobApplicantRow};
use crate::candidates::handlers::UserIdQuery;
use crate::errors::AppError;
use crate::jobs::store::{
    company_for_user, create_company, create_job, get_job, list_companies, list_jobs,
    CreateCompanyRequest, CreateJobRequest,
};
use crate::models::job::{CompanyRow, JobRow};
use crate::models::user::UserRole;
use crate::state::AppState;
use crate::users::require_role;

/// POST /api/v1/companies
pub async fn handle_create_company(
    State(state): State<AppState>,
    Json(req): Json<CreateCompanyRequest>,
) -> Result<(StatusCode, Json<CompanyRow>), AppError> {
    require_role(&state.db, req.user_id, &[UserRole::Recruiter], "create companies").await?;
    let company = create_company(&state.db, &req).await?;
    Ok((StatusCode::CREATED, Json(company)))
}

/// GET /api/v1/companies
pub async fn handle_list_companies(
    State(state): State<AppState>,
) -> Result<Json<Vec<CompanyRow>>, AppError> {
    Ok(Json(list_companies(&state.db).await?))
}

/// POST /api/v1/jobs
///
/// The posting is attached to the recruiter's company; recruiters without one
/// must create a company first.
pub async fn handle_create_job(
    State(state): State<AppState>,
    Json(req): Json<CreateJobRequest>,
) -> Result<(StatusCode, Json<JobRow>), AppError> {
    require_role(&state.db, req.user_id, &[UserRole::Recruiter], "post jobs").await?;

    let company = company_for_user(&state.db, req.user_id).await?.ok_or_else(|| {
        AppError::Validation(
            "You must have a company profile before posting a job. Please go to Company Settings."
                .to_string(),
        )
    })?;

    let job = create_job(&state.db, company.id, &req).await?;
    Ok((StatusCode::CREATED, Json(job)))
}

/// GET /api/v1/jobs
pub async fn handle_list_jobs(
    State(state): State<AppState>,
) -> Result<Json<Vec<JobRow>>, AppError> {
    Ok(Json(list_jobs(&state.db).await?))
}

/// GET /api/v1/jobs/:id
pub async fn handle_get_job(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Result<Json<JobRow>, AppError> {
    let job = get_job(&state.db, job_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {job_id} not found")))?;
    Ok(Json(job))
}

/// GET /api/v1/jobs/:id/applications
///
/// Only the recruiter who owns the posting's company may list applicants.
pub async fn handle_job_applications(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<Vec<JobApplicantRow>>, AppError> {
    require_role(&state.db, params.user_id, &[UserRole::Recruiter], "view applications").await?;

    let job = get_job(&state.db, job_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {job_id} not found")))?;

    let owns_job: bool = sqlx::query_scalar(
        "SELECT EXISTS (SELECT 1 FROM companies WHERE id = $1 AND user_id = $2)",
    )
    .bind(job.company_id)
    .bind(params.user_id)
    .fetch_one(&state.db)
    .await?;
    if !owns_job {
        return Err(AppError::Forbidden("Not your job posting".to_string()));
    }

    Ok(Json(list_for_job(&state.db, job_id).await?))
}
