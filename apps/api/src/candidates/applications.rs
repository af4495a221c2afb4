use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::{FromRow, PgExecutor, PgPool};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::candidate::{ApplicationRow, ApplicationStatus};

#[derive(Debug, Deserialize)]
pub struct ApplyRequest {
    pub user_id: Uuid,
    pub job_id: Uuid,
    pub source: Option<String>,
}

/// A candidate's application with the job it targets.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CandidateApplicationRow {
    pub id: Uuid,
    pub status: String,
    pub applied_at: DateTime<Utc>,
    pub job_id: Uuid,
    pub job_title: String,
    pub job_location: Option<String>,
    pub job_type: Option<String>,
    pub company_id: Uuid,
    pub company_name: String,
}

/// An application as seen by the recruiter who owns the job.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct JobApplicantRow {
    pub id: Uuid,
    pub status: String,
    pub applied_at: DateTime<Utc>,
    pub candidate_id: Uuid,
    pub full_name: String,
    pub email: String,
    pub resume_url: Option<String>,
    pub experience_level: Option<String>,
    pub analysis_report: Value,
}

/// Creates an application in `applied` status. Applying twice is a conflict.
pub async fn create_application(
    pool: &PgPool,
    candidate_id: Uuid,
    job_id: Uuid,
    source: &str,
) -> Result<ApplicationRow, AppError> {
    let job_exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM jobs WHERE id = $1)")
        .bind(job_id)
        .fetch_one(pool)
        .await?;
    if !job_exists {
        return Err(AppError::NotFound(format!("Job {job_id} not found")));
    }

    let row = sqlx::query_as::<_, ApplicationRow>(
        r#"
        INSERT INTO applications (candidate_id, job_id, status, source)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (candidate_id, job_id) DO NOTHING
        RETURNING *
        "#,
    )
    .bind(candidate_id)
    .bind(job_id)
    .bind(ApplicationStatus::Applied.as_str())
    .bind(source)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::Conflict("Already applied to this job".to_string()))?;

    info!("Candidate {candidate_id} applied to job {job_id}");
    Ok(row)
}

pub async fn list_for_candidate(
    pool: &PgPool,
    candidate_id: Uuid,
) -> Result<Vec<CandidateApplicationRow>, sqlx::Error> {
    sqlx::query_as::<_, CandidateApplicationRow>(
        r#"
        SELECT a.id, a.status, a.applied_at,
               j.id AS job_id, j.title AS job_title, j.location AS job_location, j.job_type,
               c.id AS company_id, c.name AS company_name
        FROM applications a
        JOIN jobs j ON j.id = a.job_id
        JOIN companies c ON c.id = j.company_id
        WHERE a.candidate_id = $1
        ORDER BY a.applied_at DESC
        "#,
    )
    .bind(candidate_id)
    .fetch_all(pool)
    .await
}

pub async fn list_for_job(
    pool: &PgPool,
    job_id: Uuid,
) -> Result<Vec<JobApplicantRow>, sqlx::Error> {
    sqlx::query_as::<_, JobApplicantRow>(
        r#"
        SELECT a.id, a.status, a.applied_at,
               c.id AS candidate_id, c.full_name, c.email, c.resume_url,
               c.experience_level, c.analysis_report
        FROM applications a
        JOIN candidates c ON c.id = a.candidate_id
        WHERE a.job_id = $1
        ORDER BY a.applied_at DESC
        "#,
    )
    .bind(job_id)
    .fetch_all(pool)
    .await
}

pub async fn set_status<'e, E>(
    executor: E,
    application_id: Uuid,
    status: ApplicationStatus,
) -> Result<(), sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query("UPDATE applications SET status = $2, updated_at = now() WHERE id = $1")
        .bind(application_id)
        .bind(status.as_str())
        .execute(executor)
        .await?;
    Ok(())
}
