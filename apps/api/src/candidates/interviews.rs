use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use tracing::info;
use uuid::Uuid;

use crate::candidates::applications::set_status;
use crate::errors::AppError;
use crate::models::candidate::{ApplicationStatus, InterviewResult, InterviewRow};

const DEFAULT_INTERVIEWER: &str = "AI Recruiter";

#[derive(Debug, Deserialize)]
pub struct ScheduleInterviewRequest {
    pub user_id: Uuid,
    pub application_id: Uuid,
    pub scheduled_time: DateTime<Utc>,
    pub interviewer_name: Option<String>,
    pub meeting_link: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateInterviewRequest {
    pub user_id: Uuid,
    pub result: Option<InterviewResult>,
    pub feedback: Option<String>,
}

/// An interview with the job it belongs to, for the candidate's view.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CandidateInterviewRow {
    pub id: Uuid,
    pub application_id: Uuid,
    pub interviewer_name: String,
    pub scheduled_time: DateTime<Utc>,
    pub meeting_link: Option<String>,
    pub status: String,
    pub feedback: Option<String>,
    pub result: String,
    pub job_title: String,
    pub company_name: String,
}

/// Schedules an interview and moves the application to `interviewing`.
pub async fn schedule(
    pool: &PgPool,
    interviewer_id: Uuid,
    req: &ScheduleInterviewRequest,
) -> Result<InterviewRow, AppError> {
    let mut tx = pool.begin().await?;

    let application_exists: bool =
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM applications WHERE id = $1)")
            .bind(req.application_id)
            .fetch_one(&mut *tx)
            .await?;
    if !application_exists {
        return Err(AppError::NotFound(format!(
            "Application {} not found",
            req.application_id
        )));
    }

    let interviewer_name = req
        .interviewer_name
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_INTERVIEWER);

    let row = sqlx::query_as::<_, InterviewRow>(
        r#"
        INSERT INTO interviews
            (application_id, interviewer_id, interviewer_name, scheduled_time, meeting_link)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(req.application_id)
    .bind(interviewer_id)
    .bind(interviewer_name)
    .bind(req.scheduled_time)
    .bind(&req.meeting_link)
    .fetch_one(&mut *tx)
    .await?;

    set_status(&mut *tx, req.application_id, ApplicationStatus::Interviewing).await?;
    tx.commit().await?;

    info!(
        "Scheduled interview {} for application {}",
        row.id, req.application_id
    );
    Ok(row)
}

/// Updates result and/or feedback; unknown interview → 404.
pub async fn update(
    pool: &PgPool,
    interview_id: Uuid,
    req: &UpdateInterviewRequest,
) -> Result<InterviewRow, AppError> {
    if req.result.is_none() && req.feedback.is_none() {
        return Err(AppError::Validation(
            "Provide a result or feedback to update".to_string(),
        ));
    }

    sqlx::query_as::<_, InterviewRow>(
        r#"
        UPDATE interviews SET
            result     = COALESCE($2, result),
            feedback   = COALESCE($3, feedback),
            status     = CASE WHEN $2 IS NOT NULL AND $2 <> 'pending'
                              THEN 'completed' ELSE status END,
            updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(interview_id)
    .bind(req.result.map(|r| r.as_str()))
    .bind(&req.feedback)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Interview {interview_id} not found")))
}

pub async fn list_for_candidate(
    pool: &PgPool,
    candidate_id: Uuid,
) -> Result<Vec<CandidateInterviewRow>, sqlx::Error> {
    sqlx::query_as::<_, CandidateInterviewRow>(
        r#"
        SELECT i.id, i.application_id, i.interviewer_name, i.scheduled_time, i.meeting_link,
               i.status, i.feedback, i.result,
               j.title AS job_title, c.name AS company_name
        FROM interviews i
        JOIN applications a ON a.id = i.application_id
        JOIN jobs j ON j.id = a.job_id
        JOIN companies c ON c.id = j.company_id
        WHERE a.candidate_id = $1
        ORDER BY i.scheduled_time DESC
        "#,
    )
    .bind(candidate_id)
    .fetch_all(pool)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidates::applications::create_application;
    use crate::test_fixtures::{seed_candidate, seed_job, seed_user};
    use serde_json::json;

    fn request(application_id: Uuid) -> ScheduleInterviewRequest {
        ScheduleInterviewRequest {
            user_id: Uuid::new_v4(),
            application_id,
            scheduled_time: Utc::now(),
            interviewer_name: Some("  ".to_string()),
            meeting_link: None,
        }
    }

    async fn interview_count(pool: &PgPool) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM interviews")
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[sqlx::test]
    async fn test_schedule_moves_application_to_interviewing(pool: PgPool) {
        let (_, candidate_id) = seed_candidate(&pool).await;
        let job_id = seed_job(&pool, "Data Engineer", json!(["SQL"])).await;
        let application = create_application(&pool, candidate_id, job_id, "web")
            .await
            .unwrap();
        let recruiter = seed_user(&pool, "recruiter").await;

        let interview = schedule(&pool, recruiter, &request(application.id)).await.unwrap();
        assert_eq!(interview.application_id, application.id);
        assert_eq!(interview.interviewer_name, DEFAULT_INTERVIEWER);
        assert_eq!(interview.status, "scheduled");

        let status: String = sqlx::query_scalar("SELECT status FROM applications WHERE id = $1")
            .bind(application.id)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(status, "interviewing");
    }

    #[sqlx::test]
    async fn test_schedule_unknown_application_writes_nothing(pool: PgPool) {
        let recruiter = seed_user(&pool, "recruiter").await;
        let err = schedule(&pool, recruiter, &request(Uuid::new_v4())).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(interview_count(&pool).await, 0);
    }
}
