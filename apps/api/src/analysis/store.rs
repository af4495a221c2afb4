use serde_json::Value;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::analysis::models::AnalysisReport;
use crate::candidates::profile::find_by_user;
use crate::models::candidate::CandidateRow;
use crate::models::recommendation::ResumeAnalysisRow;

/// How many history rows the history endpoint returns.
pub const HISTORY_LIMIT: i64 = 20;

/// Appends one analysis run to the candidate's history.
pub async fn insert_analysis(
    tx: &mut Transaction<'_, Postgres>,
    candidate_id: Uuid,
    resume_url: &str,
    report: &AnalysisReport,
    recommendations_count: i32,
    processing_time_ms: i64,
) -> Result<Uuid, sqlx::Error> {
    sqlx::query_scalar(
        r#"
        INSERT INTO resume_analyses
            (candidate_id, resume_url, extracted_skills, experience_level, strengths, gaps,
             summary, job_matches, recommendations_count, processing_time_ms)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING id
        "#,
    )
    .bind(candidate_id)
    .bind(resume_url)
    .bind(Value::from(report.skills.clone()))
    .bind(report.experience_level.as_str())
    .bind(Value::from(report.strengths.clone()))
    .bind(Value::from(report.gaps.clone()))
    .bind(&report.summary)
    .bind(&report.job_matches)
    .bind(recommendations_count)
    .bind(processing_time_ms)
    .fetch_one(&mut **tx)
    .await
}

pub async fn history_for_candidate(
    pool: &PgPool,
    candidate_id: Uuid,
) -> Result<Vec<ResumeAnalysisRow>, sqlx::Error> {
    sqlx::query_as::<_, ResumeAnalysisRow>(
        r#"
        SELECT * FROM resume_analyses
        WHERE candidate_id = $1
        ORDER BY created_at DESC
        LIMIT $2
        "#,
    )
    .bind(candidate_id)
    .bind(HISTORY_LIMIT)
    .fetch_all(pool)
    .await
}

pub async fn has_analysis(pool: &PgPool, candidate_id: Uuid) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM resume_analyses WHERE candidate_id = $1)")
        .bind(candidate_id)
        .fetch_one(pool)
        .await
}

/// The user's candidate profile and stored report, once at least one resume
/// analysis has run. A `resume_url` alone does not count.
pub async fn analyzed_candidate(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Option<(CandidateRow, AnalysisReport)>, sqlx::Error> {
    let Some(candidate) = find_by_user(pool, user_id).await? else {
        return Ok(None);
    };
    if !has_analysis(pool, candidate.id).await? {
        return Ok(None);
    }
    let report = AnalysisReport::from_stored(&candidate.analysis_report);
    Ok(Some((candidate, report)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidates::profile::{store_analysis, update_profile, ProfileUpdate};
    use crate::test_fixtures::seed_candidate;

    #[sqlx::test]
    async fn test_resume_url_alone_is_not_an_analysis(pool: PgPool) {
        let (user_id, candidate_id) = seed_candidate(&pool).await;
        let update = ProfileUpdate {
            resume_url: Some("https://example.com/cv.pdf".to_string()),
            ..ProfileUpdate::default()
        };
        update_profile(&pool, candidate_id, &update).await.unwrap();

        assert!(!has_analysis(&pool, candidate_id).await.unwrap());
        assert!(analyzed_candidate(&pool, user_id).await.unwrap().is_none());
    }

    #[sqlx::test]
    async fn test_recorded_analysis_is_returned_with_report(pool: PgPool) {
        let (user_id, candidate_id) = seed_candidate(&pool).await;
        let report = AnalysisReport {
            summary: "Solid SQL background.".to_string(),
            skills: vec!["Sql".to_string()],
            ..AnalysisReport::default()
        };
        let report_json = serde_json::to_value(&report).unwrap();

        let mut tx = pool.begin().await.unwrap();
        store_analysis(&mut tx, candidate_id, &report_json, "s3://bucket/cv.pdf", "Mid-level")
            .await
            .unwrap();
        insert_analysis(&mut tx, candidate_id, "s3://bucket/cv.pdf", &report, 0, 12)
            .await
            .unwrap();
        tx.commit().await.unwrap();

        let (candidate, stored) = analyzed_candidate(&pool, user_id).await.unwrap().unwrap();
        assert_eq!(candidate.id, candidate_id);
        assert_eq!(stored, report);
        assert_eq!(history_for_candidate(&pool, candidate_id).await.unwrap().len(), 1);
    }
}
