use sqlx::{PgPool, Postgres, Transaction};
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::RecommendationSettings;
use crate::errors::AppError;
use crate::matching::engine::{find_candidate_jobs, rank_jobs, ExperienceLevel, JobMatch};
use crate::matching::scoring::{explain, MatchScorer};
use crate::matching::skills::SkillSet;
use crate::models::recommendation::RecommendationRow;

/// Inserts or refreshes the single recommendation for (candidate, job).
/// Re-running never creates a second row; score and explanation are replaced.
pub async fn upsert_recommendation(
    tx: &mut Transaction<'_, Postgres>,
    candidate_id: Uuid,
    job_id: Uuid,
    match_score: f64,
    explanation: &str,
) -> Result<Uuid, sqlx::Error> {
    sqlx::query_scalar(
        r#"
        INSERT INTO recommendations (candidate_id, job_id, match_score, explanation)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (candidate_id, job_id) DO UPDATE
            SET match_score = EXCLUDED.match_score,
                explanation = EXCLUDED.explanation,
                updated_at  = now()
        RETURNING id
        "#,
    )
    .bind(candidate_id)
    .bind(job_id)
    .bind(match_score)
    .bind(explanation)
    .fetch_one(&mut **tx)
    .await
}

/// Drops the candidate's recommendations for every job not in `keep`.
/// An empty `keep` clears them all.
pub async fn prune_stale(
    tx: &mut Transaction<'_, Postgres>,
    candidate_id: Uuid,
    keep: &[Uuid],
) -> Result<u64, sqlx::Error> {
    let result =
        sqlx::query("DELETE FROM recommendations WHERE candidate_id = $1 AND job_id <> ALL($2)")
            .bind(candidate_id)
            .bind(keep)
            .execute(&mut **tx)
            .await?;
    Ok(result.rows_affected())
}

/// Recomputes a candidate's recommendations inside the caller's transaction.
///
/// Steps:
/// 1. find_candidate_jobs() → active jobs that could match any skill
/// 2. rank_jobs() → scored, thresholded, best first
/// 3. upsert_recommendation() for each match
/// 4. prune_stale() → rows for jobs that no longer qualify are removed
///
/// An empty skill set skips the search and clears every stored row.
pub async fn refresh_recommendations(
    tx: &mut Transaction<'_, Postgres>,
    scorer: &dyn MatchScorer,
    candidate_id: Uuid,
    skills: &SkillSet,
    level: ExperienceLevel,
    settings: RecommendationSettings,
) -> Result<Vec<JobMatch>, sqlx::Error> {
    if skills.is_empty() {
        let removed = prune_stale(tx, candidate_id, &[]).await?;
        debug!("Candidate {candidate_id} has no skills; cleared {removed} recommendations");
        return Ok(vec![]);
    }

    let jobs = find_candidate_jobs(&mut **tx, skills, settings.job_limit).await?;
    let matches = rank_jobs(&jobs, skills, level, scorer, settings.min_score);

    for job_match in &matches {
        upsert_recommendation(
            tx,
            candidate_id,
            job_match.job_id,
            job_match.outcome.score,
            &explain(&job_match.outcome),
        )
        .await?;
    }
    let keep: Vec<Uuid> = matches.iter().map(|m| m.job_id).collect();
    let removed = prune_stale(tx, candidate_id, &keep).await?;

    info!(
        "Recommendations for candidate {candidate_id}: {} of {} jobs passed, {removed} stale \
         removed (scorer={}, min_score={})",
        matches.len(),
        jobs.len(),
        scorer.backend(),
        settings.min_score
    );

    Ok(matches)
}

/// Finds, scores and persists recommendations for one candidate in a
/// transaction of its own.
pub async fn generate_for_candidate(
    pool: &PgPool,
    scorer: &dyn MatchScorer,
    candidate_id: Uuid,
    skills: &SkillSet,
    level: ExperienceLevel,
    settings: RecommendationSettings,
) -> Result<Vec<JobMatch>, AppError> {
    let mut tx = pool.begin().await?;
    let matches =
        refresh_recommendations(&mut tx, scorer, candidate_id, skills, level, settings).await?;
    tx.commit().await?;
    Ok(matches)
}

/// Stored recommendations for a candidate, best first.
pub async fn list_for_candidate(
    pool: &PgPool,
    candidate_id: Uuid,
) -> Result<Vec<RecommendationRow>, sqlx::Error> {
    sqlx::query_as::<_, RecommendationRow>(
        r#"
        SELECT r.id, r.candidate_id, r.job_id, r.match_score, r.explanation,
               j.title AS job_title, j.location AS job_location, j.job_type,
               c.id AS company_id, c.name AS company_name,
               r.created_at, r.updated_at
        FROM recommendations r
        JOIN jobs j ON j.id = r.job_id
        JOIN companies c ON c.id = j.company_id
        WHERE r.candidate_id = $1
        ORDER BY r.match_score DESC, r.updated_at DESC
        "#,
    )
    .bind(candidate_id)
    .fetch_all(pool)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::scoring::ExactOverlapScorer;
    use crate::test_fixtures::{seed_candidate, seed_job};
    use serde_json::json;

    async fn run(pool: &PgPool, candidate_id: Uuid, skills: &[&str]) -> Vec<JobMatch> {
        generate_for_candidate(
            pool,
            &ExactOverlapScorer,
            candidate_id,
            &SkillSet::new(skills),
            ExperienceLevel::MidLevel,
            RecommendationSettings::default(),
        )
        .await
        .unwrap()
    }

    async fn stored_scores(pool: &PgPool, candidate_id: Uuid) -> Vec<(Uuid, f64)> {
        list_for_candidate(pool, candidate_id)
            .await
            .unwrap()
            .into_iter()
            .map(|r| (r.job_id, r.match_score))
            .collect()
    }

    #[sqlx::test]
    async fn test_rerun_never_duplicates_rows(pool: PgPool) {
        let (_, candidate_id) = seed_candidate(&pool).await;
        let job_id = seed_job(&pool, "Backend Engineer", json!(["Python", "SQL"])).await;

        run(&pool, candidate_id, &["Python", "SQL"]).await;
        run(&pool, candidate_id, &["python", "sql"]).await;

        assert_eq!(stored_scores(&pool, candidate_id).await, vec![(job_id, 1.0)]);
    }

    #[sqlx::test]
    async fn test_upsert_replaces_score_and_explanation(pool: PgPool) {
        let (_, candidate_id) = seed_candidate(&pool).await;
        let job_id = seed_job(&pool, "Data Engineer", json!(["Python"])).await;

        let mut tx = pool.begin().await.unwrap();
        let first = upsert_recommendation(&mut tx, candidate_id, job_id, 0.4, "first")
            .await
            .unwrap();
        let second = upsert_recommendation(&mut tx, candidate_id, job_id, 0.9, "second")
            .await
            .unwrap();
        tx.commit().await.unwrap();

        assert_eq!(first, second);
        let rows = list_for_candidate(&pool, candidate_id).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].match_score, 0.9);
        assert_eq!(rows[0].explanation, "second");
    }

    #[sqlx::test]
    async fn test_score_refreshes_when_skills_change(pool: PgPool) {
        let (_, candidate_id) = seed_candidate(&pool).await;
        let job_id = seed_job(&pool, "Backend Engineer", json!(["Python", "SQL"])).await;

        run(&pool, candidate_id, &["Python", "SQL"]).await;
        run(&pool, candidate_id, &["Python"]).await;

        assert_eq!(stored_scores(&pool, candidate_id).await, vec![(job_id, 0.5)]);
    }

    #[sqlx::test]
    async fn test_jobs_no_longer_matched_are_removed(pool: PgPool) {
        let (_, candidate_id) = seed_candidate(&pool).await;
        seed_job(&pool, "Backend Engineer", json!(["Python", "SQL"])).await;
        let go_job = seed_job(&pool, "Go Engineer", json!(["Go"])).await;

        assert_eq!(run(&pool, candidate_id, &["Python", "SQL"]).await.len(), 1);
        let second = run(&pool, candidate_id, &["Go"]).await;

        assert_eq!(second.len(), 1);
        assert_eq!(stored_scores(&pool, candidate_id).await, vec![(go_job, 1.0)]);
    }

    #[sqlx::test]
    async fn test_empty_skills_clear_recommendations(pool: PgPool) {
        let (_, candidate_id) = seed_candidate(&pool).await;
        seed_job(&pool, "Backend Engineer", json!(["Python"])).await;

        run(&pool, candidate_id, &["Python"]).await;
        assert!(run(&pool, candidate_id, &[]).await.is_empty());
        assert!(stored_scores(&pool, candidate_id).await.is_empty());
    }

    #[sqlx::test]
    async fn test_other_candidates_rows_are_untouched(pool: PgPool) {
        let (_, first) = seed_candidate(&pool).await;
        let (_, second) = seed_candidate(&pool).await;
        let job_id = seed_job(&pool, "Backend Engineer", json!(["Python"])).await;

        run(&pool, first, &["Python"]).await;
        run(&pool, second, &["Rust"]).await;

        assert_eq!(stored_scores(&pool, first).await, vec![(job_id, 1.0)]);
    }
}
