use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::analysis::store::analyzed_candidate;
use crate::candidates::handlers::UserIdQuery;
use crate::candidates::profile::{find_by_user, skill_names};
use crate::errors::AppError;
use crate::jobs::store::get_job;
use crate::matching::engine::ExperienceLevel;
use crate::matching::recommendations::{generate_for_candidate, list_for_candidate};
use crate::matching::report::{build_job_match_report, CandidateSignals, JobMatchReport};
use crate::matching::skills::SkillSet;
use crate::models::recommendation::RecommendationRow;
use crate::models::user::UserRole;
use crate::state::AppState;
use crate::users::require_role;

#[derive(Deserialize)]
pub struct GenerateRequest {
    pub user_id: Uuid,
}

/// POST /api/v1/recommendations/generate
pub async fn handle_generate_recommendations(
    State(state): State<AppState>,
    Json(req): Json<GenerateRequest>,
) -> Result<Json<Vec<RecommendationRow>>, AppError> {
    require_role(
        &state.db,
        req.user_id,
        &[UserRole::Candidate],
        "get recommendations",
    )
    .await?;

    let candidate = find_by_user(&state.db, req.user_id)
        .await?
        .ok_or_else(|| {
            AppError::Validation(
                "Profile incomplete. Please upload your resume or add skills first.".to_string(),
            )
        })?;

    let skills = SkillSet::new(skill_names(&state.db, candidate.id).await?);
    let level = ExperienceLevel::resolve([candidate.experience_level.as_deref()]);

    generate_for_candidate(
        &state.db,
        state.match_scorer.as_ref(),
        candidate.id,
        &skills,
        level,
        state.config.recommendation,
    )
    .await?;

    Ok(Json(list_for_candidate(&state.db, candidate.id).await?))
}

/// GET /api/v1/recommendations?user_id=
pub async fn handle_list_recommendations(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<Vec<RecommendationRow>>, AppError> {
    Ok(Json(stored_recommendations(&state.db, params.user_id).await?))
}

/// Candidate-only; a candidate without a profile has no recommendations yet.
async fn stored_recommendations(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Vec<RecommendationRow>, AppError> {
    require_role(pool, user_id, &[UserRole::Candidate], "view recommendations").await?;

    let Some(candidate) = find_by_user(pool, user_id).await? else {
        return Ok(vec![]);
    };
    Ok(list_for_candidate(pool, candidate.id).await?)
}

/// GET /api/v1/jobs/:id/match?user_id=
pub async fn handle_job_match(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<JobMatchReport>, AppError> {
    let job = get_job(&state.db, job_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {job_id} not found")))?;

    let report = match analyzed_candidate(&state.db, params.user_id).await? {
        Some((candidate, analysis)) => {
            let skills = SkillSet::new(skill_names(&state.db, candidate.id).await?);
            build_job_match_report(
                &job,
                Some(CandidateSignals {
                    skills: &skills,
                    analysis: &analysis,
                }),
                state.match_scorer.as_ref(),
            )
        }
        None => build_job_match_report(&job, None, state.match_scorer.as_ref()),
    };

    Ok(Json(report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{seed_candidate, seed_user};

    #[sqlx::test]
    async fn test_recommendations_are_candidate_only(pool: PgPool) {
        let recruiter = seed_user(&pool, "recruiter").await;
        let err = stored_recommendations(&pool, recruiter).await.unwrap_err();
        match err {
            AppError::Forbidden(msg) => {
                assert_eq!(msg, "Only candidate accounts can view recommendations")
            }
            other => panic!("expected Forbidden, got {other:?}"),
        }
    }

    #[sqlx::test]
    async fn test_candidate_without_profile_gets_empty_list(pool: PgPool) {
        let user_id = seed_user(&pool, "candidate").await;
        assert!(stored_recommendations(&pool, user_id).await.unwrap().is_empty());

        let (user_id, _) = seed_candidate(&pool).await;
        assert!(stored_recommendations(&pool, user_id).await.unwrap().is_empty());
    }
}
