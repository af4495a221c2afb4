pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};

use crate::analysis::handlers as analysis;
use crate::candidates::handlers as candidates;
use crate::jobs::handlers as jobs;
use crate::matching::handlers as matching;
use crate::state::AppState;
use crate::users;

/// Headroom for multipart framing around the resume file.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_resume_bytes + MULTIPART_OVERHEAD_BYTES;

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/users", post(users::handle_create_user))
        // Companies and jobs
        .route(
            "/api/v1/companies",
            get(jobs::handle_list_companies).post(jobs::handle_create_company),
        )
        .route(
            "/api/v1/jobs",
            get(jobs::handle_list_jobs).post(jobs::handle_create_job),
        )
        .route("/api/v1/jobs/:id", get(jobs::handle_get_job))
        .route(
            "/api/v1/jobs/:id/applications",
            get(jobs::handle_job_applications),
        )
        .route("/api/v1/jobs/:id/match", get(matching::handle_job_match))
        // Candidates
        .route(
            "/api/v1/candidates/me",
            get(candidates::handle_get_profile).put(candidates::handle_update_profile),
        )
        .route(
            "/api/v1/candidates/applications",
            get(candidates::handle_list_applications).post(candidates::handle_apply),
        )
        .route(
            "/api/v1/candidates/resume/analyze",
            post(analysis::handle_analyze_resume).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route(
            "/api/v1/candidates/analysis/latest",
            get(analysis::handle_latest_analysis),
        )
        .route(
            "/api/v1/candidates/analysis/history",
            get(analysis::handle_analysis_history),
        )
        // Interviews
        .route(
            "/api/v1/interviews",
            get(candidates::handle_list_interviews).post(candidates::handle_schedule_interview),
        )
        .route(
            "/api/v1/interviews/:id",
            put(candidates::handle_update_interview),
        )
        // Recommendations
        .route(
            "/api/v1/recommendations",
            get(matching::handle_list_recommendations),
        )
        .route(
            "/api/v1/recommendations/generate",
            post(matching::handle_generate_recommendations),
        )
        .with_state(state)
}
