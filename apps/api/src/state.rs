use std::sync::Arc;

use aws_sdk_s3::Client as S3Client;
use sqlx::PgPool;

use crate::analysis::analyzer::ResumeAnalyzer;
use crate::config::Config;
use crate::matching::scoring::MatchScorer;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub s3: S3Client,
    pub config: Config,
    /// Exact or fuzzy overlap, chosen by MATCH_MODE.
    pub match_scorer: Arc<dyn MatchScorer>,
    /// Resume analyzer. Default: LlmResumeAnalyzer over the shared LLM client.
    pub analyzer: Arc<dyn ResumeAnalyzer>,
}
