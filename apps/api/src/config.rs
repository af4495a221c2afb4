use anyhow::{bail, Context, Result};

use crate::matching::scoring::MatchMode;

const DEFAULT_MIN_SCORE: f64 = 0.3;
const DEFAULT_JOB_LIMIT: i64 = 50;
const DEFAULT_MAX_RESUME_BYTES: usize = 10 * 1024 * 1024;

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub s3_bucket: String,
    pub s3_endpoint: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    pub anthropic_api_key: String,
    pub port: u16,
    pub rust_log: String,
    pub match_mode: MatchMode,
    pub recommendation: RecommendationSettings,
    pub max_resume_bytes: usize,
}

/// Knobs for the recommendation run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecommendationSettings {
    /// Jobs scoring below this are never persisted as recommendations.
    pub min_score: f64,
    /// Upper bound on jobs pulled from the database per run.
    pub job_limit: i64,
}

impl Default for RecommendationSettings {
    fn default() -> Self {
        Self {
            min_score: DEFAULT_MIN_SCORE,
            job_limit: DEFAULT_JOB_LIMIT,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        let defaults = RecommendationSettings::default();

        let min_score = optional_env("RECOMMENDATION_MIN_SCORE")
            .map(|v| {
                v.parse::<f64>()
                    .context("RECOMMENDATION_MIN_SCORE must be a number")
            })
            .transpose()?
            .unwrap_or(defaults.min_score);
        if !(0.0..=1.0).contains(&min_score) {
            bail!("RECOMMENDATION_MIN_SCORE must be between 0 and 1, got {min_score}");
        }

        let job_limit = optional_env("RECOMMENDATION_JOB_LIMIT")
            .map(|v| {
                v.parse::<i64>()
                    .context("RECOMMENDATION_JOB_LIMIT must be an integer")
            })
            .transpose()?
            .unwrap_or(defaults.job_limit);
        if job_limit <= 0 {
            bail!("RECOMMENDATION_JOB_LIMIT must be positive, got {job_limit}");
        }

        let match_mode = match optional_env("MATCH_MODE") {
            Some(raw) => raw.parse::<MatchMode>()?,
            None => MatchMode::Exact,
        };

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            s3_bucket: require_env("S3_BUCKET")?,
            s3_endpoint: require_env("S3_ENDPOINT")?,
            aws_access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
            aws_secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            match_mode,
            recommendation: RecommendationSettings {
                min_score,
                job_limit,
            },
            max_resume_bytes: optional_env("MAX_RESUME_BYTES")
                .map(|v| v.parse::<usize>().context("MAX_RESUME_BYTES must be an integer"))
                .transpose()?
                .unwrap_or(DEFAULT_MAX_RESUME_BYTES),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_recommendation_settings() {
        let settings = RecommendationSettings::default();
        assert!((settings.min_score - 0.3).abs() < f64::EPSILON);
        assert_eq!(settings.job_limit, 50);
    }
}
