use serde_json::Value;
use sqlx::PgPool;
use tracing::warn;

pub const ACTION_RESUME_ANALYSIS: &str = "ResumeAnalysis";
pub const ACTION_RESUME_ANALYSIS_FAILED: &str = "ResumeAnalysis_Failed";

/// One row of the AI audit log.
#[derive(Debug, Clone)]
pub struct AiRun {
    pub action_type: &'static str,
    pub succeeded: bool,
    pub input_data: Value,
    pub output_data: Option<Value>,
    pub error_message: Option<String>,
    pub execution_time_ms: i64,
}

/// Writes an audit row. Failures are logged and swallowed so auditing never
/// fails the request it describes.
pub async fn record_ai_run(pool: &PgPool, run: &AiRun) {
    let result = sqlx::query(
        r#"
        INSERT INTO ai_runs
            (action_type, succeeded, input_data, output_data, error_message, execution_time_ms)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(run.action_type)
    .bind(run.succeeded)
    .bind(&run.input_data)
    .bind(&run.output_data)
    .bind(&run.error_message)
    .bind(run.execution_time_ms)
    .execute(pool)
    .await;

    if let Err(e) = result {
        warn!("Failed to record AI run {}: {e}", run.action_type);
    }
}
