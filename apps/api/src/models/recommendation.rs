use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// A stored recommendation joined with the job and company it points at.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RecommendationRow {
    pub id: Uuid,
    pub candidate_id: Uuid,
    pub job_id: Uuid,
    pub match_score: f64,
    pub explanation: String,
    pub job_title: String,
    pub job_location: Option<String>,
    pub job_type: Option<String>,
    pub company_id: Uuid,
    pub company_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ResumeAnalysisRow {
    pub id: Uuid,
    pub candidate_id: Uuid,
    pub resume_url: String,
    pub extracted_skills: Value,
    pub experience_level: String,
    pub strengths: Value,
    pub gaps: Value,
    pub summary: String,
    pub job_matches: Value,
    pub recommendations_count: i32,
    pub processing_time_ms: Option<i64>,
    pub created_at: DateTime<Utc>,
}
