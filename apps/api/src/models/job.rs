use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

use crate::matching::skills::parse_requirements;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CompanyRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub industry: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub contact_email: Option<String>,
    pub description: Option<String>,
    pub logo_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A job posting joined with its company name.
/// `requirements` and `benefits` are JSON lists of free-text strings.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobRow {
    pub id: Uuid,
    pub company_id: Uuid,
    pub company_name: String,
    pub title: String,
    pub location: Option<String>,
    pub job_type: Option<String>,
    pub experience_level: Option<String>,
    pub salary_range: Option<String>,
    pub description: Option<String>,
    pub requirements: Value,
    pub benefits: Value,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl JobRow {
    pub fn requirement_list(&self) -> Vec<String> {
        parse_requirements(&self.requirements)
    }
}

/// Column list for `JobRow` queries; callers alias jobs as `j` and companies as `c`.
pub const JOB_COLUMNS: &str = "j.id, j.company_id, c.name AS company_name, j.title, j.location, \
    j.job_type, j.experience_level, j.salary_range, j.description, j.requirements, j.benefits, \
    j.is_active, j.created_at, j.updated_at";
