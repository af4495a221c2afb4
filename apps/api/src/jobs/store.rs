use serde::Deserialize;
use serde_json::Value;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::job::{CompanyRow, JobRow, JOB_COLUMNS};

#[derive(Debug, Deserialize)]
pub struct CreateCompanyRequest {
    pub user_id: Uuid,
    pub name: String,
    pub industry: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub contact_email: Option<String>,
    pub description: Option<String>,
    pub logo_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateJobRequest {
    pub user_id: Uuid,
    pub title: String,
    pub location: Option<String>,
    pub job_type: Option<String>,
    pub experience_level: Option<String>,
    pub salary_range: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub requirements: Vec<String>,
    #[serde(default)]
    pub benefits: Vec<String>,
}

/// Collapses inner whitespace, trims, and drops blanks. Case is kept.
pub fn clean_list(items: &[String]) -> Vec<String> {
    items
        .iter()
        .map(|s| s.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|s| !s.is_empty())
        .collect()
}

pub async fn create_company(
    pool: &PgPool,
    req: &CreateCompanyRequest,
) -> Result<CompanyRow, AppError> {
    let name = req.name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("Company name cannot be empty".to_string()));
    }

    let row = sqlx::query_as::<_, CompanyRow>(
        r#"
        INSERT INTO companies
            (user_id, name, industry, location, website, contact_email, description, logo_url)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        ON CONFLICT (name) DO NOTHING
        RETURNING *
        "#,
    )
    .bind(req.user_id)
    .bind(name)
    .bind(&req.industry)
    .bind(&req.location)
    .bind(&req.website)
    .bind(&req.contact_email)
    .bind(&req.description)
    .bind(&req.logo_url)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::Conflict(format!("Company '{name}' already exists")))?;

    info!("Created company {} for user {}", row.id, req.user_id);
    Ok(row)
}

pub async fn list_companies(pool: &PgPool) -> Result<Vec<CompanyRow>, sqlx::Error> {
    sqlx::query_as::<_, CompanyRow>("SELECT * FROM companies ORDER BY name")
        .fetch_all(pool)
        .await
}

/// The recruiter's first company, if they have one.
pub async fn company_for_user(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Option<CompanyRow>, sqlx::Error> {
    sqlx::query_as::<_, CompanyRow>(
        "SELECT * FROM companies WHERE user_id = $1 ORDER BY created_at LIMIT 1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

pub async fn create_job(
    pool: &PgPool,
    company_id: Uuid,
    req: &CreateJobRequest,
) -> Result<JobRow, AppError> {
    let title = req.title.trim();
    if title.is_empty() {
        return Err(AppError::Validation("Job title cannot be empty".to_string()));
    }

    let requirements = Value::from(clean_list(&req.requirements));
    let benefits = Value::from(clean_list(&req.benefits));

    let job_id: Uuid = sqlx::query_scalar(
        r#"
        INSERT INTO jobs
            (company_id, title, location, job_type, experience_level,
             salary_range, description, requirements, benefits)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING id
        "#,
    )
    .bind(company_id)
    .bind(title)
    .bind(&req.location)
    .bind(&req.job_type)
    .bind(&req.experience_level)
    .bind(&req.salary_range)
    .bind(&req.description)
    .bind(&requirements)
    .bind(&benefits)
    .fetch_one(pool)
    .await?;

    info!("Created job {job_id} for company {company_id}");

    get_job(pool, job_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {job_id} not found")))
}

pub async fn get_job(pool: &PgPool, job_id: Uuid) -> Result<Option<JobRow>, sqlx::Error> {
    let query = format!(
        "SELECT {JOB_COLUMNS} FROM jobs j JOIN companies c ON c.id = j.company_id WHERE j.id = $1"
    );
    sqlx::query_as::<_, JobRow>(&query)
        .bind(job_id)
        .fetch_optional(pool)
        .await
}

/// Active jobs, newest first.
pub async fn list_jobs(pool: &PgPool) -> Result<Vec<JobRow>, sqlx::Error> {
    let query = format!(
        "SELECT {JOB_COLUMNS} FROM jobs j JOIN companies c ON c.id = j.company_id \
         WHERE j.is_active ORDER BY j.created_at DESC"
    );
    sqlx::query_as::<_, JobRow>(&query).fetch_all(pool).await
}
