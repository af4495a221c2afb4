//! Row builders shared by the database-backed tests (`#[sqlx::test]`).

use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

pub async fn seed_user(pool: &PgPool, role: &str) -> Uuid {
    sqlx::query_scalar("INSERT INTO users (email, role) VALUES ($1, $2) RETURNING id")
        .bind(format!("{}@example.com", Uuid::new_v4()))
        .bind(role)
        .fetch_one(pool)
        .await
        .unwrap()
}

/// Returns `(user_id, candidate_id)`.
pub async fn seed_candidate(pool: &PgPool) -> (Uuid, Uuid) {
    let user_id = seed_user(pool, "candidate").await;
    let candidate_id = sqlx::query_scalar(
        "INSERT INTO candidates (user_id, email) VALUES ($1, 'jane@example.com') RETURNING id",
    )
    .bind(user_id)
    .fetch_one(pool)
    .await
    .unwrap();
    (user_id, candidate_id)
}

/// An active job under a fresh company; `requirements` is stored as given.
pub async fn seed_job(pool: &PgPool, title: &str, requirements: Value) -> Uuid {
    let recruiter = seed_user(pool, "recruiter").await;
    let company_id: Uuid = sqlx::query_scalar(
        "INSERT INTO companies (user_id, name) VALUES ($1, $2) RETURNING id",
    )
    .bind(recruiter)
    .bind(format!("Company {}", Uuid::new_v4()))
    .fetch_one(pool)
    .await
    .unwrap();

    sqlx::query_scalar(
        "INSERT INTO jobs (company_id, title, requirements) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(company_id)
    .bind(title)
    .bind(requirements)
    .fetch_one(pool)
    .await
    .unwrap()
}
