//! Users and role gates. Authentication happens upstream; callers pass the
//! `user_id` they were issued.

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::user::{User, UserRole};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub role: UserRole,
}

/// Loads a user or fails with 404.
pub async fn get_user(pool: &PgPool, user_id: Uuid) -> Result<User, AppError> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {user_id} not found")))
}

/// Loads a user and checks their role is one of `allowed`.
pub async fn require_role(
    pool: &PgPool,
    user_id: Uuid,
    allowed: &[UserRole],
    action: &str,
) -> Result<User, AppError> {
    let user = get_user(pool, user_id).await?;
    check_role(&user, allowed, action)?;
    Ok(user)
}

fn check_role(user: &User, allowed: &[UserRole], action: &str) -> Result<(), AppError> {
    match user.role() {
        Some(role) if allowed.contains(&role) => Ok(()),
        _ => {
            let names: Vec<&str> = allowed.iter().map(UserRole::as_str).collect();
            Err(AppError::Forbidden(format!(
                "Only {} accounts can {action}",
                names.join(" or ")
            )))
        }
    }
}

/// POST /api/v1/users
pub async fn handle_create_user(
    State(state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let email = req.email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::Validation("A valid email is required".to_string()));
    }

    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (email, role)
        VALUES ($1, $2)
        ON CONFLICT (email) DO NOTHING
        RETURNING *
        "#,
    )
    .bind(&email)
    .bind(req.role.as_str())
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::Conflict(format!("Email {email} is already registered")))?;

    info!("Created {} user {}", user.role, user.id);
    Ok((StatusCode::CREATED, Json(user)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn make_user(role: &str) -> User {
        User {
            id: Uuid::new_v4(),
            email: "jane@example.com".to_string(),
            role: role.to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_check_role_allows_listed_role() {
        let user = make_user("recruiter");
        assert!(check_role(&user, &[UserRole::Recruiter, UserRole::Admin], "post jobs").is_ok());
    }

    #[test]
    fn test_check_role_rejects_other_roles() {
        let user = make_user("candidate");
        let err = check_role(&user, &[UserRole::Recruiter], "post jobs").unwrap_err();
        match err {
            AppError::Forbidden(msg) => assert_eq!(msg, "Only recruiter accounts can post jobs"),
            other => panic!("expected Forbidden, got {other:?}"),
        }
    }

    #[test]
    fn test_check_role_rejects_unknown_role() {
        let user = make_user("ghost");
        assert!(check_role(&user, &[UserRole::Candidate], "apply").is_err());
    }
}
