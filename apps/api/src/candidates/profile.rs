use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::matching::skills::{display_skill_name, normalize_key};
use crate::models::candidate::CandidateRow;
use crate::models::user::User;

/// Profile as returned to clients: the row plus its normalized skill names.
#[derive(Debug, Clone, Serialize)]
pub struct CandidateProfile {
    #[serde(flatten)]
    pub candidate: CandidateRow,
    pub skills: Vec<String>,
}

/// Editable profile fields. `None` leaves the column untouched.
#[derive(Debug, Default, Deserialize)]
pub struct ProfileUpdate {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub experience_level: Option<String>,
    pub resume_url: Option<String>,
    pub linkedin_url: Option<String>,
    pub portfolio_url: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        [
            &self.full_name,
            &self.phone,
            &self.location,
            &self.experience_level,
            &self.resume_url,
            &self.linkedin_url,
            &self.portfolio_url,
        ]
        .iter()
        .all(|field| field.is_none())
    }
}

pub async fn find_by_user(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Option<CandidateRow>, sqlx::Error> {
    sqlx::query_as::<_, CandidateRow>("SELECT * FROM candidates WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

/// Returns the user's candidate profile, creating an empty one on first use.
pub async fn get_or_create(pool: &PgPool, user: &User) -> Result<CandidateRow, sqlx::Error> {
    // The no-op DO UPDATE makes RETURNING yield the existing row on conflict.
    sqlx::query_as::<_, CandidateRow>(
        r#"
        INSERT INTO candidates (user_id, email)
        VALUES ($1, $2)
        ON CONFLICT (user_id) DO UPDATE SET user_id = EXCLUDED.user_id
        RETURNING *
        "#,
    )
    .bind(user.id)
    .bind(&user.email)
    .fetch_one(pool)
    .await
}

pub async fn skill_names(pool: &PgPool, candidate_id: Uuid) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar(
        r#"
        SELECT s.name
        FROM candidate_skills cs
        JOIN skills s ON s.id = cs.skill_id
        WHERE cs.candidate_id = $1
        ORDER BY s.name
        "#,
    )
    .bind(candidate_id)
    .fetch_all(pool)
    .await
}

pub async fn load_profile(
    pool: &PgPool,
    candidate: CandidateRow,
) -> Result<CandidateProfile, sqlx::Error> {
    let skills = skill_names(pool, candidate.id).await?;
    Ok(CandidateProfile { candidate, skills })
}

/// Applies the provided fields; returns `None` if the candidate does not exist.
pub async fn update_profile(
    pool: &PgPool,
    candidate_id: Uuid,
    update: &ProfileUpdate,
) -> Result<Option<CandidateRow>, sqlx::Error> {
    sqlx::query_as::<_, CandidateRow>(
        r#"
        UPDATE candidates SET
            full_name        = COALESCE($2, full_name),
            phone            = COALESCE($3, phone),
            location         = COALESCE($4, location),
            experience_level = COALESCE($5, experience_level),
            resume_url       = COALESCE($6, resume_url),
            linkedin_url     = COALESCE($7, linkedin_url),
            portfolio_url    = COALESCE($8, portfolio_url),
            updated_at       = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(candidate_id)
    .bind(&update.full_name)
    .bind(&update.phone)
    .bind(&update.location)
    .bind(&update.experience_level)
    .bind(&update.resume_url)
    .bind(&update.linkedin_url)
    .bind(&update.portfolio_url)
    .fetch_optional(pool)
    .await
}

/// Distinct display names for the `skills` table, deduplicated on the
/// normalized key and in first-seen order.
pub fn normalized_skill_names(raw: &[String]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    raw.iter()
        .filter_map(|s| {
            let key = normalize_key(s)?;
            if !seen.insert(key) {
                return None;
            }
            display_skill_name(s)
        })
        .collect()
}

/// Replaces the candidate's skill links with `names` (already normalized).
pub async fn replace_skills(
    tx: &mut Transaction<'_, Postgres>,
    candidate_id: Uuid,
    names: &[String],
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM candidate_skills WHERE candidate_id = $1")
        .bind(candidate_id)
        .execute(&mut **tx)
        .await?;

    if names.is_empty() {
        return Ok(());
    }

    sqlx::query(
        r#"
        INSERT INTO skills (name)
        SELECT UNNEST($1::text[])
        ON CONFLICT (name) DO NOTHING
        "#,
    )
    .bind(names)
    .execute(&mut **tx)
    .await?;

    sqlx::query(
        r#"
        INSERT INTO candidate_skills (candidate_id, skill_id)
        SELECT $1, s.id FROM skills s WHERE s.name = ANY($2)
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(candidate_id)
    .bind(names)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

/// Stores the consolidated analysis on the profile.
pub async fn store_analysis(
    tx: &mut Transaction<'_, Postgres>,
    candidate_id: Uuid,
    report: &serde_json::Value,
    resume_url: &str,
    experience_level: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE candidates
        SET analysis_report = $2, resume_url = $3, experience_level = $4, updated_at = now()
        WHERE id = $1
        "#,
    )
    .bind(candidate_id)
    .bind(report)
    .bind(resume_url)
    .bind(experience_level)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_update_is_empty() {
        assert!(ProfileUpdate::default().is_empty());
        let update = ProfileUpdate {
            location: Some("Remote".to_string()),
            ..ProfileUpdate::default()
        };
        assert!(!update.is_empty());
    }

    #[test]
    fn test_normalized_skill_names_dedupes_and_title_cases() {
        let raw = vec![
            "python".to_string(),
            "Python ".to_string(),
            "machine learning".to_string(),
            "  ".to_string(),
        ];
        assert_eq!(
            normalized_skill_names(&raw),
            vec!["Python".to_string(), "Machine Learning".to_string()]
        );
    }
}
