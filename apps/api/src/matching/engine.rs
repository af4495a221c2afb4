//! Candidate job search and ranking.
//!
//! Flow: find_candidate_jobs (SQL prefilter on any skill) → rank_jobs
//! (scorer + threshold + sort). Persistence lives in `recommendations`.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;
use uuid::Uuid;

use crate::matching::scoring::{MatchOutcome, MatchScorer};
use crate::matching::skills::SkillSet;
use crate::models::job::{JobRow, JOB_COLUMNS};

/// Seniority bands used by postings and by the resume analyzer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExperienceLevel {
    Junior,
    #[default]
    #[serde(rename = "Mid-level")]
    MidLevel,
    Senior,
    Lead,
    Executive,
}

impl ExperienceLevel {
    /// Lenient parse of free-text levels ("Mid-Level", "entry", "Staff" ...).
    pub fn parse(raw: &str) -> Option<Self> {
        let key: String = raw
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphabetic())
            .collect();
        match key.as_str() {
            "junior" | "entry" | "entrylevel" | "intern" | "graduate" => {
                Some(ExperienceLevel::Junior)
            }
            "mid" | "midlevel" | "intermediate" => Some(ExperienceLevel::MidLevel),
            "senior" | "sr" => Some(ExperienceLevel::Senior),
            "lead" | "staff" | "principal" | "techlead" => Some(ExperienceLevel::Lead),
            "executive" | "director" | "vp" | "cto" => Some(ExperienceLevel::Executive),
            _ => None,
        }
    }

    /// First parseable value wins; falls back to Mid-level.
    pub fn resolve<'a>(candidates: impl IntoIterator<Item = Option<&'a str>>) -> Self {
        candidates
            .into_iter()
            .flatten()
            .find_map(Self::parse)
            .unwrap_or_default()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ExperienceLevel::Junior => "Junior",
            ExperienceLevel::MidLevel => "Mid-level",
            ExperienceLevel::Senior => "Senior",
            ExperienceLevel::Lead => "Lead",
            ExperienceLevel::Executive => "Executive",
        }
    }
}

impl fmt::Display for ExperienceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One scored job that passed the threshold.
#[derive(Debug, Clone, Serialize)]
pub struct JobMatch {
    pub job_id: Uuid,
    pub title: String,
    pub company_name: String,
    pub location: Option<String>,
    pub outcome: MatchOutcome,
    /// `None` when the posting has no recognizable level.
    pub experience_aligned: Option<bool>,
}

/// Active jobs that could score above zero for `skills`.
///
/// A job qualifies when a requirement contains a skill, a skill contains a
/// requirement (the fuzzy direction), or the description mentions a skill.
/// Requirements are compared in the same trimmed, whitespace-collapsed,
/// lowercase form `normalize_key` produces. A requirements column holding a
/// single JSON string is treated as a one-item list.
/// Returns nothing for an empty skill set.
pub async fn find_candidate_jobs<'e, E>(
    executor: E,
    skills: &SkillSet,
    limit: i64,
) -> Result<Vec<JobRow>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let patterns = like_patterns(skills);
    if patterns.is_empty() {
        return Ok(vec![]);
    }
    let keys: Vec<String> = skills.iter().map(|s| s.to_string()).collect();

    let query = format!(
        r#"
        SELECT {JOB_COLUMNS}
        FROM jobs j
        JOIN companies c ON c.id = j.company_id
        WHERE j.is_active
          AND (
            EXISTS (
                SELECT 1
                FROM jsonb_array_elements_text(
                    CASE jsonb_typeof(j.requirements)
                        WHEN 'array' THEN j.requirements
                        WHEN 'string' THEN jsonb_build_array(j.requirements)
                        ELSE '[]'::jsonb
                    END
                ) AS r(raw_req)
                CROSS JOIN LATERAL (
                    SELECT lower(regexp_replace(btrim(r.raw_req), '\s+', ' ', 'g')) AS req
                ) n
                WHERE n.req <> ''
                  AND (
                    n.req LIKE ANY($1)
                    OR EXISTS (
                        SELECT 1 FROM unnest($2::text[]) AS s(skill)
                        WHERE s.skill LIKE '%' || replace(replace(replace(
                            n.req, '\', '\\'), '%', '\%'), '_', '\_') || '%'
                    )
                  )
            )
            OR COALESCE(j.description, '') ILIKE ANY($1)
          )
        ORDER BY j.created_at DESC
        LIMIT $3
        "#
    );

    sqlx::query_as::<_, JobRow>(&query)
        .bind(&patterns)
        .bind(&keys)
        .bind(limit)
        .fetch_all(executor)
        .await
}

/// `%skill%` patterns with LIKE metacharacters escaped.
fn like_patterns(skills: &SkillSet) -> Vec<String> {
    skills
        .iter()
        .map(|s| {
            let escaped = s
                .replace('\\', "\\\\")
                .replace('%', "\\%")
                .replace('_', "\\_");
            format!("%{escaped}%")
        })
        .collect()
}

/// Scores every job, drops those below `min_score` (and all zero scores),
/// and sorts best first. Ties break on job id for a stable order.
pub fn rank_jobs(
    jobs: &[JobRow],
    skills: &SkillSet,
    level: ExperienceLevel,
    scorer: &dyn MatchScorer,
    min_score: f64,
) -> Vec<JobMatch> {
    let mut matches: Vec<JobMatch> = jobs
        .iter()
        .filter_map(|job| {
            let outcome = scorer.score(skills, &job.requirement_list());
            if outcome.score <= 0.0 || outcome.score < min_score {
                return None;
            }
            let experience_aligned = job
                .experience_level
                .as_deref()
                .and_then(ExperienceLevel::parse)
                .map(|job_level| job_level == level);
            Some(JobMatch {
                job_id: job.id,
                title: job.title.clone(),
                company_name: job.company_name.clone(),
                location: job.location.clone(),
                outcome,
                experience_aligned,
            })
        })
        .collect();

    matches.sort_by(|a, b| {
        b.outcome
            .score
            .partial_cmp(&a.outcome.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.job_id.cmp(&b.job_id))
    });
    matches
}
