//! Match scoring: pluggable, trait-based scorer comparing a candidate's
//! skill set with one job's requirement list.
//!
//! `AppState` holds an `Arc<dyn MatchScorer>`, chosen at startup by `MATCH_MODE`.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::matching::skills::{normalize_key, SkillSet};

/// Result of scoring one (candidate, job) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchOutcome {
    /// Fraction of distinct requirements covered, rounded to 2 decimals. 0.0 – 1.0
    pub score: f64,
    /// Requirements the candidate covers, in the job's own wording.
    pub matched: Vec<String>,
    /// Requirements the candidate lacks, in the job's own wording.
    pub missing: Vec<String>,
    /// Distinct requirements after normalization.
    pub requirement_count: usize,
}

impl MatchOutcome {
    /// Whole-number percentage, 0 – 100.
    pub fn percent(&self) -> u32 {
        (self.score * 100.0).round().clamp(0.0, 100.0) as u32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    Exact,
    Fuzzy,
}

impl FromStr for MatchMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "exact" => Ok(MatchMode::Exact),
            "fuzzy" => Ok(MatchMode::Fuzzy),
            other => Err(anyhow::anyhow!(
                "MATCH_MODE must be 'exact' or 'fuzzy', got '{other}'"
            )),
        }
    }
}

/// Swap backends without touching handlers or the recommendation engine.
pub trait MatchScorer: Send + Sync {
    fn score(&self, skills: &SkillSet, requirements: &[String]) -> MatchOutcome;

    /// Label surfaced in logs.
    fn backend(&self) -> &'static str;
}

pub fn scorer_for(mode: MatchMode) -> Box<dyn MatchScorer> {
    match mode {
        MatchMode::Exact => Box::new(ExactOverlapScorer),
        MatchMode::Fuzzy => Box::new(FuzzyOverlapScorer),
    }
}

/// |requirements ∩ skills| / |requirements| on normalized strings.
pub struct ExactOverlapScorer;

impl MatchScorer for ExactOverlapScorer {
    fn score(&self, skills: &SkillSet, requirements: &[String]) -> MatchOutcome {
        compute_overlap(requirements, |req_key| skills.contains(req_key))
    }

    fn backend(&self) -> &'static str {
        "exact"
    }
}

/// A requirement counts as covered when any candidate skill contains it or is
/// contained in it ("react" covers "React.js", "aws lambda" covers "aws").
pub struct FuzzyOverlapScorer;

impl MatchScorer for FuzzyOverlapScorer {
    fn score(&self, skills: &SkillSet, requirements: &[String]) -> MatchOutcome {
        compute_overlap(requirements, |req_key| {
            skills
                .iter()
                .any(|skill| skill.contains(req_key) || req_key.contains(skill))
        })
    }

    fn backend(&self) -> &'static str {
        "fuzzy"
    }
}

fn compute_overlap(requirements: &[String], covers: impl Fn(&str) -> bool) -> MatchOutcome {
    // Keyed by normalized form; the first spelling seen is the one reported.
    let mut distinct: BTreeMap<String, &str> = BTreeMap::new();
    for req in requirements {
        if let Some(key) = normalize_key(req) {
            distinct.entry(key).or_insert(req.trim());
        }
    }

    if distinct.is_empty() {
        return MatchOutcome {
            score: 0.0,
            matched: vec![],
            missing: vec![],
            requirement_count: 0,
        };
    }

    let mut matched = Vec::new();
    let mut missing = Vec::new();
    for (key, original) in &distinct {
        if covers(key) {
            matched.push(original.to_string());
        } else {
            missing.push(original.to_string());
        }
    }

    let requirement_count = distinct.len();
    let score = round2(matched.len() as f64 / requirement_count as f64);

    MatchOutcome {
        score,
        matched,
        missing,
        requirement_count,
    }
}

fn round2(value: f64) -> f64 {
    ((value * 100.0).round() / 100.0).clamp(0.0, 1.0)
}

/// Human-readable explanation stored alongside a recommendation.
pub fn explain(outcome: &MatchOutcome) -> String {
    if outcome.matched.is_empty() {
        return format!(
            "Matches 0 of {} required skills.",
            outcome.requirement_count
        );
    }
    format!(
        "Matches {} of {} required skills: {}.",
        outcome.matched.len(),
        outcome.requirement_count,
        outcome.matched.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reqs(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_exact_overlap_ratio() {
        let skills = SkillSet::new(["Python", "SQL", "Docker"]);
        let outcome = ExactOverlapScorer.score(
            &skills,
            &reqs(&["Python", "FastAPI", "SQL", "Docker", "AWS"]),
        );
        assert!((outcome.score - 0.6).abs() < f64::EPSILON);
        assert_eq!(outcome.matched, vec!["Docker", "Python", "SQL"]);
        assert_eq!(outcome.missing, vec!["AWS", "FastAPI"]);
        assert_eq!(outcome.requirement_count, 5);
    }

    #[test]
    fn test_exact_overlap_is_case_insensitive() {
        let skills = SkillSet::new(["react", "typescript"]);
        let outcome = ExactOverlapScorer.score(&skills, &reqs(&["React", "TypeScript"]));
        assert!((outcome.score - 1.0).abs() < f64::EPSILON);
        assert!(outcome.missing.is_empty());
    }

    #[test]
    fn test_duplicate_requirements_count_once() {
        let skills = SkillSet::new(["Go"]);
        let outcome = ExactOverlapScorer.score(&skills, &reqs(&["Go", "go ", "Rust"]));
        assert_eq!(outcome.requirement_count, 2);
        assert!((outcome.score - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_requirements_score_zero() {
        let skills = SkillSet::new(["Python"]);
        let outcome = ExactOverlapScorer.score(&skills, &[]);
        assert_eq!(outcome.score, 0.0);
        assert_eq!(outcome.requirement_count, 0);
        assert!(outcome.matched.is_empty());
    }

    #[test]
    fn test_score_rounded_to_two_decimals() {
        let skills = SkillSet::new(["A"]);
        let outcome = ExactOverlapScorer.score(&skills, &reqs(&["A", "B", "C"]));
        assert!((outcome.score - 0.33).abs() < f64::EPSILON);
        assert_eq!(outcome.percent(), 33);
    }

    #[test]
    fn test_fuzzy_matches_substrings_both_ways() {
        let skills = SkillSet::new(["React", "AWS Lambda"]);
        let outcome = FuzzyOverlapScorer.score(&skills, &reqs(&["React.js", "AWS", "Kafka"]));
        assert_eq!(outcome.matched, vec!["AWS", "React.js"]);
        assert_eq!(outcome.missing, vec!["Kafka"]);
    }

    #[test]
    fn test_fuzzy_score_never_exceeds_one() {
        // Several skills hitting one requirement still count it once.
        let skills = SkillSet::new(["python", "python3", "cpython"]);
        let outcome = FuzzyOverlapScorer.score(&skills, &reqs(&["Python"]));
        assert!((outcome.score - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_match_mode_parsing() {
        assert_eq!("Exact".parse::<MatchMode>().unwrap(), MatchMode::Exact);
        assert_eq!(" fuzzy ".parse::<MatchMode>().unwrap(), MatchMode::Fuzzy);
        assert!("semantic".parse::<MatchMode>().is_err());
    }

    #[test]
    fn test_scorer_for_selects_backend() {
        assert_eq!(scorer_for(MatchMode::Exact).backend(), "exact");
        assert_eq!(scorer_for(MatchMode::Fuzzy).backend(), "fuzzy");
    }

    #[test]
    fn test_explain_lists_matched_skills() {
        let outcome = MatchOutcome {
            score: 0.4,
            matched: vec!["Python".to_string(), "SQL".to_string()],
            missing: vec![],
            requirement_count: 5,
        };
        assert_eq!(
            explain(&outcome),
            "Matches 2 of 5 required skills: Python, SQL."
        );
    }

    #[test]
    fn test_explain_without_matches() {
        let outcome = ExactOverlapScorer.score(&SkillSet::default(), &reqs(&["Rust"]));
        assert_eq!(explain(&outcome), "Matches 0 of 1 required skills.");
    }
}
