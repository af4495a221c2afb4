//! Resume analysis data models and the merge from raw LLM output into the
//! consolidated report stored on the candidate.
//!
//! The model's output drifts between runs (skills as a list, a JSON string or
//! a comma-separated string; gaps called "weaknesses"; summaries nested in an
//! encoded recommendation blob). `RawAnalysis` keeps every section as loose
//! JSON and `consolidate` resolves each field through an ordered fallback chain.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::matching::engine::{ExperienceLevel, JobMatch};

pub const DEFAULT_SUMMARY: &str = "Analysis complete.";

/// Keys tried, in order, inside `extracted_data.structured_data`.
const STRUCTURED_SKILL_KEYS: &[&str] = &["Technical Skills", "skills", "Skills"];

/// How many ranked jobs are embedded in the report.
const REPORT_TOP_MATCHES: usize = 3;

/// Unvalidated analyzer output. Every section is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawAnalysis {
    #[serde(default)]
    pub extracted_data: Value,
    #[serde(default)]
    pub analysis_results: Value,
    #[serde(default)]
    pub job_matches: Value,
    #[serde(default)]
    pub final_recommendation: Value,
}

/// Consolidated analysis stored in `candidates.analysis_report`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisReport {
    pub summary: String,
    pub strengths: Vec<String>,
    pub gaps: Vec<String>,
    pub skills: Vec<String>,
    pub experience_level: ExperienceLevel,
    pub job_matches: Value,
}

impl AnalysisReport {
    /// Reads a stored report; anything unreadable yields an empty report.
    pub fn from_stored(value: &Value) -> Self {
        serde_json::from_value(value.clone()).unwrap_or_default()
    }

    /// Replaces `job_matches` with the engine's ranked results.
    pub fn attach_matches(&mut self, matches: &[JobMatch]) {
        let top: Vec<Value> = matches
            .iter()
            .take(REPORT_TOP_MATCHES)
            .map(|m| {
                json!({
                    "job_id": m.job_id,
                    "title": m.title,
                    "company": m.company_name,
                    "location": m.location,
                    "match_score": m.outcome.percent(),
                    "matched_skills": m.outcome.matched,
                })
            })
            .collect();
        self.job_matches = json!({
            "matched_jobs": top,
            "number_of_matches": matches.len(),
        });
    }
}

/// Merges raw analyzer output into a report.
/// `stored_level` is the candidate's current level, used when the analysis has none.
pub fn consolidate(raw: &RawAnalysis, stored_level: Option<&str>) -> AnalysisReport {
    let skills_analysis = raw.analysis_results.get("skills_analysis");

    let skills = first_non_empty([
        raw.extracted_data.get("skills").map(string_list),
        skills_analysis
            .and_then(|sa| sa.get("technical_skills"))
            .map(strict_string_list),
        raw.extracted_data
            .get("structured_data")
            .map(structured_skills),
    ]);

    let strengths = first_non_empty([
        raw.analysis_results.get("strengths").map(strict_string_list),
        skills_analysis
            .and_then(|sa| sa.get("key_achievements"))
            .map(strict_string_list),
    ]);

    let gaps = first_non_empty([
        raw.analysis_results.get("gaps").map(strict_string_list),
        raw.analysis_results.get("weaknesses").map(strict_string_list),
    ]);

    let experience_level = ExperienceLevel::resolve([
        skills_analysis
            .and_then(|sa| sa.get("experience_level"))
            .and_then(Value::as_str),
        raw.extracted_data
            .get("experience_level")
            .and_then(Value::as_str),
        stored_level,
    ]);

    let job_matches = if raw.job_matches.is_null() {
        json!({})
    } else {
        raw.job_matches.clone()
    };

    AnalysisReport {
        summary: summary(&raw.final_recommendation),
        strengths,
        gaps,
        skills,
        experience_level,
        job_matches,
    }
}

fn first_non_empty<const N: usize>(options: [Option<Vec<String>>; N]) -> Vec<String> {
    options
        .into_iter()
        .flatten()
        .find(|list| !list.is_empty())
        .unwrap_or_default()
}

/// List of strings from a JSON array; non-string items are dropped.
fn strict_string_list(value: &Value) -> Vec<String> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

/// Like `strict_string_list`, but a string is read as a JSON-encoded list or,
/// failing that, as a comma-separated list.
fn string_list(value: &Value) -> Vec<String> {
    match value {
        Value::String(s) => match serde_json::from_str::<Value>(s) {
            Ok(inner @ Value::Array(_)) => strict_string_list(&inner),
            _ => s
                .split(',')
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .map(String::from)
                .collect(),
        },
        other => strict_string_list(other),
    }
}

fn structured_skills(value: &Value) -> Vec<String> {
    let parsed;
    let object = match value {
        Value::String(s) => match serde_json::from_str::<Value>(s) {
            Ok(v) => {
                parsed = v;
                &parsed
            }
            Err(_) => return vec![],
        },
        other => other,
    };
    STRUCTURED_SKILL_KEYS
        .iter()
        .filter_map(|key| object.get(*key))
        .map(strict_string_list)
        .find(|list| !list.is_empty())
        .unwrap_or_default()
}

fn summary(final_recommendation: &Value) -> String {
    if let Some(s) = final_recommendation
        .get("summary")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
    {
        return s.to_string();
    }

    final_recommendation
        .get("final_recommendation")
        .and_then(Value::as_str)
        .and_then(|encoded| serde_json::from_str::<Value>(encoded).ok())
        .and_then(|inner| {
            inner
                .get("final_recommendations")?
                .as_array()?
                .first()?
                .get("description")?
                .as_str()
                .map(String::from)
        })
        .unwrap_or_else(|| DEFAULT_SUMMARY.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::scoring::MatchOutcome;
    use uuid::Uuid;

    fn raw(value: Value) -> RawAnalysis {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_consolidate_canonical_shape() {
        let analysis = raw(json!({
            "extracted_data": {"skills": ["Python", "SQL"], "experience_level": "Senior"},
            "analysis_results": {
                "skills_analysis": {"technical_skills": ["Go"], "experience_level": "Lead"},
                "strengths": ["Built data pipelines"],
                "gaps": ["No cloud certification"]
            },
            "final_recommendation": {"summary": "Strong backend profile."}
        }));

        let report = consolidate(&analysis, None);
        assert_eq!(report.skills, vec!["Python", "SQL"]);
        assert_eq!(report.strengths, vec!["Built data pipelines"]);
        assert_eq!(report.gaps, vec!["No cloud certification"]);
        assert_eq!(report.experience_level, ExperienceLevel::Lead);
        assert_eq!(report.summary, "Strong backend profile.");
        assert_eq!(report.job_matches, json!({}));
    }

    #[test]
    fn test_skills_from_json_encoded_string() {
        let analysis = raw(json!({"extracted_data": {"skills": "[\"Rust\", \"Tokio\"]"}}));
        assert_eq!(consolidate(&analysis, None).skills, vec!["Rust", "Tokio"]);
    }

    #[test]
    fn test_skills_from_comma_separated_string() {
        let analysis = raw(json!({"extracted_data": {"skills": "React, TypeScript , ,CSS3"}}));
        assert_eq!(
            consolidate(&analysis, None).skills,
            vec!["React", "TypeScript", "CSS3"]
        );
    }

    #[test]
    fn test_skills_fall_back_to_technical_skills() {
        let analysis = raw(json!({
            "extracted_data": {"skills": []},
            "analysis_results": {"skills_analysis": {"technical_skills": ["Kubernetes", 7]}}
        }));
        assert_eq!(consolidate(&analysis, None).skills, vec!["Kubernetes"]);
    }

    #[test]
    fn test_skills_fall_back_to_structured_data() {
        let analysis = raw(json!({
            "extracted_data": {
                "structured_data": "{\"Technical Skills\": [\"Terraform\", \"AWS\"]}"
            }
        }));
        assert_eq!(consolidate(&analysis, None).skills, vec!["Terraform", "AWS"]);

        let object_form = raw(json!({
            "extracted_data": {"structured_data": {"Skills": ["Figma"]}}
        }));
        assert_eq!(consolidate(&object_form, None).skills, vec!["Figma"]);
    }

    #[test]
    fn test_strengths_fall_back_to_key_achievements() {
        let analysis = raw(json!({
            "analysis_results": {
                "skills_analysis": {"key_achievements": ["Cut latency 40%"]}
            }
        }));
        assert_eq!(consolidate(&analysis, None).strengths, vec!["Cut latency 40%"]);
    }

    #[test]
    fn test_gaps_fall_back_to_weaknesses() {
        let analysis = raw(json!({
            "analysis_results": {"gaps": [], "weaknesses": ["Limited leadership"]}
        }));
        assert_eq!(consolidate(&analysis, None).gaps, vec!["Limited leadership"]);
    }

    #[test]
    fn test_experience_level_falls_back_to_stored_then_mid() {
        let empty = RawAnalysis::default();
        assert_eq!(
            consolidate(&empty, Some("Junior")).experience_level,
            ExperienceLevel::Junior
        );
        assert_eq!(
            consolidate(&empty, None).experience_level,
            ExperienceLevel::MidLevel
        );
    }

    #[test]
    fn test_summary_from_encoded_final_recommendation() {
        let encoded = json!({
            "final_recommendations": [{"description": "Interview for backend roles."}]
        })
        .to_string();
        let analysis = raw(json!({
            "final_recommendation": {"final_recommendation": encoded}
        }));
        assert_eq!(consolidate(&analysis, None).summary, "Interview for backend roles.");
    }

    #[test]
    fn test_summary_defaults_when_missing() {
        assert_eq!(consolidate(&RawAnalysis::default(), None).summary, DEFAULT_SUMMARY);
    }

    #[test]
    fn test_from_stored_tolerates_partial_and_invalid_reports() {
        let partial = AnalysisReport::from_stored(&json!({"skills": ["Go"]}));
        assert_eq!(partial.skills, vec!["Go"]);
        assert_eq!(partial.experience_level, ExperienceLevel::MidLevel);

        let invalid = AnalysisReport::from_stored(&json!("not an object"));
        assert_eq!(invalid, AnalysisReport::default());
    }

    #[test]
    fn test_attach_matches_keeps_top_three() {
        let matches: Vec<JobMatch> = (0..5)
            .map(|i| JobMatch {
                job_id: Uuid::new_v4(),
                title: format!("Job {i}"),
                company_name: "CloudScale".to_string(),
                location: None,
                outcome: MatchOutcome {
                    score: 0.5,
                    matched: vec!["AWS".to_string()],
                    missing: vec!["Go".to_string()],
                    requirement_count: 2,
                },
                experience_aligned: None,
            })
            .collect();

        let mut report = AnalysisReport::default();
        report.attach_matches(&matches);
        assert_eq!(report.job_matches["number_of_matches"], 5);
        assert_eq!(report.job_matches["matched_jobs"].as_array().unwrap().len(), 3);
        assert_eq!(report.job_matches["matched_jobs"][0]["match_score"], 50);
    }
}
