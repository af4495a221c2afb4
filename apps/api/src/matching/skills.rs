//! Skill normalization shared by every scorer.
//!
//! Skills arrive from three places (LLM output, the `skills` table, and job
//! requirement lists) with inconsistent casing and whitespace. `SkillSet`
//! compares on a trimmed, lowercased key and iterates in sorted order so
//! scores and explanations are deterministic.

use std::collections::BTreeSet;

use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkillSet {
    keys: BTreeSet<String>,
}

impl SkillSet {
    pub fn new<I, S>(skills: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keys = skills
            .into_iter()
            .filter_map(|s| normalize_key(s.as_ref()))
            .collect();
        Self { keys }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn contains(&self, skill: &str) -> bool {
        normalize_key(skill).is_some_and(|k| self.keys.contains(&k))
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }
}

/// Lowercased, whitespace-collapsed comparison key. `None` for blank input.
pub fn normalize_key(raw: &str) -> Option<String> {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed.to_lowercase())
    }
}

/// Display form stored in the `skills` table: trimmed, each word title-cased.
/// "  machine learning " -> "Machine Learning", "c++" -> "C++".
pub fn display_skill_name(raw: &str) -> Option<String> {
    let words: Vec<String> = raw
        .split_whitespace()
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                None => String::new(),
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
            }
        })
        .collect();
    if words.is_empty() {
        None
    } else {
        Some(words.join(" "))
    }
}

/// Decodes a job's `requirements` column.
///
/// Accepts a JSON list of strings, a string holding a JSON-encoded list, or a
/// single bare string. Non-string list items and blank strings are dropped.
pub fn parse_requirements(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(|v| v.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect(),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return vec![];
            }
            match serde_json::from_str::<Value>(trimmed) {
                Ok(inner @ Value::Array(_)) => parse_requirements(&inner),
                _ => vec![trimmed.to_string()],
            }
        }
        _ => vec![],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_skill_set_is_case_and_whitespace_insensitive() {
        let set = SkillSet::new(["Python", " python ", "PYTHON", "Machine   Learning"]);
        assert_eq!(set.len(), 2);
        assert!(set.contains("machine learning"));
        assert!(set.contains("Python"));
    }

    #[test]
    fn test_skill_set_drops_blank_entries() {
        let set = SkillSet::new(["", "   ", "Go"]);
        assert_eq!(set.iter().collect::<Vec<_>>(), vec!["go"]);
    }

    #[test]
    fn test_skill_set_iterates_sorted() {
        let set = SkillSet::new(["SQL", "Docker", "AWS"]);
        assert_eq!(set.iter().collect::<Vec<_>>(), vec!["aws", "docker", "sql"]);
    }

    #[test]
    fn test_display_skill_name_title_cases_words() {
        assert_eq!(
            display_skill_name("  machine LEARNING "),
            Some("Machine Learning".to_string())
        );
        assert_eq!(display_skill_name("c++"), Some("C++".to_string()));
        assert_eq!(display_skill_name("   "), None);
    }

    #[test]
    fn test_parse_requirements_from_json_list() {
        let reqs = parse_requirements(&json!(["React", " TypeScript ", "", 42]));
        assert_eq!(reqs, vec!["React", "TypeScript"]);
    }

    #[test]
    fn test_parse_requirements_from_encoded_string() {
        let reqs = parse_requirements(&json!("[\"Python\", \"SQL\"]"));
        assert_eq!(reqs, vec!["Python", "SQL"]);
    }

    #[test]
    fn test_parse_requirements_from_bare_string() {
        let reqs = parse_requirements(&json!("Kubernetes"));
        assert_eq!(reqs, vec!["Kubernetes"]);
    }

    #[test]
    fn test_parse_requirements_other_shapes_are_empty() {
        assert!(parse_requirements(&json!(null)).is_empty());
        assert!(parse_requirements(&json!({"a": 1})).is_empty());
    }
}
