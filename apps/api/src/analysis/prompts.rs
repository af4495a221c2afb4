// Prompt templates for resume analysis.

use crate::llm_client::prompts::NO_INVENTION_INSTRUCTION;

/// Resume text beyond this many characters is cut before prompting.
pub const MAX_RESUME_CHARS: usize = 24_000;

const RESUME_ANALYSIS_TEMPLATE: &str = r#"Analyze the resume below for a recruiting platform.

Return a JSON object with exactly this shape:
{
  "extracted_data": {
    "skills": ["<technical skill>", "..."],
    "experience_level": "Junior | Mid-level | Senior | Lead | Executive"
  },
  "analysis_results": {
    "skills_analysis": {
      "technical_skills": ["<technical skill>", "..."],
      "experience_level": "Junior | Mid-level | Senior | Lead | Executive",
      "key_achievements": ["<achievement>", "..."]
    },
    "strengths": ["<strength>", "..."],
    "gaps": ["<gap or missing qualification>", "..."]
  },
  "final_recommendation": {
    "summary": "<two or three sentence summary of the candidate>"
  }
}

Skills are short canonical names ("Python", "PostgreSQL", "React"), one per item.
{no_invention}

RESUME:
{resume_text}"#;

pub fn resume_analysis_prompt(resume_text: &str) -> String {
    RESUME_ANALYSIS_TEMPLATE
        .replace("{no_invention}", NO_INVENTION_INSTRUCTION)
        .replace("{resume_text}", truncate_chars(resume_text, MAX_RESUME_CHARS))
}

fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_embeds_resume_text() {
        let prompt = resume_analysis_prompt("Jane Doe\nPython, SQL");
        assert!(prompt.contains("Jane Doe\nPython, SQL"));
        assert!(!prompt.contains("{resume_text}"));
        assert!(!prompt.contains("{no_invention}"));
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }
}
