use async_trait::async_trait;

use crate::analysis::models::RawAnalysis;
use crate::analysis::prompts::resume_analysis_prompt;
use crate::errors::AppError;
use crate::llm_client::{prompts::JSON_ONLY_SYSTEM, LlmClient};

/// Turns resume text into a raw analysis. Output is consolidated afterwards,
/// so implementations may return partial sections.
#[async_trait]
pub trait ResumeAnalyzer: Send + Sync {
    async fn analyze(&self, resume_text: &str) -> Result<RawAnalysis, AppError>;

    /// Short name for logs and audit rows.
    fn backend(&self) -> &'static str;
}

/// Single-call analyzer backed by the Anthropic API.
pub struct LlmResumeAnalyzer {
    llm: LlmClient,
}

impl LlmResumeAnalyzer {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl ResumeAnalyzer for LlmResumeAnalyzer {
    async fn analyze(&self, resume_text: &str) -> Result<RawAnalysis, AppError> {
        let prompt = resume_analysis_prompt(resume_text);
        self.llm
            .call_json::<RawAnalysis>(&prompt, JSON_ONLY_SYSTEM)
            .await
            .map_err(|e| AppError::Llm(format!("Resume analysis failed: {e}")))
    }

    fn backend(&self) -> &'static str {
        "llm"
    }
}
