// Resume analysis: PDF text extraction, LLM analysis, consolidation into the
// candidate's report, and the history/audit trail around each run.
pub mod analyzer;
pub mod audit;
pub mod handlers;
pub mod models;
pub mod pipeline;
pub mod prompts;
pub mod store;
