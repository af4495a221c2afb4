// Skill matching: normalization, scoring, job ranking, persisted
// recommendations and per-job match reports.
pub mod engine;
pub mod handlers;
pub mod recommendations;
pub mod report;
pub mod scoring;
pub mod skills;
