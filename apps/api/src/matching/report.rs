//! Per-job match report: deterministic overlap merged with the AI analysis
//! signals (strengths, gaps) stored on the candidate.

use serde::Serialize;

use crate::analysis::models::AnalysisReport;
use crate::matching::scoring::MatchScorer;
use crate::matching::skills::SkillSet;
use crate::models::job::JobRow;

/// How many strengths / gaps to surface next to a job.
const TOP_SIGNALS: usize = 3;

pub const NO_RESUME_MESSAGE: &str = "Please upload your resume first to see match scores";

#[derive(Debug, Clone, Serialize)]
pub struct JobMatchReport {
    pub job_id: uuid::Uuid,
    /// 0 – 100
    pub match_score: u32,
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub strengths: Vec<String>,
    pub gaps: Vec<String>,
    pub has_resume: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// What we know about the candidate once a resume has been analyzed.
pub struct CandidateSignals<'a> {
    pub skills: &'a SkillSet,
    pub analysis: &'a AnalysisReport,
}

pub fn build_job_match_report(
    job: &JobRow,
    candidate: Option<CandidateSignals<'_>>,
    scorer: &dyn MatchScorer,
) -> JobMatchReport {
    let Some(candidate) = candidate else {
        return JobMatchReport {
            job_id: job.id,
            match_score: 0,
            matched_skills: vec![],
            missing_skills: vec![],
            strengths: vec![],
            gaps: vec![],
            has_resume: false,
            message: Some(NO_RESUME_MESSAGE.to_string()),
        };
    };

    let outcome = scorer.score(candidate.skills, &job.requirement_list());

    JobMatchReport {
        job_id: job.id,
        match_score: outcome.percent(),
        matched_skills: outcome.matched,
        missing_skills: outcome.missing,
        strengths: top(&candidate.analysis.strengths),
        gaps: top(&candidate.analysis.gaps),
        has_resume: true,
        message: None,
    }
}

fn top(items: &[String]) -> Vec<String> {
    items.iter().take(TOP_SIGNALS).cloned().collect()
}
