//! Resume upload pipeline.
//!
//! Flow for one upload:
//! 1. validate_upload() → extension, size, non-empty
//! 2. extract_pdf_text() → plain text (blocking thread)
//! 3. store_resume() → S3 at `resumes/<candidate_id>/<uuid>.pdf`
//! 4. timed_analysis() → raw analysis + elapsed ms, audited in `ai_runs`
//! 5. consolidate() → report
//! 6. record_analysis() → skills, recommendations, report and history row,
//!    all in one transaction

use std::time::Instant;

use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use serde::Serialize;
use serde_json::json;
use sqlx::{Postgres, Transaction};
use tracing::{info, warn};
use uuid::Uuid;

use crate::analysis::analyzer::ResumeAnalyzer;
use crate::analysis::audit::{
    record_ai_run, AiRun, ACTION_RESUME_ANALYSIS, ACTION_RESUME_ANALYSIS_FAILED,
};
use crate::analysis::models::{consolidate, AnalysisReport, RawAnalysis};
use crate::analysis::store::insert_analysis;
use crate::candidates::profile::{
    get_or_create, normalized_skill_names, replace_skills, store_analysis,
};
use crate::config::RecommendationSettings;
use crate::errors::AppError;
use crate::matching::recommendations::refresh_recommendations;
use crate::matching::scoring::MatchScorer;
use crate::matching::skills::SkillSet;
use crate::models::user::User;
use crate::state::AppState;

/// A file pulled out of the multipart body.
#[derive(Debug, Clone)]
pub struct ResumeUpload {
    pub filename: String,
    pub bytes: Bytes,
}

#[derive(Debug, Serialize)]
pub struct UploadOutcome {
    pub analysis_id: Uuid,
    pub candidate_id: Uuid,
    pub resume_url: String,
    pub report: AnalysisReport,
    pub recommendations: usize,
}

pub fn validate_upload(upload: &ResumeUpload, max_bytes: usize) -> Result<(), AppError> {
    if !upload.filename.to_lowercase().ends_with(".pdf") {
        return Err(AppError::Validation("Only PDF files are allowed".to_string()));
    }
    if upload.bytes.is_empty() {
        return Err(AppError::Validation("Uploaded file is empty".to_string()));
    }
    if upload.bytes.len() > max_bytes {
        return Err(AppError::Validation(format!(
            "File too large: {} bytes (max {max_bytes})",
            upload.bytes.len()
        )));
    }
    Ok(())
}

/// Extracts text off the async executor; PDF parsing is CPU-bound.
pub async fn extract_pdf_text(bytes: Bytes) -> Result<String, AppError> {
    let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
        .await
        .map_err(|e| AppError::Pdf(format!("PDF extraction aborted: {e}")))?
        .map_err(|e| AppError::Pdf(format!("Could not read PDF: {e}")))?;

    if text.trim().is_empty() {
        return Err(AppError::Pdf(
            "No text could be extracted from the PDF".to_string(),
        ));
    }
    Ok(text)
}

pub fn resume_key(candidate_id: Uuid) -> String {
    format!("resumes/{candidate_id}/{}.pdf", Uuid::new_v4())
}

/// Uploads the original PDF; returns its `s3://` URL.
pub async fn store_resume(
    s3: &aws_sdk_s3::Client,
    bucket: &str,
    candidate_id: Uuid,
    bytes: Bytes,
) -> Result<String, AppError> {
    let key = resume_key(candidate_id);
    s3.put_object()
        .bucket(bucket)
        .key(&key)
        .body(ByteStream::from(bytes))
        .content_type("application/pdf")
        .send()
        .await
        .map_err(|e| AppError::S3(format!("Resume upload failed: {e}")))?;

    info!("Uploaded resume to s3://{bucket}/{key}");
    Ok(format!("s3://{bucket}/{key}"))
}

/// Runs the analyzer and measures it.
pub async fn timed_analysis(
    analyzer: &dyn ResumeAnalyzer,
    resume_text: &str,
) -> (Result<RawAnalysis, AppError>, i64) {
    let started = Instant::now();
    let result = analyzer.analyze(resume_text).await;
    let elapsed_ms = i64::try_from(started.elapsed().as_millis()).unwrap_or(i64::MAX);
    (result, elapsed_ms)
}

fn audit_entry(
    result: &Result<RawAnalysis, AppError>,
    input_len: usize,
    backend: &str,
    elapsed_ms: i64,
) -> AiRun {
    let input_data = json!({"text_length": input_len, "backend": backend});
    match result {
        Ok(raw) => AiRun {
            action_type: ACTION_RESUME_ANALYSIS,
            succeeded: true,
            input_data,
            output_data: serde_json::to_value(raw).ok(),
            error_message: None,
            execution_time_ms: elapsed_ms,
        },
        Err(e) => AiRun {
            action_type: ACTION_RESUME_ANALYSIS_FAILED,
            succeeded: false,
            input_data,
            output_data: None,
            error_message: Some(e.to_string()),
            execution_time_ms: elapsed_ms,
        },
    }
}

/// Full upload → analysis → recommendations run for one candidate user.
pub async fn process_resume_upload(
    state: &AppState,
    user: &User,
    upload: ResumeUpload,
) -> Result<UploadOutcome, AppError> {
    let started = Instant::now();
    validate_upload(&upload, state.config.max_resume_bytes)?;

    let text = extract_pdf_text(upload.bytes.clone()).await?;
    info!(
        "Extracted {} characters from {} for user {}",
        text.len(),
        upload.filename,
        user.id
    );

    let candidate = get_or_create(&state.db, user).await?;
    let resume_url = store_resume(
        &state.s3,
        &state.config.s3_bucket,
        candidate.id,
        upload.bytes,
    )
    .await?;

    let (result, analysis_ms) = timed_analysis(state.analyzer.as_ref(), &text).await;
    record_ai_run(
        &state.db,
        &audit_entry(&result, text.len(), state.analyzer.backend(), analysis_ms),
    )
    .await;
    let raw = result?;

    let report = consolidate(&raw, candidate.experience_level.as_deref());

    let mut tx = state.db.begin().await?;
    let recorded = record_analysis(
        &mut tx,
        state.match_scorer.as_ref(),
        state.config.recommendation,
        candidate.id,
        &resume_url,
        report,
        started,
    )
    .await?;
    tx.commit().await?;

    info!(
        "Analyzed resume for candidate {}: {} skills, {} recommendations in {}ms",
        candidate.id,
        recorded.report.skills.len(),
        recorded.recommendations,
        recorded.processing_ms
    );

    Ok(UploadOutcome {
        analysis_id: recorded.analysis_id,
        candidate_id: candidate.id,
        resume_url,
        report: recorded.report,
        recommendations: recorded.recommendations,
    })
}

/// What one analysis run left in the database.
#[derive(Debug)]
pub struct RecordedAnalysis {
    pub analysis_id: Uuid,
    pub report: AnalysisReport,
    pub recommendations: usize,
    pub processing_ms: i64,
}

/// Writes one analysis run inside the caller's transaction: skill links,
/// refreshed recommendations, the report on the profile and the history row.
pub async fn record_analysis(
    tx: &mut Transaction<'_, Postgres>,
    scorer: &dyn MatchScorer,
    settings: RecommendationSettings,
    candidate_id: Uuid,
    resume_url: &str,
    mut report: AnalysisReport,
    started: Instant,
) -> Result<RecordedAnalysis, AppError> {
    let skill_names = normalized_skill_names(&report.skills);
    if skill_names.is_empty() {
        warn!("No skills detected for candidate {candidate_id}");
    }
    replace_skills(tx, candidate_id, &skill_names).await?;

    let matches = refresh_recommendations(
        tx,
        scorer,
        candidate_id,
        &SkillSet::new(&skill_names),
        report.experience_level,
        settings,
    )
    .await?;
    report.attach_matches(&matches);
    report.skills = skill_names;

    let report_json = serde_json::to_value(&report)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Report serialization failed: {e}")))?;
    store_analysis(
        tx,
        candidate_id,
        &report_json,
        resume_url,
        report.experience_level.as_str(),
    )
    .await?;

    let processing_ms = i64::try_from(started.elapsed().as_millis()).unwrap_or(i64::MAX);
    let analysis_id = insert_analysis(
        tx,
        candidate_id,
        resume_url,
        &report,
        i32::try_from(matches.len()).unwrap_or(i32::MAX),
        processing_ms,
    )
    .await?;

    Ok(RecordedAnalysis {
        analysis_id,
        report,
        recommendations: matches.len(),
        processing_ms,
    })
}
