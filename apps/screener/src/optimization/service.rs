use tracing::{info, warn};

use crate::errors::AppError;
use crate::models::optimization::{OptimizationRecord, OptimizationResponse, ResumeInfo};
use crate::state::AppState;

/// Analyzes one resume against a job and records the report.
pub async fn optimize_resume(
    state: &AppState,
    file_name: &str,
    resume_text: &str,
    job_text: &str,
) -> Result<OptimizationResponse, AppError> {
    if job_text.trim().is_empty() {
        return Err(AppError::Validation(
            "Job description cannot be empty".to_string(),
        ));
    }

    let candidate = state.parser.parse(file_name, resume_text);
    if let Some(message) = candidate.error_message() {
        return Err(AppError::Validation(format!(
            "Could not read resume {file_name}: {message}"
        )));
    }

    let report = state
        .optimizer
        .optimize(
            state.llm.as_deref(),
            resume_text,
            job_text,
            state.config.llm_timeout,
        )
        .await;
    let job_analysis = state.analyzer.extract_job_requirements(job_text);
    let resume_info = ResumeInfo::from(&candidate);

    info!(
        file = %file_name,
        ats_score = report.ats_score,
        mode = ?report.mode,
        "Resume optimized"
    );

    let record = OptimizationRecord::new(
        resume_info.clone(),
        job_text,
        report.clone(),
        job_analysis.clone(),
    );
    let record_id = match state.optimizations.save(record).await {
        Ok(id) => Some(id),
        Err(e) => {
            warn!(error = %e, "Failed to save optimization results");
            None
        }
    };

    Ok(OptimizationResponse {
        record_id,
        resume_info,
        report,
        job_analysis,
    })
}
