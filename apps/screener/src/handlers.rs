//! Command handlers. Each one validates its input, calls into the core and returns
//! a serializable response that `main` prints as JSON.

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;
use tracing::info;
use uuid::Uuid;

use crate::candidates::batch::BatchStatistics;
use crate::candidates::loader::{display_name, extract_text, load_candidates, MAX_FILES_PER_UPLOAD};
use crate::cli::{Commands, HistoryCommand, JobInput, JobLookup};
use crate::errors::AppError;
use crate::keywords::KeywordHit;
use crate::matching::service::{embed_new_candidates, screen};
use crate::models::candidate::CandidateSummary;
use crate::models::job::JobRequirementSummary;
use crate::models::fingerprint;
use crate::models::optimization::OptimizationRecord;
use crate::models::screening::{ScreeningRecord, ScreeningResponse};
use crate::optimization::service::optimize_resume;
use crate::state::AppState;
use crate::store::optimization::OptimizationStatistics;
use crate::store::screening::{CandidateAppearance, ScreeningStatistics};

// ────────────────────────────────────────────────────────────────────────────
// Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct FailedFile {
    pub file_name: String,
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub total_uploaded: usize,
    pub successful_parses: usize,
    pub failed_parses: usize,
    pub embedded: usize,
    pub batch_size: usize,
    pub processed_resumes: Vec<CandidateSummary>,
    pub failed_files: Vec<FailedFile>,
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub total_resumes: usize,
    pub resumes: Vec<CandidateSummary>,
}

#[derive(Debug, Serialize)]
pub struct ClearResponse {
    pub message: String,
    pub resumes_cleared: usize,
    pub history_cleared: bool,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeJobResponse {
    pub requirements: JobRequirementSummary,
    pub keywords: Vec<KeywordHit>,
}

#[derive(Debug, Serialize)]
pub struct CandidateHistoryResponse {
    pub email: String,
    pub screenings: Vec<CandidateAppearance>,
    pub optimizations: Vec<OptimizationRecord>,
}

#[derive(Debug, Serialize)]
pub struct JobHistoryResponse {
    pub job_fingerprint: String,
    pub screenings: Vec<ScreeningRecord>,
    pub optimizations: Vec<OptimizationRecord>,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub batch: BatchStatistics,
    pub screenings: ScreeningStatistics,
    pub optimizations: OptimizationStatistics,
    pub embedding_provider: String,
    pub llm_enabled: bool,
}

// ────────────────────────────────────────────────────────────────────────────
// Dispatch
// ────────────────────────────────────────────────────────────────────────────

pub async fn run(state: &AppState, command: Commands) -> Result<Value, AppError> {
    let value = match command {
        Commands::Upload { files, replace } => {
            serde_json::to_value(handle_upload(state, files, replace).await?)?
        }
        Commands::List => serde_json::to_value(handle_list(state).await)?,
        Commands::Clear { history } => serde_json::to_value(handle_clear(state, history).await?)?,
        Commands::Match { job, top_k } => {
            serde_json::to_value(handle_match(state, &job, top_k).await?)?
        }
        Commands::Optimize { job, resume } => {
            let job_text = read_job(&job).await?;
            let (file_name, resume_text) = read_resume(state, &resume).await?;
            serde_json::to_value(optimize_resume(state, &file_name, &resume_text, &job_text).await?)?
        }
        Commands::AnalyzeJob { job } => {
            serde_json::to_value(handle_analyze_job(state, &read_job(&job).await?))?
        }
        Commands::History { command } => handle_history(state, command).await?,
        Commands::Stats => serde_json::to_value(handle_stats(state).await?)?,
    };
    Ok(value)
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

pub async fn handle_upload(
    state: &AppState,
    files: Vec<PathBuf>,
    replace: bool,
) -> Result<UploadResponse, AppError> {
    if files.is_empty() {
        return Err(AppError::Validation("No files uploaded".to_string()));
    }
    if files.len() > MAX_FILES_PER_UPLOAD {
        return Err(AppError::Validation(format!(
            "Maximum {MAX_FILES_PER_UPLOAD} files allowed per upload"
        )));
    }

    let mut records = load_candidates(&files, &state.parser).await;
    let embedded = embed_new_candidates(
        state.embedder.as_ref(),
        state.config.embedding_timeout,
        &mut records,
    )
    .await;

    let processed_resumes: Vec<CandidateSummary> =
        records.iter().map(CandidateSummary::from).collect();
    let failed_files: Vec<FailedFile> = records
        .iter()
        .filter_map(|r| {
            r.error_message().map(|error| FailedFile {
                file_name: r.file_name.clone(),
                error: error.to_string(),
            })
        })
        .collect();
    let successful_parses = records.len() - failed_files.len();

    let batch = if replace {
        state.batch.replace(records).await?
    } else {
        state.batch.append(records).await?
    };
    info!(
        successful_parses,
        failed = failed_files.len(),
        batch_size = batch.len(),
        "Upload complete"
    );

    Ok(UploadResponse {
        message: format!(
            "Successfully processed {} out of {} files",
            successful_parses,
            files.len()
        ),
        total_uploaded: files.len(),
        successful_parses,
        failed_parses: failed_files.len(),
        embedded,
        batch_size: batch.len(),
        processed_resumes,
        failed_files,
    })
}

pub async fn handle_list(state: &AppState) -> ListResponse {
    let batch = state.batch.current().await;
    ListResponse {
        total_resumes: batch.len(),
        resumes: batch.candidates.iter().map(CandidateSummary::from).collect(),
    }
}

pub async fn handle_clear(state: &AppState, history: bool) -> Result<ClearResponse, AppError> {
    let resumes_cleared = state.batch.clear().await?;
    if history {
        state.screenings.clear().await?;
        state.optimizations.clear().await?;
    }
    Ok(ClearResponse {
        message: "All data cleared successfully".to_string(),
        resumes_cleared,
        history_cleared: history,
    })
}

pub async fn handle_match(
    state: &AppState,
    job: &JobInput,
    top_k: usize,
) -> Result<ScreeningResponse, AppError> {
    let max = state.config.max_top_k;
    if top_k < 1 || top_k > max {
        return Err(AppError::Validation(format!(
            "top_k must be between 1 and {max}"
        )));
    }
    let job_text = read_job(job).await?;
    screen(state, &job_text, top_k).await
}

pub fn handle_analyze_job(state: &AppState, job_text: &str) -> AnalyzeJobResponse {
    AnalyzeJobResponse {
        requirements: state.analyzer.extract_job_requirements(job_text),
        keywords: state.analyzer.extractor().extract_all(job_text),
    }
}

pub async fn handle_history(state: &AppState, command: HistoryCommand) -> Result<Value, AppError> {
    let value = match command {
        HistoryCommand::Recent {
            limit,
            optimizations,
        } => {
            if optimizations {
                serde_json::to_value(state.optimizations.recent(limit).await?)?
            } else {
                serde_json::to_value(state.screenings.recent(limit).await?)?
            }
        }
        HistoryCommand::Show { id } => show_record(state, id).await?,
        HistoryCommand::Candidate { email, limit } => {
            let screenings = state.screenings.candidate_history(&email, limit).await?;
            let optimizations = state.optimizations.for_email(&email, limit).await?;
            serde_json::to_value(CandidateHistoryResponse {
                email,
                screenings,
                optimizations,
            })?
        }
        HistoryCommand::Job { job, limit } => {
            let job_fingerprint = lookup_fingerprint(job).await?;
            let screenings = state.screenings.by_fingerprint(&job_fingerprint, limit).await?;
            let optimizations = state.optimizations.by_fingerprint(&job_fingerprint, limit).await?;
            serde_json::to_value(JobHistoryResponse {
                job_fingerprint,
                screenings,
                optimizations,
            })?
        }
    };
    Ok(value)
}

async fn lookup_fingerprint(lookup: JobLookup) -> Result<String, AppError> {
    if let Some(raw) = lookup.fingerprint {
        let raw = raw.trim().to_lowercase();
        if raw.len() != 16 || !raw.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(AppError::Validation(format!(
                "Fingerprint must be 16 hex digits, got '{raw}'"
            )));
        }
        return Ok(raw);
    }
    let job = JobInput {
        job: lookup.job,
        job_text: lookup.job_text,
    };
    Ok(fingerprint(&read_job(&job).await?))
}

async fn show_record(state: &AppState, id: Uuid) -> Result<Value, AppError> {
    if let Some(record) = state.screenings.by_id(id).await? {
        return Ok(serde_json::to_value(record)?);
    }
    if let Some(record) = state.optimizations.by_id(id).await? {
        return Ok(serde_json::to_value(record)?);
    }
    Err(AppError::NotFound(format!("No stored session with id {id}")))
}

pub async fn handle_stats(state: &AppState) -> Result<StatsResponse, AppError> {
    Ok(StatsResponse {
        batch: state.batch.current().await.statistics(),
        screenings: state.screenings.statistics().await?,
        optimizations: state.optimizations.statistics().await?,
        embedding_provider: state.embedder.name().to_string(),
        llm_enabled: state.llm.is_some(),
    })
}

/// A resume file on disk, or the name of a candidate already in the batch.
async fn read_resume(state: &AppState, resume: &Path) -> Result<(String, String), AppError> {
    if resume.exists() {
        return Ok((display_name(resume), extract_text(resume).await?));
    }
    let name = display_name(resume);
    let batch = state.batch.current().await;
    match batch.find(&name) {
        Some(candidate) if candidate.is_rankable() => Ok((name, candidate.text.clone())),
        Some(_) => Err(AppError::Validation(format!(
            "Candidate {name} has no readable text"
        ))),
        None => Err(AppError::NotFound(format!(
            "No resume file or uploaded candidate named {name}"
        ))),
    }
}

async fn read_job(job: &JobInput) -> Result<String, AppError> {
    match (&job.job, &job.job_text) {
        (_, Some(text)) => Ok(text.clone()),
        (Some(path), None) => extract_text(path).await,
        (None, None) => Err(AppError::Validation(
            "A job description is required (--job or --job-text)".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::Config;
    use crate::embedding::hash::HashEmbedder;

    async fn state(dir: &tempfile::TempDir) -> AppState {
        AppState::with_providers(
            Config::for_tests(dir.path().join("data")),
            Arc::new(HashEmbedder::new(32)),
            None,
        )
        .await
        .unwrap()
    }

    fn write(dir: &tempfile::TempDir, name: &str, text: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, text).unwrap();
        path
    }

    fn inline(text: &str) -> JobInput {
        JobInput {
            job: None,
            job_text: Some(text.to_string()),
        }
    }

    #[tokio::test]
    async fn test_upload_reports_per_file_failures() {
        let dir = tempfile::tempdir().unwrap();
        let state = state(&dir).await;
        let good = write(&dir, "ada.txt", "Ada Lovelace\nada@example.com\nPython and AWS");
        let bad = write(&dir, "cv.docx", "binary");

        let response = handle_upload(&state, vec![good, bad], false).await.unwrap();
        assert_eq!(response.total_uploaded, 2);
        assert_eq!(response.successful_parses, 1);
        assert_eq!(response.failed_files.len(), 1);
        assert_eq!(response.failed_files[0].file_name, "cv.docx");
        assert_eq!(response.embedded, 1);
        assert_eq!(handle_list(&state).await.total_resumes, 2);
    }

    #[tokio::test]
    async fn test_upload_limits() {
        let dir = tempfile::tempdir().unwrap();
        let state = state(&dir).await;
        assert!(matches!(
            handle_upload(&state, vec![], false).await,
            Err(AppError::Validation(_))
        ));
        let too_many: Vec<PathBuf> = (0..=MAX_FILES_PER_UPLOAD)
            .map(|i| PathBuf::from(format!("{i}.txt")))
            .collect();
        assert!(matches!(
            handle_upload(&state, too_many, false).await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_match_validates_top_k() {
        let dir = tempfile::tempdir().unwrap();
        let state = state(&dir).await;
        for k in [0, 11] {
            let result = handle_match(&state, &inline("Python developer"), k).await;
            assert!(matches!(result, Err(AppError::Validation(_))), "k={k}");
        }
        assert!(handle_match(&state, &inline("Python developer"), 10).await.is_ok());
    }

    #[tokio::test]
    async fn test_history_show_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let state = state(&dir).await;
        let resume = write(&dir, "ada.txt", "Ada Lovelace\nada@example.com\nPython");
        handle_upload(&state, vec![resume], true).await.unwrap();
        let response = handle_match(&state, &inline("Python developer"), 1).await.unwrap();
        let id = response.record_id.unwrap();

        let shown = show_record(&state, id).await.unwrap();
        assert_eq!(shown["id"], id.to_string());
        assert!(matches!(
            show_record(&state, Uuid::new_v4()).await,
            Err(AppError::NotFound(_))
        ));

        let history = handle_history(
            &state,
            HistoryCommand::Candidate {
                email: "ADA@example.com".to_string(),
                limit: 5,
            },
        )
        .await
        .unwrap();
        assert_eq!(history["screenings"].as_array().unwrap().len(), 1);

        let cleared = handle_clear(&state, true).await.unwrap();
        assert_eq!(cleared.resumes_cleared, 1);
        assert!(state.screenings.recent(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_history_job_groups_sessions_by_job_text() {
        let dir = tempfile::tempdir().unwrap();
        let state = state(&dir).await;
        let resume = write(&dir, "ada.txt", "Ada Lovelace\nada@example.com\nPython");
        handle_upload(&state, vec![resume], true).await.unwrap();
        handle_match(&state, &inline("Python developer"), 1).await.unwrap();
        handle_match(&state, &inline("Go developer"), 1).await.unwrap();
        let latest = handle_match(&state, &inline("Python developer"), 1).await.unwrap();

        let by_text = handle_history(
            &state,
            HistoryCommand::Job {
                job: JobLookup {
                    job: None,
                    job_text: Some("Python developer".to_string()),
                    fingerprint: None,
                },
                limit: 10,
            },
        )
        .await
        .unwrap();
        let screenings = by_text["screenings"].as_array().unwrap();
        assert_eq!(screenings.len(), 2);
        let latest_id = latest.record_id.unwrap().to_string();
        assert!(screenings.iter().any(|s| s["id"] == latest_id.as_str()));

        let hash = by_text["job_fingerprint"].as_str().unwrap().to_uppercase();
        let by_hash = handle_history(
            &state,
            HistoryCommand::Job {
                job: JobLookup {
                    job: None,
                    job_text: None,
                    fingerprint: Some(hash),
                },
                limit: 10,
            },
        )
        .await
        .unwrap();
        assert_eq!(by_hash["screenings"].as_array().unwrap().len(), 2);

        let bad = lookup_fingerprint(JobLookup {
            job: None,
            job_text: None,
            fingerprint: Some("not-hex".to_string()),
        })
        .await;
        assert!(matches!(bad, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_read_resume_falls_back_to_batch() {
        let dir = tempfile::tempdir().unwrap();
        let state = state(&dir).await;
        let resume = write(&dir, "ada.txt", "Ada Lovelace\nPython");
        handle_upload(&state, vec![resume.clone()], false).await.unwrap();
        std::fs::remove_file(&resume).unwrap();

        let (name, text) = read_resume(&state, &resume).await.unwrap();
        assert_eq!(name, "ada.txt");
        assert!(text.contains("Python"));
        assert!(matches!(
            read_resume(&state, Path::new("nobody.txt")).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_stats_on_fresh_state() {
        let dir = tempfile::tempdir().unwrap();
        let state = state(&dir).await;
        let stats = handle_stats(&state).await.unwrap();
        assert_eq!(stats.batch.total_resumes, 0);
        assert_eq!(stats.screenings.total_screenings, 0);
        assert_eq!(stats.embedding_provider, "hash");
        assert!(!stats.llm_enabled);
    }

    #[test]
    fn test_analyze_job_is_pure() {
        let dir = tempfile::tempdir().unwrap();
        let rt = tokio::runtime::Runtime::new().unwrap();
        let state = rt.block_on(state(&dir));
        let job = "Senior engineer, Python and AWS, full-time, Bachelor's degree";
        let first = serde_json::to_value(handle_analyze_job(&state, job)).unwrap();
        let second = serde_json::to_value(handle_analyze_job(&state, job)).unwrap();
        assert_eq!(first, second);
        assert!(!first["keywords"].as_array().unwrap().is_empty());
    }
}
