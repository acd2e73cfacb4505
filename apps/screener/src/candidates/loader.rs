use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::candidates::parser::ResumeParser;
use crate::errors::AppError;
use crate::models::candidate::CandidateRecord;

/// Most files accepted by one upload.
pub const MAX_FILES_PER_UPLOAD: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SourceKind {
    PlainText,
    Pdf,
}

fn source_kind(path: &Path) -> Option<SourceKind> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "txt" | "md" => Some(SourceKind::PlainText),
        "pdf" => Some(SourceKind::Pdf),
        _ => None,
    }
}

/// File name as shown to the user; falls back to the whole path.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Reads the text of one resume file. PDF extraction runs on a blocking thread.
pub async fn extract_text(path: &Path) -> Result<String, AppError> {
    match source_kind(path) {
        Some(SourceKind::PlainText) => {
            let bytes = tokio::fs::read(path).await?;
            Ok(String::from_utf8_lossy(&bytes).into_owned())
        }
        Some(SourceKind::Pdf) => {
            let owned = path.to_path_buf();
            tokio::task::spawn_blocking(move || pdf_extract::extract_text(&owned))
                .await
                .map_err(|e| {
                    AppError::Internal(anyhow::anyhow!("PDF extraction task failed: {e}"))
                })?
                .map_err(|e| AppError::Validation(format!("PDF extraction error: {e}")))
        }
        None => Err(AppError::Validation(format!(
            "Unsupported file format: {}",
            display_name(path)
        ))),
    }
}

/// Reads and parses every file. A file that fails yields an error-status record
/// and the rest of the batch carries on.
pub async fn load_candidates(paths: &[PathBuf], parser: &ResumeParser) -> Vec<CandidateRecord> {
    let mut records = Vec::with_capacity(paths.len());

    for path in paths {
        let file_name = display_name(path);
        let record = match extract_text(path).await {
            Ok(text) => parser.parse(&file_name, &text),
            Err(e) => {
                warn!(file = %file_name, error = %e, "Could not read resume");
                CandidateRecord::failed(&file_name, e.to_string())
            }
        };
        records.push(record);
    }

    let failed = records.iter().filter(|r| !r.is_success()).count();
    info!(
        total = records.len(),
        failed, "Loaded resume batch"
    );
    records
}
