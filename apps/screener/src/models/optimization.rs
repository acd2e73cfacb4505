use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::candidate::CandidateRecord;
use crate::models::job::JobRequirementSummary;
use crate::models::{fingerprint, truncate_chars, RecordStatus, SCHEMA_VERSION};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OptimizationMode {
    Llm,
    #[default]
    Basic,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct KeywordOptimization {
    #[serde(default)]
    pub add_keywords: Vec<String>,
    #[serde(default)]
    pub improve_sections: Vec<String>,
}

/// ATS advice for one resume against one job.
///
/// The LLM is asked for exactly this shape; a reply that does not deserialize
/// into it is treated as a failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationReport {
    /// 0 to 100.
    pub ats_score: f64,
    #[serde(default)]
    pub missing_keywords: Vec<String>,
    #[serde(default)]
    pub keyword_optimization: KeywordOptimization,
    #[serde(default)]
    pub format_improvements: Vec<String>,
    #[serde(default)]
    pub content_suggestions: Vec<String>,
    #[serde(default)]
    pub skills_gap: Vec<String>,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub action_items: Vec<String>,
    #[serde(default)]
    pub mode: OptimizationMode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeInfo {
    pub file_name: String,
    pub name: String,
    pub email: String,
    pub word_count: usize,
    pub skills_count: usize,
}

impl From<&CandidateRecord> for ResumeInfo {
    fn from(c: &CandidateRecord) -> Self {
        Self {
            file_name: c.file_name.clone(),
            name: c.name.clone(),
            email: c.email.clone(),
            word_count: c.word_count,
            skills_count: c.skills.len(),
        }
    }
}

/// Persisted record of one optimization run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationRecord {
    pub schema_version: u32,
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub resume_info: ResumeInfo,
    pub job_description: String,
    pub job_fingerprint: String,
    pub report: OptimizationReport,
    pub job_analysis: JobRequirementSummary,
    pub status: RecordStatus,
}

impl OptimizationRecord {
    pub fn new(
        resume_info: ResumeInfo,
        job_text: &str,
        report: OptimizationReport,
        job_analysis: JobRequirementSummary,
    ) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            resume_info,
            job_description: truncate_chars(job_text, 500),
            job_fingerprint: fingerprint(job_text),
            report,
            job_analysis,
            status: RecordStatus::Completed,
        }
    }
}

/// Everything `optimize` prints.
#[derive(Debug, Clone, Serialize)]
pub struct OptimizationResponse {
    pub record_id: Option<Uuid>,
    pub resume_info: ResumeInfo,
    pub report: OptimizationReport,
    pub job_analysis: JobRequirementSummary,
}
