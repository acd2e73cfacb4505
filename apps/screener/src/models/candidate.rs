use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of turning one uploaded file into a candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ParseStatus {
    Success,
    Error { message: String },
}

/// Structured view of one resume. Immutable once built, apart from embedding back-fill.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub file_name: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    /// Vocabulary skills, lower-cased, sorted, unique.
    pub skills: Vec<String>,
    /// Every extracted keyword, most frequent first.
    pub keywords: Vec<String>,
    pub experience_years: Option<u32>,
    /// `None` when the provider failed at upload time; filled on the next screening.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
    pub word_count: usize,
    pub text_length: usize,
    pub text: String,
    pub status: ParseStatus,
    pub parsed_at: DateTime<Utc>,
}

impl CandidateRecord {
    /// Placeholder for a file that could not be read or parsed.
    pub fn failed(file_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            name: String::new(),
            email: String::new(),
            phone: String::new(),
            skills: Vec::new(),
            keywords: Vec::new(),
            experience_years: None,
            embedding: None,
            word_count: 0,
            text_length: 0,
            text: String::new(),
            status: ParseStatus::Error {
                message: message.into(),
            },
            parsed_at: Utc::now(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.status, ParseStatus::Success)
    }

    /// Only successfully parsed, non-empty resumes take part in ranking.
    pub fn is_rankable(&self) -> bool {
        self.is_success() && !self.text.trim().is_empty()
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.status {
            ParseStatus::Error { message } => Some(message),
            ParseStatus::Success => None,
        }
    }
}

/// Row printed by `list`: the record without its text and vector.
#[derive(Debug, Clone, Serialize)]
pub struct CandidateSummary {
    pub file_name: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub skills_count: usize,
    pub experience_years: Option<u32>,
    pub word_count: usize,
    pub has_embedding: bool,
    pub status: ParseStatus,
}

impl From<&CandidateRecord> for CandidateSummary {
    fn from(c: &CandidateRecord) -> Self {
        Self {
            file_name: c.file_name.clone(),
            name: c.name.clone(),
            email: c.email.clone(),
            phone: c.phone.clone(),
            skills_count: c.skills.len(),
            experience_years: c.experience_years,
            word_count: c.word_count,
            has_embedding: c.embedding.is_some(),
            status: c.status.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_record_is_not_rankable() {
        let record = CandidateRecord::failed("cv.docx", "unsupported file type");
        assert!(!record.is_rankable());
        assert_eq!(record.error_message(), Some("unsupported file type"));
    }

    #[test]
    fn test_status_serializes_with_state_tag() {
        let value = serde_json::to_value(ParseStatus::Error {
            message: "boom".to_string(),
        })
        .unwrap();
        assert_eq!(value["state"], "error");
        assert_eq!(value["message"], "boom");
    }
}
