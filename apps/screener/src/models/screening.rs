use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::matching::fusion::ScoringMode;
use crate::models::job::JobRequirementSummary;
use crate::models::{fingerprint, truncate_chars, RecordStatus, SCHEMA_VERSION};

/// Matched keywords kept per candidate in a stored screening.
const STORED_KEYWORDS_PER_MATCH: usize = 10;

/// One ranked candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    /// 1-based position in the ranking.
    pub rank: usize,
    pub file_name: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub skills: Vec<String>,
    pub experience_years: Option<u32>,
    /// Raw cosine similarity in [-1, 1].
    pub similarity: f64,
    /// Matched / job keywords, in [0, 1].
    pub keyword_overlap: f64,
    /// Fused score in [0, 1].
    pub score: f64,
    /// Ordered by frequency in the job text.
    pub matched_keywords: Vec<String>,
    pub resume_keywords: Vec<String>,
    pub preview: String,
    /// False when the candidate's embedding could not be produced.
    pub similarity_available: bool,
}

/// A candidate left out of ranking, with the reason.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedCandidate {
    pub file_name: String,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExplanationMode {
    Llm,
    Template,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
    pub text: String,
    pub mode: ExplanationMode,
}

/// Per-candidate line of a stored screening.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreeningMatchSummary {
    pub rank: usize,
    pub candidate_name: String,
    pub candidate_email: String,
    pub file_name: String,
    pub score: f64,
    pub similarity: f64,
    pub keyword_overlap: f64,
    pub matched_keywords: Vec<String>,
    pub skills_count: usize,
    pub experience_years: Option<u32>,
}

impl From<&MatchResult> for ScreeningMatchSummary {
    fn from(m: &MatchResult) -> Self {
        Self {
            rank: m.rank,
            candidate_name: m.name.clone(),
            candidate_email: m.email.clone(),
            file_name: m.file_name.clone(),
            score: m.score,
            similarity: m.similarity,
            keyword_overlap: m.keyword_overlap,
            matched_keywords: m
                .matched_keywords
                .iter()
                .take(STORED_KEYWORDS_PER_MATCH)
                .cloned()
                .collect(),
            skills_count: m.skills.len(),
            experience_years: m.experience_years,
        }
    }
}

/// Persisted record of one screening session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreeningRecord {
    pub schema_version: u32,
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub job_description: String,
    pub job_fingerprint: String,
    pub total_candidates: usize,
    pub requested_matches: usize,
    pub actual_matches: usize,
    pub matches: Vec<ScreeningMatchSummary>,
    pub scoring_mode: ScoringMode,
    pub explanation_mode: ExplanationMode,
    pub status: RecordStatus,
}

impl ScreeningRecord {
    pub fn new(
        job_text: &str,
        total_candidates: usize,
        requested_matches: usize,
        matches: &[MatchResult],
        scoring_mode: ScoringMode,
        explanation_mode: ExplanationMode,
    ) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            job_description: truncate_chars(job_text, 500),
            job_fingerprint: fingerprint(job_text),
            total_candidates,
            requested_matches,
            actual_matches: matches.len(),
            matches: matches.iter().map(ScreeningMatchSummary::from).collect(),
            scoring_mode,
            explanation_mode,
            status: RecordStatus::Completed,
        }
    }
}

/// Everything `match` prints.
#[derive(Debug, Clone, Serialize)]
pub struct ScreeningResponse {
    /// `None` when the session could not be persisted.
    pub record_id: Option<Uuid>,
    pub job_keywords: Vec<String>,
    pub matches: Vec<MatchResult>,
    pub reasoning: String,
    pub explanation_mode: ExplanationMode,
    pub scoring_mode: ScoringMode,
    pub job_requirements: JobRequirementSummary,
    pub total_candidates: usize,
    pub skipped: Vec<SkippedCandidate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn match_with_keywords(n: usize) -> MatchResult {
        MatchResult {
            rank: 1,
            file_name: "a.txt".to_string(),
            name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            phone: String::new(),
            skills: vec!["python".to_string()],
            experience_years: Some(4),
            similarity: 0.5,
            keyword_overlap: 0.5,
            score: 0.5,
            matched_keywords: (0..n).map(|i| format!("kw{i}")).collect(),
            resume_keywords: Vec::new(),
            preview: String::new(),
            similarity_available: true,
        }
    }

    #[test]
    fn test_record_truncates_job_text_and_keywords() {
        let job = "x".repeat(800);
        let record = ScreeningRecord::new(
            &job,
            3,
            5,
            &[match_with_keywords(25)],
            ScoringMode::Hybrid,
            ExplanationMode::Template,
        );
        assert_eq!(record.job_description.chars().count(), 503);
        assert!(record.job_description.ends_with("..."));
        assert_eq!(record.matches[0].matched_keywords.len(), 10);
        assert_eq!(record.actual_matches, 1);
        assert_eq!(record.requested_matches, 5);
        assert_eq!(record.schema_version, SCHEMA_VERSION);
    }

    #[test]
    fn test_record_round_trips_through_json() {
        let record = ScreeningRecord::new(
            "Rust engineer",
            1,
            1,
            &[match_with_keywords(2)],
            ScoringMode::KeywordOnly,
            ExplanationMode::Llm,
        );
        let json = serde_json::to_string(&record).unwrap();
        let back: ScreeningRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }
}
