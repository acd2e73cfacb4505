use std::collections::HashMap;
use std::path::PathBuf;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::screening::ScreeningRecord;
use crate::models::truncate_chars;
use crate::store::{JsonLogStore, StoredRecord, RECENT_ACTIVITY_DAYS};

/// Screenings kept on disk.
pub const SCREENING_CAP: usize = 50;
const TOP_CANDIDATES: usize = 10;

impl StoredRecord for ScreeningRecord {
    fn id(&self) -> Uuid {
        self.id
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// One appearance of a candidate in a past screening.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateAppearance {
    pub screening_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub job_description: String,
    pub rank: usize,
    pub score: f64,
    pub similarity: f64,
    pub keyword_overlap: f64,
    pub matched_keywords: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopCandidate {
    pub name: String,
    pub email: String,
    pub average_score: f64,
    pub times_matched: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScreeningStatistics {
    pub total_screenings: usize,
    pub total_candidates_screened: usize,
    pub average_matches_per_screening: f64,
    pub average_candidates_per_screening: f64,
    pub top_candidates: Vec<TopCandidate>,
    pub recent_activity: usize,
}

pub struct ScreeningStore {
    log: JsonLogStore<ScreeningRecord>,
}

impl ScreeningStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            log: JsonLogStore::new(path, SCREENING_CAP),
        }
    }

    pub async fn save(&self, record: ScreeningRecord) -> Result<Uuid, AppError> {
        self.log.append(record).await
    }

    pub async fn by_id(&self, id: Uuid) -> Result<Option<ScreeningRecord>, AppError> {
        self.log.find(id).await
    }

    pub async fn recent(&self, limit: usize) -> Result<Vec<ScreeningRecord>, AppError> {
        self.log.recent(limit).await
    }

    pub async fn clear(&self) -> Result<(), AppError> {
        self.log.clear().await
    }

    /// Every screening a candidate appeared in, newest first. Email match ignores case.
    pub async fn candidate_history(
        &self,
        email: &str,
        limit: usize,
    ) -> Result<Vec<CandidateAppearance>, AppError> {
        let needle = email.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(Vec::new());
        }
        let mut history: Vec<CandidateAppearance> = self
            .log
            .all()
            .await?
            .iter()
            .flat_map(|record| {
                record
                    .matches
                    .iter()
                    .filter(|m| m.candidate_email.to_lowercase() == needle)
                    .map(move |m| CandidateAppearance {
                        screening_id: record.id,
                        timestamp: record.timestamp,
                        job_description: truncate_chars(&record.job_description, 200),
                        rank: m.rank,
                        score: m.score,
                        similarity: m.similarity,
                        keyword_overlap: m.keyword_overlap,
                        matched_keywords: m.matched_keywords.clone(),
                    })
            })
            .collect();
        history.sort_by_key(|a| std::cmp::Reverse(a.timestamp));
        history.truncate(limit);
        Ok(history)
    }

    /// Screenings run against the job with this fingerprint, newest first.
    pub async fn by_fingerprint(
        &self,
        fingerprint: &str,
        limit: usize,
    ) -> Result<Vec<ScreeningRecord>, AppError> {
        let needle = fingerprint.trim().to_lowercase();
        self.log
            .recent_matching(limit, |r| r.job_fingerprint == needle)
            .await
    }

    pub async fn statistics(&self) -> Result<ScreeningStatistics, AppError> {
        let records = self.log.all().await?;
        Ok(compute_statistics(&records, Utc::now()))
    }
}

fn compute_statistics(records: &[ScreeningRecord], now: DateTime<Utc>) -> ScreeningStatistics {
    let total = records.len();
    let total_candidates: usize = records.iter().map(|r| r.total_candidates).sum();
    let total_matches: usize = records.iter().map(|r| r.actual_matches).sum();
    let per = |sum: usize| {
        if total == 0 {
            0.0
        } else {
            round_to(sum as f64 / total as f64, 1)
        }
    };

    // Keyed by lower-cased email; candidates without an email are not aggregated.
    let mut by_email: HashMap<String, (String, String, f64, usize, usize)> = HashMap::new();
    let mut order = 0usize;
    for m in records.iter().flat_map(|r| r.matches.iter()) {
        let key = m.candidate_email.trim().to_lowercase();
        if key.is_empty() {
            continue;
        }
        let entry = by_email.entry(key).or_insert_with(|| {
            order += 1;
            (m.candidate_name.clone(), m.candidate_email.clone(), 0.0, 0, order)
        });
        entry.2 += m.score;
        entry.3 += 1;
    }
    let mut top: Vec<(TopCandidate, usize)> = by_email
        .into_values()
        .map(|(name, email, total_score, times, first_seen)| {
            (
                TopCandidate {
                    name,
                    email,
                    average_score: round_to(total_score / times as f64, 4),
                    times_matched: times,
                },
                first_seen,
            )
        })
        .collect();
    top.sort_by(|(a, ai), (b, bi)| {
        b.average_score
            .total_cmp(&a.average_score)
            .then_with(|| ai.cmp(bi))
    });

    let week_ago = now - Duration::days(RECENT_ACTIVITY_DAYS);

    ScreeningStatistics {
        total_screenings: total,
        total_candidates_screened: total_candidates,
        average_matches_per_screening: per(total_matches),
        average_candidates_per_screening: per(total_candidates),
        top_candidates: top
            .into_iter()
            .take(TOP_CANDIDATES)
            .map(|(c, _)| c)
            .collect(),
        recent_activity: records.iter().filter(|r| r.timestamp > week_ago).count(),
    }
}

pub(crate) fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
