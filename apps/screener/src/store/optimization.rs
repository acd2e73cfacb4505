use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::optimization::OptimizationRecord;
use crate::store::screening::round_to;
use crate::store::{JsonLogStore, StoredRecord, RECENT_ACTIVITY_DAYS};

/// Optimizations kept on disk.
pub const OPTIMIZATION_CAP: usize = 100;
/// Missing keywords per record that count towards common issues.
const ISSUES_PER_RECORD: usize = 5;
const COMMON_ISSUES: usize = 10;

impl StoredRecord for OptimizationRecord {
    fn id(&self) -> Uuid {
        self.id
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IssueCount {
    pub issue: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptimizationStatistics {
    pub total_optimizations: usize,
    pub average_ats_score: f64,
    pub common_issues: Vec<IssueCount>,
    pub recent_activity: usize,
    pub total_users: usize,
}

pub struct OptimizationStore {
    log: JsonLogStore<OptimizationRecord>,
}

impl OptimizationStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            log: JsonLogStore::new(path, OPTIMIZATION_CAP),
        }
    }

    pub async fn save(&self, record: OptimizationRecord) -> Result<Uuid, AppError> {
        self.log.append(record).await
    }

    pub async fn by_id(&self, id: Uuid) -> Result<Option<OptimizationRecord>, AppError> {
        self.log.find(id).await
    }

    pub async fn recent(&self, limit: usize) -> Result<Vec<OptimizationRecord>, AppError> {
        self.log.recent(limit).await
    }

    pub async fn clear(&self) -> Result<(), AppError> {
        self.log.clear().await
    }

    /// Optimizations run for one resume owner, newest first.
    pub async fn for_email(
        &self,
        email: &str,
        limit: usize,
    ) -> Result<Vec<OptimizationRecord>, AppError> {
        let needle = email.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(Vec::new());
        }
        let mut records: Vec<OptimizationRecord> = self
            .log
            .all()
            .await?
            .into_iter()
            .filter(|r| r.resume_info.email.to_lowercase() == needle)
            .collect();
        records.sort_by_key(|r| std::cmp::Reverse(r.timestamp));
        records.truncate(limit);
        Ok(records)
    }

    /// Optimizations run against the job with this fingerprint, newest first.
    pub async fn by_fingerprint(
        &self,
        fingerprint: &str,
        limit: usize,
    ) -> Result<Vec<OptimizationRecord>, AppError> {
        let needle = fingerprint.trim().to_lowercase();
        self.log
            .recent_matching(limit, |r| r.job_fingerprint == needle)
            .await
    }

    pub async fn statistics(&self) -> Result<OptimizationStatistics, AppError> {
        let records = self.log.all().await?;
        Ok(compute_statistics(&records, Utc::now()))
    }
}

fn compute_statistics(records: &[OptimizationRecord], now: DateTime<Utc>) -> OptimizationStatistics {
    let average_ats_score = if records.is_empty() {
        0.0
    } else {
        let sum: f64 = records.iter().map(|r| r.report.ats_score).sum();
        round_to(sum / records.len() as f64, 1)
    };

    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    for keyword in records
        .iter()
        .flat_map(|r| r.report.missing_keywords.iter().take(ISSUES_PER_RECORD))
    {
        let next = counts.len();
        counts.entry(keyword.as_str()).or_insert((0, next)).0 += 1;
    }
    let mut issues: Vec<(&str, usize, usize)> = counts
        .into_iter()
        .map(|(k, (count, first))| (k, count, first))
        .collect();
    issues.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.2.cmp(&b.2)));

    let users: HashSet<String> = records
        .iter()
        .map(|r| r.resume_info.email.trim().to_lowercase())
        .filter(|e| !e.is_empty())
        .collect();

    let week_ago = now - Duration::days(RECENT_ACTIVITY_DAYS);

    OptimizationStatistics {
        total_optimizations: records.len(),
        average_ats_score,
        common_issues: issues
            .into_iter()
            .take(COMMON_ISSUES)
            .map(|(issue, count, _)| IssueCount {
                issue: issue.to_string(),
                count,
            })
            .collect(),
        recent_activity: records.iter().filter(|r| r.timestamp > week_ago).count(),
        total_users: users.len(),
    }
}
