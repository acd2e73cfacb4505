//! Candidate batch: the current session's collection of parsed resumes.
//!
//! Readers take an `Arc` snapshot and never block writers for longer than the swap.
//! Writers build a fresh `CandidateBatch`, persist it, then replace the pointer.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::info;

use crate::errors::AppError;
use crate::models::candidate::CandidateRecord;
use crate::store::{read_json_or_default, write_json_atomic};

const TOP_SKILLS: usize = 10;

/// Immutable snapshot of the uploaded candidates, in upload order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CandidateBatch {
    pub candidates: Vec<CandidateRecord>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl CandidateBatch {
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn find(&self, file_name: &str) -> Option<&CandidateRecord> {
        self.candidates.iter().find(|c| c.file_name == file_name)
    }

    pub fn statistics(&self) -> BatchStatistics {
        let successful: Vec<&CandidateRecord> =
            self.candidates.iter().filter(|c| c.is_success()).collect();
        let failed = self.candidates.len() - successful.len();

        let mut skill_counts: HashMap<&str, usize> = HashMap::new();
        for skill in successful.iter().flat_map(|c| c.skills.iter()) {
            *skill_counts.entry(skill.as_str()).or_insert(0) += 1;
        }
        let mut top_skills: Vec<SkillCount> = skill_counts
            .into_iter()
            .map(|(skill, count)| SkillCount {
                skill: skill.to_string(),
                count,
            })
            .collect();
        top_skills.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.skill.cmp(&b.skill)));
        top_skills.truncate(TOP_SKILLS);

        let average_word_count = if successful.is_empty() {
            0
        } else {
            let total: usize = successful.iter().map(|c| c.word_count).sum();
            (total as f64 / successful.len() as f64).round() as usize
        };

        BatchStatistics {
            total_resumes: self.candidates.len(),
            successful_parses: successful.len(),
            failed_parses: failed,
            success_rate: if self.candidates.is_empty() {
                0.0
            } else {
                let rate = successful.len() as f64 / self.candidates.len() as f64 * 100.0;
                (rate * 100.0).round() / 100.0
            },
            top_skills,
            average_word_count,
            with_email: successful.iter().filter(|c| !c.email.is_empty()).count(),
            with_phone: successful.iter().filter(|c| !c.phone.is_empty()).count(),
            with_embedding: successful.iter().filter(|c| c.embedding.is_some()).count(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkillCount {
    pub skill: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchStatistics {
    pub total_resumes: usize,
    pub successful_parses: usize,
    pub failed_parses: usize,
    /// Percentage, two decimals.
    pub success_rate: f64,
    pub top_skills: Vec<SkillCount>,
    pub average_word_count: usize,
    pub with_email: usize,
    pub with_phone: usize,
    pub with_embedding: usize,
}

pub struct CandidateBatchStore {
    current: RwLock<Arc<CandidateBatch>>,
    snapshot_path: Option<PathBuf>,
}

impl CandidateBatchStore {
    /// A store that lives only as long as the process.
    #[cfg(test)]
    pub fn in_memory() -> Self {
        Self {
            current: RwLock::new(Arc::new(CandidateBatch::default())),
            snapshot_path: None,
        }
    }

    /// Opens the store backed by a JSON snapshot, loading it when present.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, AppError> {
        let path = path.into();
        let batch: CandidateBatch = read_json_or_default(&path).await?;
        info!(
            candidates = batch.len(),
            path = %path.display(),
            "Loaded candidate batch"
        );
        Ok(Self {
            current: RwLock::new(Arc::new(batch)),
            snapshot_path: Some(path),
        })
    }

    pub async fn current(&self) -> Arc<CandidateBatch> {
        self.current.read().await.clone()
    }

    /// Swaps in a whole new collection.
    pub async fn replace(
        &self,
        candidates: Vec<CandidateRecord>,
    ) -> Result<Arc<CandidateBatch>, AppError> {
        let mut guard = self.current.write().await;
        let next = Arc::new(CandidateBatch {
            candidates,
            updated_at: Some(Utc::now()),
        });
        self.persist(&next).await?;
        *guard = next.clone();
        Ok(next)
    }

    /// Adds records to the collection. A re-uploaded file name replaces the earlier
    /// record in place.
    pub async fn append(
        &self,
        records: Vec<CandidateRecord>,
    ) -> Result<Arc<CandidateBatch>, AppError> {
        let mut guard = self.current.write().await;
        let mut candidates = guard.candidates.clone();
        for record in records {
            match candidates.iter().position(|c| c.file_name == record.file_name) {
                Some(i) => candidates[i] = record,
                None => candidates.push(record),
            }
        }
        let next = Arc::new(CandidateBatch {
            candidates,
            updated_at: Some(Utc::now()),
        });
        self.persist(&next).await?;
        *guard = next.clone();
        Ok(next)
    }

    /// Fills in embeddings computed after upload. A record's vector is replaced only
    /// when it has none or its dimension differs from the new one. Records no longer
    /// in the batch are ignored.
    pub async fn attach_embeddings(
        &self,
        vectors: HashMap<String, Vec<f32>>,
    ) -> Result<Arc<CandidateBatch>, AppError> {
        let mut guard = self.current.write().await;
        if vectors.is_empty() {
            return Ok(guard.clone());
        }
        let mut candidates = guard.candidates.clone();
        let mut attached = 0usize;
        for candidate in candidates.iter_mut() {
            let Some(vector) = vectors.get(&candidate.file_name) else {
                continue;
            };
            let stale = candidate
                .embedding
                .as_ref()
                .map_or(true, |current| current.len() != vector.len());
            if stale {
                candidate.embedding = Some(vector.clone());
                attached += 1;
            }
        }
        if attached == 0 {
            return Ok(guard.clone());
        }
        let next = Arc::new(CandidateBatch {
            candidates,
            updated_at: Some(Utc::now()),
        });
        self.persist(&next).await?;
        *guard = next.clone();
        info!(attached, "Back-filled candidate embeddings");
        Ok(next)
    }

    /// Drops every candidate. Returns how many were removed.
    pub async fn clear(&self) -> Result<usize, AppError> {
        let mut guard = self.current.write().await;
        let removed = guard.len();
        let next = Arc::new(CandidateBatch {
            candidates: Vec::new(),
            updated_at: Some(Utc::now()),
        });
        self.persist(&next).await?;
        *guard = next;
        Ok(removed)
    }

    async fn persist(&self, batch: &CandidateBatch) -> Result<(), AppError> {
        match &self.snapshot_path {
            Some(path) => write_json_atomic(path, batch).await,
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::candidate::ParseStatus;

    fn candidate(file_name: &str, skills: &[&str]) -> CandidateRecord {
        CandidateRecord {
            file_name: file_name.to_string(),
            name: String::new(),
            email: format!("{file_name}@example.com"),
            phone: String::new(),
            skills: skills.iter().map(|s| s.to_string()).collect(),
            keywords: vec![],
            experience_years: None,
            embedding: None,
            word_count: 100,
            text_length: 600,
            text: "text".to_string(),
            status: ParseStatus::Success,
            parsed_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_snapshot_taken_before_write_is_unchanged() {
        let store = CandidateBatchStore::in_memory();
        store.append(vec![candidate("a", &[])]).await.unwrap();
        let before = store.current().await;
        store.append(vec![candidate("b", &[])]).await.unwrap();
        assert_eq!(before.len(), 1);
        assert_eq!(store.current().await.len(), 2);
    }

    #[tokio::test]
    async fn test_append_replaces_same_file_name() {
        let store = CandidateBatchStore::in_memory();
        store
            .append(vec![candidate("a", &["python"]), candidate("b", &[])])
            .await
            .unwrap();
        store.append(vec![candidate("a", &["rust"])]).await.unwrap();
        let batch = store.current().await;
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.candidates[0].file_name, "a");
        assert_eq!(batch.candidates[0].skills, vec!["rust"]);
    }

    #[tokio::test]
    async fn test_snapshot_persists_across_opens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("candidates.json");
        {
            let store = CandidateBatchStore::open(&path).await.unwrap();
            store.replace(vec![candidate("a", &[])]).await.unwrap();
        }
        let reopened = CandidateBatchStore::open(&path).await.unwrap();
        assert_eq!(reopened.current().await.len(), 1);
        assert_eq!(reopened.clear().await.unwrap(), 1);
        let again = CandidateBatchStore::open(&path).await.unwrap();
        assert!(again.current().await.is_empty());
    }

    #[tokio::test]
    async fn test_attach_embeddings_fills_missing_and_stale() {
        let store = CandidateBatchStore::in_memory();
        let mut current = candidate("b", &[]);
        current.embedding = Some(vec![9.0, 9.0]);
        let mut stale = candidate("c", &[]);
        stale.embedding = Some(vec![1.0, 0.0, 0.0]);
        store
            .append(vec![candidate("a", &[]), current, stale])
            .await
            .unwrap();

        let vectors = HashMap::from([
            ("a".to_string(), vec![1.0, 0.0]),
            ("b".to_string(), vec![0.0, 1.0]),
            ("c".to_string(), vec![0.0, 1.0]),
            ("gone".to_string(), vec![0.5]),
        ]);
        let batch = store.attach_embeddings(vectors).await.unwrap();
        assert_eq!(batch.candidates[0].embedding, Some(vec![1.0, 0.0]));
        assert_eq!(batch.candidates[1].embedding, Some(vec![9.0, 9.0]));
        assert_eq!(batch.candidates[2].embedding, Some(vec![0.0, 1.0]));
        assert_eq!(batch.len(), 3);
    }

    #[test]
    fn test_statistics() {
        let mut failed = CandidateRecord::failed("bad.pdf", "broken");
        failed.skills = vec!["ignored".to_string()];
        let batch = CandidateBatch {
            candidates: vec![
                candidate("a", &["python", "aws"]),
                candidate("b", &["python"]),
                failed,
            ],
            updated_at: None,
        };
        let stats = batch.statistics();
        assert_eq!(stats.total_resumes, 3);
        assert_eq!(stats.successful_parses, 2);
        assert_eq!(stats.failed_parses, 1);
        assert_eq!(stats.success_rate, 66.67);
        assert_eq!(stats.top_skills[0], SkillCount { skill: "python".to_string(), count: 2 });
        assert_eq!(stats.top_skills.len(), 2);
        assert_eq!(stats.average_word_count, 100);
        assert_eq!(stats.with_email, 2);
    }
}
