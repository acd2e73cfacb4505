//! Result Store: bounded, append-only JSON logs of screening and optimization sessions.
//!
//! Each log is one JSON array on disk. Writers are serialized by an async mutex and
//! every write lands through a temp file + rename, so readers never see a torn file.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use crate::errors::AppError;

pub mod optimization;
pub mod screening;

pub use optimization::OptimizationStore;
pub use screening::ScreeningStore;

/// Window used by the "recent activity" statistics.
pub const RECENT_ACTIVITY_DAYS: i64 = 7;

/// A record that can live in a `JsonLogStore`.
pub trait StoredRecord: Serialize + DeserializeOwned + Clone + Send + Sync {
    fn id(&self) -> Uuid;
    fn timestamp(&self) -> DateTime<Utc>;
}

pub struct JsonLogStore<T> {
    path: PathBuf,
    cap: usize,
    write_lock: Mutex<()>,
    _marker: std::marker::PhantomData<fn() -> T>,
}

impl<T: StoredRecord> JsonLogStore<T> {
    pub fn new(path: impl Into<PathBuf>, cap: usize) -> Self {
        Self {
            path: path.into(),
            cap: cap.max(1),
            write_lock: Mutex::new(()),
            _marker: std::marker::PhantomData,
        }
    }

    /// Appends a record and drops the oldest ones beyond the cap.
    pub async fn append(&self, record: T) -> Result<Uuid, AppError> {
        let _guard = self.write_lock.lock().await;
        let id = record.id();
        let mut records = self.load().await?;
        records.push(record);
        if records.len() > self.cap {
            let excess = records.len() - self.cap;
            records.drain(..excess);
        }
        write_json_atomic(&self.path, &records).await?;
        debug!(%id, path = %self.path.display(), kept = records.len(), "Appended record");
        Ok(id)
    }

    /// Every record in insertion order. A missing file reads as empty.
    pub async fn all(&self) -> Result<Vec<T>, AppError> {
        self.load().await
    }

    pub async fn find(&self, id: Uuid) -> Result<Option<T>, AppError> {
        Ok(self.load().await?.into_iter().find(|r| r.id() == id))
    }

    /// Newest first.
    pub async fn recent(&self, limit: usize) -> Result<Vec<T>, AppError> {
        self.recent_matching(limit, |_| true).await
    }

    /// Records accepted by `keep`, newest first.
    pub async fn recent_matching<F>(&self, limit: usize, keep: F) -> Result<Vec<T>, AppError>
    where
        F: Fn(&T) -> bool,
    {
        let mut records: Vec<T> = self.load().await?.into_iter().filter(|r| keep(r)).collect();
        records.sort_by_key(|r| std::cmp::Reverse(r.timestamp()));
        records.truncate(limit);
        Ok(records)
    }

    pub async fn clear(&self) -> Result<(), AppError> {
        let _guard = self.write_lock.lock().await;
        write_json_atomic(&self.path, &Vec::<T>::new()).await
    }

    async fn load(&self) -> Result<Vec<T>, AppError> {
        read_json_or_default(&self.path).await
    }
}

/// Reads a JSON file, returning `T::default()` when it does not exist yet.
pub async fn read_json_or_default<T>(path: &Path) -> Result<T, AppError>
where
    T: DeserializeOwned + Default,
{
    match tokio::fs::read(path).await {
        Ok(bytes) if bytes.iter().all(|b| b.is_ascii_whitespace()) => Ok(T::default()),
        Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(T::default()),
        Err(e) => Err(AppError::Io(e)),
    }
}

/// Serializes `value` to a sibling temp file, then renames it over `path`.
pub async fn write_json_atomic<T>(path: &Path, value: &T) -> Result<(), AppError>
where
    T: Serialize + ?Sized,
{
    let json = serde_json::to_vec_pretty(value)?;
    let target = path.to_path_buf();
    tokio::task::spawn_blocking(move || -> Result<(), AppError> {
        let dir = match target.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir)?;
        let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
        std::io::Write::write_all(&mut tmp, &json)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&target)
            .map_err(|e| AppError::Store(format!("Failed to replace {}: {}", target.display(), e)))?;
        Ok(())
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!("Store write task failed: {e}")))?
}
