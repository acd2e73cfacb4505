//! Embedding Provider: maps text to a fixed-length dense vector.
//!
//! Two backends share the `EmbeddingProvider` trait:
//! - `HttpEmbedder`: an OpenAI-compatible `/embeddings` endpoint.
//! - `HashEmbedder`: deterministic feature hashing, no network. Used when no endpoint is configured.
//!
//! `AppState` holds an `Arc<dyn EmbeddingProvider>` chosen at start-up from config.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

use crate::config::Config;

pub mod hash;
pub mod http;

pub use hash::HashEmbedder;
pub use http::HttpEmbedder;

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Embedding API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Embedding response was malformed: {0}")]
    Malformed(String),

    #[error("Embedding call timed out after {0:?}")]
    Timeout(Duration),

    #[error("Embedding endpoint still failing after {retries} retries")]
    RetriesExhausted { retries: u32 },
}

#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Short backend name for logs and records.
    fn name(&self) -> &str;

    fn dimension(&self) -> usize;

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;
}

/// Runs `provider.embed` under an explicit deadline.
pub async fn embed_with_timeout(
    provider: &dyn EmbeddingProvider,
    text: &str,
    timeout: Duration,
) -> Result<Vec<f32>, EmbeddingError> {
    match tokio::time::timeout(timeout, provider.embed(text)).await {
        Ok(result) => result,
        Err(_) => Err(EmbeddingError::Timeout(timeout)),
    }
}

/// Picks the HTTP backend when `EMBEDDING_BASE_URL` is set, the hash backend otherwise.
pub fn build_provider(config: &Config) -> Result<Arc<dyn EmbeddingProvider>, EmbeddingError> {
    match &config.embedding_base_url {
        Some(base_url) => {
            let embedder = HttpEmbedder::new(
                base_url,
                config.embedding_api_key.clone(),
                &config.embedding_model,
                config.embedding_dimension,
            )?;
            info!(
                "Embedding provider: http ({} at {})",
                config.embedding_model, base_url
            );
            Ok(Arc::new(embedder))
        }
        None => {
            info!(
                "Embedding provider: hash (dimension {})",
                config.embedding_dimension
            );
            Ok(Arc::new(HashEmbedder::new(config.embedding_dimension)))
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Stub providers shared by tests in other modules.

    use super::*;

    /// Always fails, for degradation paths.
    pub struct FailingEmbedder;

    #[async_trait]
    impl EmbeddingProvider for FailingEmbedder {
        fn name(&self) -> &str {
            "failing"
        }

        fn dimension(&self) -> usize {
            4
        }

        async fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
            Err(EmbeddingError::Malformed("stub failure".to_string()))
        }
    }

    /// Returns the same vector for every input, so similarity ties everywhere.
    pub struct ConstantEmbedder(pub Vec<f32>);

    #[async_trait]
    impl EmbeddingProvider for ConstantEmbedder {
        fn name(&self) -> &str {
            "constant"
        }

        fn dimension(&self) -> usize {
            self.0.len()
        }

        async fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
            Ok(self.0.clone())
        }
    }

    /// Never answers.
    pub struct StalledEmbedder;

    #[async_trait]
    impl EmbeddingProvider for StalledEmbedder {
        fn name(&self) -> &str {
            "stalled"
        }

        fn dimension(&self) -> usize {
            4
        }

        async fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
            std::future::pending::<()>().await;
            unreachable!()
        }
    }
}
