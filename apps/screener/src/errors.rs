use serde_json::{json, Value};
use thiserror::Error;

use crate::embedding::EmbeddingError;
use crate::llm_client::LlmError;

/// Application-level error type.
/// Command handlers return `Result<T, AppError>`; `main` turns it into a JSON error body.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Stable machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Io(_) => "IO_ERROR",
            AppError::Serialization(_) => "SERIALIZATION_ERROR",
            AppError::Llm(_) => "LLM_ERROR",
            AppError::Embedding(_) => "EMBEDDING_ERROR",
            AppError::Store(_) => "STORE_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Process exit code: 2 for caller mistakes, 1 for everything else.
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::NotFound(_) | AppError::Validation(_) => 2,
            _ => 1,
        }
    }

    /// Renders the error the way it is printed on stdout.
    /// Collaborator and internal failures are logged in full but summarized for the caller.
    pub fn to_json(&self) -> Value {
        let message = match self {
            AppError::NotFound(msg) | AppError::Validation(msg) => msg.clone(),
            AppError::Io(e) => {
                tracing::error!("I/O error: {e}");
                format!("An I/O error occurred: {e}")
            }
            AppError::Serialization(e) => {
                tracing::error!("Serialization error: {e}");
                "A data file could not be read or written".to_string()
            }
            AppError::Llm(e) => {
                tracing::error!("LLM error: {e}");
                "An AI processing error occurred".to_string()
            }
            AppError::Embedding(e) => {
                tracing::error!("Embedding error: {e}");
                "An embedding error occurred".to_string()
            }
            AppError::Store(msg) => {
                tracing::error!("Store error: {msg}");
                "A storage error occurred".to_string()
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                "An internal error occurred".to_string()
            }
        };

        json!({
            "error": {
                "code": self.code(),
                "message": message
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_keeps_message() {
        let err = AppError::Validation("top_k must be between 1 and 10".to_string());
        let body = err.to_json();
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(body["error"]["message"], "top_k must be between 1 and 10");
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_internal_error_is_summarized() {
        let err = AppError::Internal(anyhow::anyhow!("secret detail"));
        let body = err.to_json();
        assert_eq!(body["error"]["code"], "INTERNAL_ERROR");
        assert!(!body["error"]["message"]
            .as_str()
            .unwrap_or_default()
            .contains("secret"));
        assert_eq!(err.exit_code(), 1);
    }
}
