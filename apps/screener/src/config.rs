use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::matching::fusion::FusionWeights;

const DEFAULT_LLM_BASE_URL: &str = "https://api.groq.com/openai/v1";
const DEFAULT_LLM_MODEL: &str = "mixtral-8x7b-32768";
const DEFAULT_EMBEDDING_MODEL: &str = "all-MiniLM-L6-v2";

/// Application configuration loaded from environment variables.
/// Built once at start-up and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct Config {
    /// Present only when LLM-backed explanations and optimization are enabled.
    pub llm_api_key: Option<String>,
    pub llm_base_url: String,
    pub llm_model: String,
    pub llm_timeout: Duration,
    /// When unset the deterministic hash embedder is used.
    pub embedding_base_url: Option<String>,
    pub embedding_api_key: Option<String>,
    pub embedding_model: String,
    pub embedding_dimension: usize,
    pub embedding_timeout: Duration,
    pub data_dir: PathBuf,
    pub fusion_weights: FusionWeights,
    pub keyword_limit: usize,
    pub max_top_k: usize,
    pub vocabulary_path: Option<PathBuf>,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let similarity_weight: f64 = parse_env("SCREENER_SIMILARITY_WEIGHT", 0.6)?;
        let keyword_weight: f64 = parse_env("SCREENER_KEYWORD_WEIGHT", 0.4)?;
        let fusion_weights = FusionWeights::new(similarity_weight, keyword_weight)
            .context("SCREENER_SIMILARITY_WEIGHT / SCREENER_KEYWORD_WEIGHT are invalid")?;

        Ok(Config {
            llm_api_key: optional_env("LLM_API_KEY"),
            llm_base_url: optional_env("LLM_BASE_URL")
                .unwrap_or_else(|| DEFAULT_LLM_BASE_URL.to_string()),
            llm_model: optional_env("LLM_MODEL").unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string()),
            llm_timeout: Duration::from_secs(parse_env("LLM_TIMEOUT_SECS", 30)?),
            embedding_base_url: optional_env("EMBEDDING_BASE_URL"),
            embedding_api_key: optional_env("EMBEDDING_API_KEY"),
            embedding_model: optional_env("EMBEDDING_MODEL")
                .unwrap_or_else(|| DEFAULT_EMBEDDING_MODEL.to_string()),
            embedding_dimension: parse_env("EMBEDDING_DIMENSION", 384)?,
            embedding_timeout: Duration::from_secs(parse_env("EMBEDDING_TIMEOUT_SECS", 10)?),
            data_dir: optional_env("SCREENER_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./data")),
            fusion_weights,
            keyword_limit: parse_positive_env("SCREENER_KEYWORD_LIMIT", 30)?,
            max_top_k: parse_positive_env("SCREENER_MAX_TOP_K", 10)?,
            vocabulary_path: optional_env("SCREENER_VOCABULARY_PATH").map(PathBuf::from),
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    pub fn candidates_path(&self) -> PathBuf {
        self.data_dir.join("candidates.json")
    }

    pub fn screening_results_path(&self) -> PathBuf {
        self.data_dir.join("screening_results.json")
    }

    pub fn optimization_results_path(&self) -> PathBuf {
        self.data_dir.join("ats_results.json")
    }

    /// Defaults with every store under `data_dir`. No environment is read.
    #[cfg(test)]
    pub fn for_tests(data_dir: impl Into<PathBuf>) -> Self {
        Config {
            llm_api_key: None,
            llm_base_url: DEFAULT_LLM_BASE_URL.to_string(),
            llm_model: DEFAULT_LLM_MODEL.to_string(),
            llm_timeout: Duration::from_secs(5),
            embedding_base_url: None,
            embedding_api_key: None,
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            embedding_dimension: 64,
            embedding_timeout: Duration::from_secs(5),
            data_dir: data_dir.into(),
            fusion_weights: FusionWeights::default(),
            keyword_limit: 30,
            max_top_k: 10,
            vocabulary_path: None,
            rust_log: "info".to_string(),
        }
    }
}

/// Reads a variable, treating an empty value the same as a missing one.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
        None => Ok(default),
    }
}

fn parse_positive_env(key: &str, default: usize) -> Result<usize> {
    let value = parse_env(key, default)?;
    if value == 0 {
        anyhow::bail!("Environment variable '{key}' must be at least 1");
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_env_uses_default_when_missing() {
        let value: usize = parse_env("SCREENER_TEST_SURELY_UNSET_VARIABLE", 42).unwrap();
        assert_eq!(value, 42);
    }

    #[test]
    fn test_parse_positive_env_rejects_zero() {
        std::env::set_var("SCREENER_TEST_ZERO_LIMIT", "0");
        let result = parse_positive_env("SCREENER_TEST_ZERO_LIMIT", 10);
        std::env::remove_var("SCREENER_TEST_ZERO_LIMIT");
        let message = result.unwrap_err().to_string();
        assert!(message.contains("SCREENER_TEST_ZERO_LIMIT"));

        std::env::set_var("SCREENER_TEST_ONE_LIMIT", "1");
        let result = parse_positive_env("SCREENER_TEST_ONE_LIMIT", 10);
        std::env::remove_var("SCREENER_TEST_ONE_LIMIT");
        assert_eq!(result.unwrap(), 1);
    }

    #[test]
    fn test_parse_env_rejects_garbage() {
        std::env::set_var("SCREENER_TEST_GARBAGE_NUMBER", "twelve");
        let result: Result<usize> = parse_env("SCREENER_TEST_GARBAGE_NUMBER", 1);
        std::env::remove_var("SCREENER_TEST_GARBAGE_NUMBER");
        let err = result.unwrap_err().to_string();
        assert!(err.contains("SCREENER_TEST_GARBAGE_NUMBER"), "got: {err}");
    }

    #[test]
    fn test_optional_env_treats_blank_as_missing() {
        std::env::set_var("SCREENER_TEST_BLANK_VALUE", "   ");
        let value = optional_env("SCREENER_TEST_BLANK_VALUE");
        std::env::remove_var("SCREENER_TEST_BLANK_VALUE");
        assert!(value.is_none());
    }
}
