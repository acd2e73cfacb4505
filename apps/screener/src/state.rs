use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use crate::candidates::{CandidateBatchStore, ResumeParser};
use crate::config::Config;
use crate::embedding::{build_provider, EmbeddingProvider};
use crate::keywords::{KeywordExtractor, Vocabulary};
use crate::llm_client::{LanguageModel, LlmClient};
use crate::matching::job::JobAnalyzer;
use crate::optimization::ats::AtsOptimizer;
use crate::store::{OptimizationStore, ScreeningStore};

/// Shared application state handed to every command handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub parser: Arc<ResumeParser>,
    pub analyzer: Arc<JobAnalyzer>,
    pub optimizer: Arc<AtsOptimizer>,
    pub embedder: Arc<dyn EmbeddingProvider>,
    /// `None` when no LLM key is configured; explanation and optimization use their
    /// deterministic paths.
    pub llm: Option<Arc<dyn LanguageModel>>,
    pub batch: Arc<CandidateBatchStore>,
    pub screenings: Arc<ScreeningStore>,
    pub optimizations: Arc<OptimizationStore>,
}

impl AppState {
    /// Builds the state from configuration, picking real providers.
    pub async fn initialize(config: Config) -> Result<Self> {
        let embedder = build_provider(&config).context("Failed to build embedding provider")?;

        let llm: Option<Arc<dyn LanguageModel>> = match &config.llm_api_key {
            Some(key) => {
                let client = LlmClient::new(&config.llm_base_url, key.clone(), &config.llm_model)
                    .context("Failed to build LLM client")?;
                info!("LLM client initialized (model: {})", client.model());
                Some(Arc::new(client))
            }
            None => {
                info!("LLM_API_KEY not set, using template explanations and basic ATS analysis");
                None
            }
        };

        Self::with_providers(config, embedder, llm).await
    }

    /// Builds the state around the given providers. Stores live under `config.data_dir`.
    pub async fn with_providers(
        config: Config,
        embedder: Arc<dyn EmbeddingProvider>,
        llm: Option<Arc<dyn LanguageModel>>,
    ) -> Result<Self> {
        let vocabulary = Vocabulary::load(config.vocabulary_path.as_deref())?;
        info!(terms = vocabulary.len(), "Vocabulary loaded");

        let extractor = Arc::new(KeywordExtractor::new(
            Arc::new(vocabulary),
            config.keyword_limit,
        )?);
        let parser = Arc::new(ResumeParser::new(extractor.clone())?);
        let analyzer = Arc::new(JobAnalyzer::new(extractor.clone())?);
        let optimizer = Arc::new(AtsOptimizer::new(extractor)?);

        tokio::fs::create_dir_all(&config.data_dir)
            .await
            .with_context(|| format!("Failed to create {}", config.data_dir.display()))?;
        let batch = CandidateBatchStore::open(config.candidates_path())
            .await
            .context("Failed to open candidate batch")?;

        Ok(Self {
            screenings: Arc::new(ScreeningStore::new(config.screening_results_path())),
            optimizations: Arc::new(OptimizationStore::new(config.optimization_results_path())),
            batch: Arc::new(batch),
            parser,
            analyzer,
            optimizer,
            embedder,
            llm,
            config,
        })
    }
}
