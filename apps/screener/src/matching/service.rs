//! Screening service: one `match` run from job text to a persisted record.

use std::collections::HashMap;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::embedding::{embed_with_timeout, EmbeddingProvider};
use crate::errors::AppError;
use crate::matching::explanation::explain;
use crate::matching::fusion::ScoringMode;
use crate::matching::ranker::rank;
use crate::models::candidate::CandidateRecord;
use crate::models::job::JobRequirementSummary;
use crate::models::screening::{ExplanationMode, ScreeningRecord, ScreeningResponse};
use crate::state::AppState;

pub const EMPTY_JOB_REASONING: &str = "Job description is empty; nothing to match against.";

/// Ranks the current batch against `job_text` and records the session.
///
/// Empty job text yields an empty response. Embedding and LLM failures degrade the
/// result instead of failing it; a store failure leaves `record_id` unset.
pub async fn screen(
    state: &AppState,
    job_text: &str,
    top_k: usize,
) -> Result<ScreeningResponse, AppError> {
    let batch = state.batch.current().await;

    if job_text.trim().is_empty() {
        warn!("Screening requested with an empty job description");
        return Ok(ScreeningResponse {
            record_id: None,
            job_keywords: Vec::new(),
            matches: Vec::new(),
            reasoning: EMPTY_JOB_REASONING.to_string(),
            explanation_mode: ExplanationMode::Template,
            scoring_mode: ScoringMode::KeywordOnly,
            job_requirements: JobRequirementSummary::default(),
            total_candidates: batch.len(),
            skipped: Vec::new(),
        });
    }

    let mut job = state.analyzer.requirement(job_text);
    job.embedding = match embed_with_timeout(
        state.embedder.as_ref(),
        job_text,
        state.config.embedding_timeout,
    )
    .await
    {
        Ok(vector) => Some(vector),
        Err(e) => {
            warn!(error = %e, provider = state.embedder.name(), "Job embedding failed, ranking on keywords only");
            None
        }
    };

    // Candidates whose embedding failed at upload, or was made by a provider with
    // another dimension, are embedded again here.
    let vectors = match job.embedding.as_deref() {
        Some(job_vec) => {
            let stale: Vec<&CandidateRecord> = batch
                .candidates
                .iter()
                .filter(|c| c.is_rankable() && !has_dimension(c, job_vec.len()))
                .collect();
            if job_vec.len() != state.embedder.dimension() {
                debug!(
                    configured = state.embedder.dimension(),
                    returned = job_vec.len(),
                    "Embedding provider returned an unexpected dimension"
                );
            }
            embed_records(state.embedder.as_ref(), state.config.embedding_timeout, stale).await
        }
        None => HashMap::new(),
    };
    let batch = if vectors.is_empty() {
        batch
    } else {
        state.batch.attach_embeddings(vectors).await?
    };

    let outcome = rank(&job, &batch.candidates, top_k, &state.config.fusion_weights);
    info!(
        candidates = outcome.total_candidates,
        matches = outcome.matches.len(),
        skipped = outcome.skipped.len(),
        mode = ?outcome.scoring_mode,
        "Ranking complete"
    );

    let explanation = explain(
        state.llm.as_deref(),
        job_text,
        &outcome.matches,
        state.config.llm_timeout,
    )
    .await;
    let job_requirements = state.analyzer.extract_job_requirements(job_text);

    let record = ScreeningRecord::new(
        job_text,
        outcome.total_candidates,
        top_k,
        &outcome.matches,
        outcome.scoring_mode,
        explanation.mode,
    );
    let record_id = match state.screenings.save(record).await {
        Ok(id) => Some(id),
        Err(e) => {
            warn!(error = %e, "Failed to save screening results");
            None
        }
    };

    Ok(ScreeningResponse {
        record_id,
        job_keywords: job.keywords,
        matches: outcome.matches,
        reasoning: explanation.text,
        explanation_mode: explanation.mode,
        scoring_mode: outcome.scoring_mode,
        job_requirements,
        total_candidates: outcome.total_candidates,
        skipped: outcome.skipped,
    })
}

/// Embeds freshly parsed records in place. A failure leaves that record's
/// embedding empty; it is retried on the next screening.
pub async fn embed_new_candidates(
    provider: &dyn EmbeddingProvider,
    timeout: Duration,
    records: &mut [CandidateRecord],
) -> usize {
    let mut embedded = 0;
    for record in records.iter_mut().filter(|r| r.is_rankable() && r.embedding.is_none()) {
        match embed_with_timeout(provider, &record.text, timeout).await {
            Ok(vector) => {
                record.embedding = Some(vector);
                embedded += 1;
            }
            Err(e) => {
                warn!(file = %record.file_name, error = %e, "Candidate embedding failed");
            }
        }
    }
    embedded
}

fn has_dimension(record: &CandidateRecord, dimension: usize) -> bool {
    record
        .embedding
        .as_ref()
        .is_some_and(|v| v.len() == dimension)
}

async fn embed_records(
    provider: &dyn EmbeddingProvider,
    timeout: Duration,
    records: Vec<&CandidateRecord>,
) -> HashMap<String, Vec<f32>> {
    let mut vectors = HashMap::with_capacity(records.len());
    for record in records {
        match embed_with_timeout(provider, &record.text, timeout).await {
            Ok(vector) => {
                vectors.insert(record.file_name.clone(), vector);
            }
            Err(e) => {
                warn!(file = %record.file_name, error = %e, "Candidate embedding back-fill failed");
            }
        }
    }
    vectors
}
