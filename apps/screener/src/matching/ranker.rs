//! Ranker: scores every candidate against a job and returns the top K.
//!
//! Pure and synchronous: embeddings must already be attached to the job and the
//! candidates. Ordering is total: fused score descending, then upload order.

use std::collections::HashSet;

use serde::Serialize;

use crate::matching::fusion::{fuse, keyword_overlap_ratio, FusionWeights, ScoringMode};
use crate::matching::job::JobRequirement;
use crate::matching::similarity::cosine_similarity;
use crate::models::candidate::CandidateRecord;
use crate::models::screening::{MatchResult, SkippedCandidate};
use crate::models::truncate_chars;

const PREVIEW_CHARS: usize = 200;
const RESUME_KEYWORDS_SHOWN: usize = 10;

// ────────────────────────────────────────────────────────────────────────────
// Output
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct RankOutcome {
    pub matches: Vec<MatchResult>,
    pub scoring_mode: ScoringMode,
    /// Candidates in the batch, rankable or not.
    pub total_candidates: usize,
    pub skipped: Vec<SkippedCandidate>,
}

struct Scored<'a> {
    index: usize,
    candidate: &'a CandidateRecord,
    similarity: f64,
    similarity_available: bool,
    keyword_overlap: f64,
    score: f64,
    matched_keywords: Vec<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Ranking
// ────────────────────────────────────────────────────────────────────────────

/// Ranks `candidates` for `job`. `top_k` is clamped to `[1, eligible]`.
/// An empty or fully skipped batch yields no matches rather than an error.
pub fn rank(
    job: &JobRequirement,
    candidates: &[CandidateRecord],
    top_k: usize,
    weights: &FusionWeights,
) -> RankOutcome {
    let scoring_mode = ScoringMode::select(job.embedding.is_some(), !job.keywords.is_empty());
    let effective = weights.for_mode(scoring_mode);

    let mut skipped = Vec::new();
    let mut scored: Vec<Scored<'_>> = Vec::with_capacity(candidates.len());

    for (index, candidate) in candidates.iter().enumerate() {
        if !candidate.is_rankable() {
            skipped.push(SkippedCandidate {
                file_name: candidate.file_name.clone(),
                reason: candidate
                    .error_message()
                    .unwrap_or("resume has no text")
                    .to_string(),
            });
            continue;
        }
        scored.push(score_candidate(index, candidate, job, &effective));
    }

    scored.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.index.cmp(&b.index))
    });

    if !scored.is_empty() {
        scored.truncate(top_k.clamp(1, scored.len()));
    }

    let matches = scored
        .into_iter()
        .enumerate()
        .map(|(i, s)| to_match_result(i + 1, s))
        .collect();

    RankOutcome {
        matches,
        scoring_mode,
        total_candidates: candidates.len(),
        skipped,
    }
}

fn score_candidate<'a>(
    index: usize,
    candidate: &'a CandidateRecord,
    job: &JobRequirement,
    weights: &FusionWeights,
) -> Scored<'a> {
    let resume_keywords: HashSet<&str> = candidate.keywords.iter().map(String::as_str).collect();
    let matched_keywords: Vec<String> = job
        .keywords
        .iter()
        .filter(|k| resume_keywords.contains(k.as_str()))
        .cloned()
        .collect();
    let keyword_overlap = keyword_overlap_ratio(matched_keywords.len(), job.keywords.len());

    let (similarity, similarity_available) = match (&job.embedding, &candidate.embedding) {
        // A stored vector from another provider or dimension is not comparable.
        (Some(job_vec), Some(candidate_vec)) if job_vec.len() == candidate_vec.len() => {
            (cosine_similarity(job_vec, candidate_vec), true)
        }
        _ => (0.0, false),
    };

    Scored {
        index,
        candidate,
        similarity,
        similarity_available,
        keyword_overlap,
        score: fuse(similarity, keyword_overlap, weights),
        matched_keywords,
    }
}

fn to_match_result(rank: usize, s: Scored<'_>) -> MatchResult {
    let c = s.candidate;
    MatchResult {
        rank,
        file_name: c.file_name.clone(),
        name: c.name.clone(),
        email: c.email.clone(),
        phone: c.phone.clone(),
        skills: c.skills.clone(),
        experience_years: c.experience_years,
        similarity: s.similarity,
        keyword_overlap: s.keyword_overlap,
        score: s.score,
        matched_keywords: s.matched_keywords,
        resume_keywords: c.keywords.iter().take(RESUME_KEYWORDS_SHOWN).cloned().collect(),
        preview: truncate_chars(c.text.trim(), PREVIEW_CHARS),
        similarity_available: s.similarity_available,
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::models::candidate::ParseStatus;

    fn candidate(file_name: &str, keywords: &[&str], embedding: Option<Vec<f32>>) -> CandidateRecord {
        CandidateRecord {
            file_name: file_name.to_string(),
            name: file_name.to_uppercase(),
            email: format!("{file_name}@example.com"),
            phone: String::new(),
            skills: vec![],
            keywords: keywords.iter().map(|s| s.to_string()).collect(),
            experience_years: None,
            embedding,
            word_count: 10,
            text_length: 40,
            text: format!("resume text for {file_name}"),
            status: ParseStatus::Success,
            parsed_at: Utc::now(),
        }
    }

    fn job(keywords: &[&str], embedding: Option<Vec<f32>>) -> JobRequirement {
        JobRequirement {
            keywords: keywords.iter().map(|s| s.to_string()).collect(),
            embedding,
        }
    }

    fn order(outcome: &RankOutcome) -> Vec<&str> {
        outcome.matches.iter().map(|m| m.file_name.as_str()).collect()
    }

    #[test]
    fn test_keyword_overlap_orders_equal_similarity() {
        // "Senior Software Engineer requiring Python, React, AWS, 5+ years"
        let same = Some(vec![1.0, 0.0]);
        let j = job(&["senior", "python", "react", "aws"], same.clone());
        let candidates = vec![
            candidate("one", &["python", "aws"], same.clone()),
            candidate("two", &["python", "react", "aws", "docker"], same.clone()),
            candidate("three", &[], same),
        ];
        let outcome = rank(&j, &candidates, 3, &FusionWeights::default());
        assert_eq!(order(&outcome), vec!["two", "one", "three"]);
        assert_eq!(outcome.scoring_mode, ScoringMode::Hybrid);
        assert!((outcome.matches[0].keyword_overlap - 0.75).abs() < 1e-12);
        assert_eq!(outcome.matches[0].matched_keywords, vec!["python", "react", "aws"]);
        assert_eq!(outcome.matches[0].rank, 1);
        assert_eq!(outcome.matches[2].rank, 3);
    }

    #[test]
    fn test_returns_exactly_top_k_sorted() {
        let j = job(&["python"], Some(vec![1.0, 0.0]));
        let candidates: Vec<CandidateRecord> = (0..6)
            .map(|i| {
                let angle = i as f32 * 0.2;
                candidate(&format!("c{i}"), &[], Some(vec![angle.cos(), angle.sin()]))
            })
            .collect();
        let outcome = rank(&j, &candidates, 4, &FusionWeights::default());
        assert_eq!(outcome.matches.len(), 4);
        assert!(outcome
            .matches
            .windows(2)
            .all(|w| w[0].score >= w[1].score));
        assert_eq!(order(&outcome), vec!["c0", "c1", "c2", "c3"]);
    }

    #[test]
    fn test_ties_keep_upload_order() {
        let v = Some(vec![0.5, 0.5]);
        let j = job(&["python"], v.clone());
        let candidates = vec![
            candidate("b", &["python"], v.clone()),
            candidate("a", &["python"], v.clone()),
            candidate("c", &["python"], v),
        ];
        let outcome = rank(&j, &candidates, 3, &FusionWeights::default());
        assert_eq!(order(&outcome), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_empty_batch_is_empty_result() {
        let outcome = rank(&job(&["python"], None), &[], 5, &FusionWeights::default());
        assert!(outcome.matches.is_empty());
        assert_eq!(outcome.total_candidates, 0);
    }

    #[test]
    fn test_top_k_is_clamped() {
        let j = job(&["python"], None);
        let candidates = vec![candidate("a", &["python"], None), candidate("b", &[], None)];
        assert_eq!(rank(&j, &candidates, 0, &FusionWeights::default()).matches.len(), 1);
        assert_eq!(rank(&j, &candidates, 50, &FusionWeights::default()).matches.len(), 2);
    }

    #[test]
    fn test_zero_job_keywords_orders_by_similarity_only() {
        let j = job(&[], Some(vec![1.0, 0.0]));
        let candidates = vec![
            candidate("far", &["python"], Some(vec![0.0, 1.0])),
            candidate("near", &[], Some(vec![1.0, 0.1])),
        ];
        let outcome = rank(&j, &candidates, 2, &FusionWeights::default());
        assert_eq!(outcome.scoring_mode, ScoringMode::SimilarityOnly);
        assert_eq!(order(&outcome), vec!["near", "far"]);
        assert_eq!(outcome.matches[1].keyword_overlap, 0.0);
        assert!((outcome.matches[0].score - outcome.matches[0].similarity).abs() < 1e-12);
    }

    #[test]
    fn test_missing_job_embedding_falls_back_to_keywords() {
        let j = job(&["python", "aws"], None);
        let candidates = vec![
            candidate("half", &["python"], Some(vec![1.0])),
            candidate("full", &["python", "aws"], Some(vec![1.0])),
        ];
        let outcome = rank(&j, &candidates, 2, &FusionWeights::default());
        assert_eq!(outcome.scoring_mode, ScoringMode::KeywordOnly);
        assert_eq!(order(&outcome), vec!["full", "half"]);
        assert!((outcome.matches[0].score - 1.0).abs() < 1e-12);
        assert!(!outcome.matches[0].similarity_available);
    }

    #[test]
    fn test_embedding_of_another_dimension_is_unavailable() {
        let candidates = vec![candidate("stale.txt", &["python"], Some(vec![1.0, 0.0, 0.0]))];
        let outcome = rank(
            &job(&["python"], Some(vec![1.0, 0.0])),
            &candidates,
            1,
            &FusionWeights::default(),
        );
        let m = &outcome.matches[0];
        assert!(!m.similarity_available);
        assert_eq!(m.similarity, 0.0);
    }

    #[test]
    fn test_candidate_without_embedding_scores_zero_similarity() {
        let j = job(&["python"], Some(vec![1.0, 0.0]));
        let candidates = vec![
            candidate("no_vec", &["python"], None),
            candidate("vec", &["python"], Some(vec![1.0, 0.0])),
        ];
        let outcome = rank(&j, &candidates, 2, &FusionWeights::default());
        assert_eq!(order(&outcome), vec!["vec", "no_vec"]);
        let no_vec = &outcome.matches[1];
        assert!(!no_vec.similarity_available);
        assert_eq!(no_vec.similarity, 0.0);
        assert!((no_vec.score - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_error_and_empty_candidates_are_skipped() {
        let j = job(&["python"], None);
        let mut blank = candidate("blank", &["python"], None);
        blank.text = "   ".to_string();
        let candidates = vec![
            CandidateRecord::failed("bad.pdf", "PDF extraction error"),
            blank,
            candidate("ok", &["python"], None),
        ];
        let outcome = rank(&j, &candidates, 5, &FusionWeights::default());
        assert_eq!(order(&outcome), vec!["ok"]);
        assert_eq!(outcome.total_candidates, 3);
        assert_eq!(outcome.skipped.len(), 2);
        assert_eq!(outcome.skipped[0].reason, "PDF extraction error");
        assert_eq!(outcome.skipped[1].reason, "resume has no text");
    }

    #[test]
    fn test_preview_is_truncated() {
        let j = job(&["python"], None);
        let mut long = candidate("long", &["python"], None);
        long.text = "a".repeat(450);
        let outcome = rank(&j, &[long], 1, &FusionWeights::default());
        assert_eq!(outcome.matches[0].preview.len(), 203);
    }
}
