use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum WeightError {
    #[error("fusion weights must be finite and non-negative (similarity={similarity}, keyword={keyword})")]
    Negative { similarity: f64, keyword: f64 },

    #[error("fusion weights must not both be zero")]
    AllZero,
}

/// Weights for combining the dense and sparse signals. Always normalized to sum to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FusionWeights {
    pub similarity: f64,
    pub keyword: f64,
}

impl Default for FusionWeights {
    fn default() -> Self {
        Self {
            similarity: 0.6,
            keyword: 0.4,
        }
    }
}

impl FusionWeights {
    pub fn new(similarity: f64, keyword: f64) -> Result<Self, WeightError> {
        let valid = |w: f64| w.is_finite() && w >= 0.0;
        if !valid(similarity) || !valid(keyword) {
            return Err(WeightError::Negative {
                similarity,
                keyword,
            });
        }
        let total = similarity + keyword;
        if total == 0.0 {
            return Err(WeightError::AllZero);
        }
        Ok(Self {
            similarity: similarity / total,
            keyword: keyword / total,
        })
    }

    /// Weights actually applied for a given scoring mode.
    pub fn for_mode(&self, mode: ScoringMode) -> FusionWeights {
        match mode {
            ScoringMode::Hybrid => *self,
            ScoringMode::SimilarityOnly => FusionWeights {
                similarity: 1.0,
                keyword: 0.0,
            },
            ScoringMode::KeywordOnly => FusionWeights {
                similarity: 0.0,
                keyword: 1.0,
            },
        }
    }
}

/// Which signals took part in a ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringMode {
    /// Embedding similarity and keyword overlap.
    Hybrid,
    /// The job text produced no keywords.
    SimilarityOnly,
    /// The job embedding could not be produced.
    KeywordOnly,
}

impl ScoringMode {
    pub fn select(job_has_embedding: bool, job_has_keywords: bool) -> Self {
        match (job_has_embedding, job_has_keywords) {
            (true, true) => ScoringMode::Hybrid,
            (true, false) => ScoringMode::SimilarityOnly,
            (false, _) => ScoringMode::KeywordOnly,
        }
    }
}

/// Fused score: `w_s * clamp(similarity) + w_k * clamp(overlap)`, bounded to [0, 1].
/// Negative cosine similarity contributes nothing.
pub fn fuse(similarity: f64, keyword_overlap: f64, weights: &FusionWeights) -> f64 {
    let similarity = if similarity.is_nan() { 0.0 } else { similarity.clamp(0.0, 1.0) };
    let overlap = if keyword_overlap.is_nan() {
        0.0
    } else {
        keyword_overlap.clamp(0.0, 1.0)
    };
    (weights.similarity * similarity + weights.keyword * overlap).clamp(0.0, 1.0)
}

/// `|matched| / max(|job keywords|, 1)`.
pub fn keyword_overlap_ratio(matched: usize, job_keywords: usize) -> f64 {
    matched as f64 / job_keywords.max(1) as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights_are_sixty_forty() {
        let w = FusionWeights::default();
        assert!((w.similarity - 0.6).abs() < f64::EPSILON);
        assert!((w.keyword - 0.4).abs() < f64::EPSILON);
    }

    #[test]
    fn test_new_normalizes_to_one() {
        let w = FusionWeights::new(3.0, 1.0).unwrap();
        assert!((w.similarity - 0.75).abs() < 1e-12);
        assert!((w.keyword - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_new_rejects_negative_and_zero() {
        assert!(matches!(
            FusionWeights::new(-0.1, 1.0),
            Err(WeightError::Negative { .. })
        ));
        assert_eq!(FusionWeights::new(0.0, 0.0), Err(WeightError::AllZero));
        assert!(FusionWeights::new(f64::NAN, 1.0).is_err());
    }

    #[test]
    fn test_fuse_full() {
        let w = FusionWeights::default();
        assert!((fuse(1.0, 1.0, &w) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_fuse_partial() {
        // 0.6*0.5 + 0.4*0.25 = 0.3 + 0.1 = 0.4
        let w = FusionWeights::default();
        assert!((fuse(0.5, 0.25, &w) - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_negative_similarity_contributes_nothing() {
        let w = FusionWeights::default();
        assert!((fuse(-0.8, 0.5, &w) - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_fuse_is_monotonic_in_both_inputs() {
        let w = FusionWeights::default();
        let steps: Vec<f64> = (0..=10).map(|i| i as f64 / 10.0).collect();
        for &fixed in &steps {
            for pair in steps.windows(2) {
                assert!(fuse(pair[0], fixed, &w) <= fuse(pair[1], fixed, &w));
                assert!(fuse(fixed, pair[0], &w) <= fuse(fixed, pair[1], &w));
            }
        }
    }

    #[test]
    fn test_overlap_ratio_guards_zero_keywords() {
        assert_eq!(keyword_overlap_ratio(0, 0), 0.0);
        assert!((keyword_overlap_ratio(2, 4) - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_mode_selection() {
        assert_eq!(ScoringMode::select(true, true), ScoringMode::Hybrid);
        assert_eq!(ScoringMode::select(true, false), ScoringMode::SimilarityOnly);
        assert_eq!(ScoringMode::select(false, true), ScoringMode::KeywordOnly);
        assert_eq!(ScoringMode::select(false, false), ScoringMode::KeywordOnly);
    }

    #[test]
    fn test_mode_weights() {
        let w = FusionWeights::default();
        assert_eq!(w.for_mode(ScoringMode::Hybrid), w);
        assert_eq!(w.for_mode(ScoringMode::KeywordOnly).keyword, 1.0);
        assert_eq!(w.for_mode(ScoringMode::SimilarityOnly).similarity, 1.0);
    }
}
