//! Keyword Extractor: frequency-ranked vocabulary and pattern matches in free text.
//!
//! Matching rules:
//! - Case-insensitive, on whitespace-collapsed text.
//! - A vocabulary span counts only when the characters around it are not ASCII
//!   alphanumeric, so `java` never fires inside `javascript` and `c++` / `node.js` work.
//! - Overlapping terms resolve leftmost-longest among the spans that pass the boundary
//!   check: `react native` wins over `react`, `node.js` over `node`, but `sql servers`
//!   still yields `sql`. A span is consumed by exactly one term.
//! - Seniority, years-of-experience, degree and employment-shape patterns are folded
//!   into the same frequency count.
//! - Output order: count descending, then first occurrence.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use aho_corasick::{AhoCorasick, MatchKind};
use anyhow::{Context, Result};
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::keywords::vocabulary::{normalize_term, Category, Vocabulary};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    Seniority,
    Experience,
    Degree,
    EmploymentShape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum KeywordSource {
    Vocabulary { category: Category },
    Pattern { kind: PatternKind },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordHit {
    pub keyword: String,
    pub count: u32,
    /// Byte offset of the first occurrence in the normalized text.
    pub first_position: usize,
    #[serde(flatten)]
    pub source: KeywordSource,
}

impl KeywordHit {
    pub fn category(&self) -> Option<Category> {
        match self.source {
            KeywordSource::Vocabulary { category } => Some(category),
            KeywordSource::Pattern { .. } => None,
        }
    }
}

struct KeywordPattern {
    kind: PatternKind,
    regex: Regex,
}

impl KeywordPattern {
    /// The keyword text and its offset for one regex match.
    fn keyword(&self, caps: &Captures<'_>) -> Option<(String, usize)> {
        let whole = caps.get(0)?;
        match self.kind {
            PatternKind::Seniority => {
                let title = caps.get(1)?;
                Some((title.as_str().to_string(), title.start()))
            }
            PatternKind::EmploymentShape => {
                Some((canonical_employment_shape(whole.as_str()), whole.start()))
            }
            PatternKind::Experience | PatternKind::Degree => {
                Some((whole.as_str().trim().to_string(), whole.start()))
            }
        }
    }
}

/// Immutable extractor built once from a vocabulary.
pub struct KeywordExtractor {
    vocabulary: Arc<Vocabulary>,
    matcher: AhoCorasick,
    patterns: Vec<KeywordPattern>,
    limit: usize,
}

impl KeywordExtractor {
    pub fn new(vocabulary: Arc<Vocabulary>, limit: usize) -> Result<Self> {
        let terms: Vec<&str> = vocabulary.terms().iter().map(|t| t.text.as_str()).collect();
        let matcher = AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .match_kind(MatchKind::Standard)
            .build(&terms)
            .context("Failed to build vocabulary matcher")?;

        let pattern_specs = [
            (
                PatternKind::Seniority,
                r"\b(senior|junior|lead|principal|staff|architect)\s+\w+",
            ),
            (
                PatternKind::Experience,
                r"\b\d+\+?\s*years?\s*(?:of\s*)?(?:experience|exp)\b",
            ),
            (
                PatternKind::Degree,
                r"\b(?:bachelor|master|phd|degree|certification)\w*\s+\w+",
            ),
            (
                PatternKind::EmploymentShape,
                r"\b(?:full.?stack|front.?end|back.?end|full.?time|part.?time)\b",
            ),
        ];
        let patterns = pattern_specs
            .into_iter()
            .map(|(kind, src)| {
                Regex::new(src)
                    .with_context(|| format!("Invalid keyword pattern for {kind:?}"))
                    .map(|regex| KeywordPattern { kind, regex })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            vocabulary,
            matcher,
            patterns,
            limit,
        })
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Every hit with its count, most frequent first. Uncapped.
    pub fn extract_all(&self, text: &str) -> Vec<KeywordHit> {
        let normalized = normalize_term(text);

        let mut hits: Vec<KeywordHit> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for (start, _, pattern) in self.vocabulary_spans(&normalized) {
            let term = &self.vocabulary.terms()[pattern];
            record_hit(
                &mut hits,
                &mut index,
                &term.text,
                start,
                KeywordSource::Vocabulary {
                    category: term.category,
                },
            );
        }

        for pattern in &self.patterns {
            for caps in pattern.regex.captures_iter(&normalized) {
                if let Some((keyword, position)) = pattern.keyword(&caps) {
                    if keyword.is_empty() {
                        continue;
                    }
                    record_hit(
                        &mut hits,
                        &mut index,
                        &keyword,
                        position,
                        KeywordSource::Pattern { kind: pattern.kind },
                    );
                }
            }
        }

        hits.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| a.first_position.cmp(&b.first_position))
        });
        hits
    }

    /// Boundary-valid vocabulary spans as `(start, end, pattern)`, non-overlapping,
    /// picked leftmost-longest.
    fn vocabulary_spans(&self, normalized: &str) -> Vec<(usize, usize, usize)> {
        let bytes = normalized.as_bytes();
        let mut candidates: Vec<(usize, usize, usize)> = self
            .matcher
            .find_overlapping_iter(normalized)
            .filter(|m| is_word_boundary(bytes, m.start(), m.end()))
            .map(|m| (m.start(), m.end(), m.pattern().as_usize()))
            .collect();
        candidates.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| b.1.cmp(&a.1)));

        let mut spans = Vec::with_capacity(candidates.len());
        let mut next_free = 0;
        for (start, end, pattern) in candidates {
            if start >= next_free {
                spans.push((start, end, pattern));
                next_free = end;
            }
        }
        spans
    }

    /// Keywords most-frequent-first, capped at the configured limit.
    pub fn extract(&self, text: &str) -> Vec<String> {
        self.extract_all(text)
            .into_iter()
            .take(self.limit)
            .map(|h| h.keyword)
            .collect()
    }

    /// All keywords as a set, used for overlap against job keywords.
    pub fn keyword_set(&self, text: &str) -> BTreeSet<String> {
        self.extract_all(text).into_iter().map(|h| h.keyword).collect()
    }

    /// Vocabulary skills only, alphabetical.
    pub fn skills(&self, text: &str) -> Vec<String> {
        let set: BTreeSet<String> = self
            .extract_all(text)
            .into_iter()
            .filter(|h| h.category().is_some())
            .map(|h| h.keyword)
            .collect();
        set.into_iter().collect()
    }
}

fn record_hit(
    hits: &mut Vec<KeywordHit>,
    index: &mut HashMap<String, usize>,
    keyword: &str,
    position: usize,
    source: KeywordSource,
) {
    match index.get(keyword) {
        Some(&i) => {
            let hit = &mut hits[i];
            hit.count += 1;
            hit.first_position = hit.first_position.min(position);
        }
        None => {
            index.insert(keyword.to_string(), hits.len());
            hits.push(KeywordHit {
                keyword: keyword.to_string(),
                count: 1,
                first_position: position,
                source,
            });
        }
    }
}

fn is_word_boundary(bytes: &[u8], start: usize, end: usize) -> bool {
    let before_ok = start == 0 || !bytes[start - 1].is_ascii_alphanumeric();
    let after_ok = end >= bytes.len() || !bytes[end].is_ascii_alphanumeric();
    before_ok && after_ok
}

/// `full stack`, `fullstack` and `full-stack` all become `full-stack`.
fn canonical_employment_shape(raw: &str) -> String {
    let letters: String = raw.chars().filter(|c| c.is_ascii_alphabetic()).collect();
    for (head, tail) in [
        ("full", "stack"),
        ("front", "end"),
        ("back", "end"),
        ("full", "time"),
        ("part", "time"),
    ] {
        if letters.len() == head.len() + tail.len()
            && letters.starts_with(head)
            && letters.ends_with(tail)
        {
            return format!("{head}-{tail}");
        }
    }
    letters
}
