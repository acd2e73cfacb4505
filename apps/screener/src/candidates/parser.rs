//! Resume Parser: regex heuristics that turn raw resume text into a `CandidateRecord`.
//!
//! Every field is best effort: a field that cannot be found is left empty, never an error.

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use regex::Regex;

use crate::keywords::KeywordExtractor;
use crate::models::candidate::{CandidateRecord, ParseStatus};

/// Lines at the top of a resume searched for the candidate's name.
const NAME_SEARCH_LINES: usize = 5;
const NAME_MAX_WORDS: usize = 4;
const NAME_NOISE_WORDS: &[&str] = &["resume", "cv", "curriculum", "vitae"];

/// Digit count a phone match needs, which keeps date ranges like `2018 - 2021` out.
const PHONE_MIN_DIGITS: usize = 10;
const PHONE_MAX_DIGITS: usize = 15;

pub struct ResumeParser {
    extractor: Arc<KeywordExtractor>,
    email: Regex,
    phones: Vec<Regex>,
    experience: Vec<Regex>,
}

impl ResumeParser {
    pub fn new(extractor: Arc<KeywordExtractor>) -> Result<Self> {
        let email = Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b")
            .context("Invalid email pattern")?;
        let phones = [
            r"\+?[1-9][0-9 .\-()]{8,}[0-9]",
            r"\(\d{3}\)\s?\d{3}-\d{4}",
            r"\d{3}-\d{3}-\d{4}",
            r"\d{10}",
        ]
        .iter()
        .map(|p| Regex::new(p).with_context(|| format!("Invalid phone pattern {p}")))
        .collect::<Result<Vec<_>>>()?;
        let experience = [
            r"(\d+)\+?\s*years?\s*(?:of\s*)?experience",
            r"(\d+)\+?\s*years?\s*(?:of\s*)?work",
            r"experience\s*(?:of\s*)?(\d+)\+?\s*years?",
        ]
        .iter()
        .map(|p| Regex::new(p).with_context(|| format!("Invalid experience pattern {p}")))
        .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            extractor,
            email,
            phones,
            experience,
        })
    }

    /// Builds a record from already-extracted text. The embedding is left empty.
    pub fn parse(&self, file_name: &str, text: &str) -> CandidateRecord {
        if text.trim().is_empty() {
            return CandidateRecord::failed(file_name, "no text could be extracted");
        }

        let keywords = self
            .extractor
            .extract_all(text)
            .into_iter()
            .map(|h| h.keyword)
            .collect();

        CandidateRecord {
            file_name: file_name.to_string(),
            name: extract_name(text),
            email: self.extract_email(text),
            phone: self.extract_phone(text),
            skills: self.extractor.skills(text),
            keywords,
            experience_years: self.extract_experience_years(text),
            embedding: None,
            word_count: text.split_whitespace().count(),
            text_length: text.chars().count(),
            text: text.to_string(),
            status: ParseStatus::Success,
            parsed_at: Utc::now(),
        }
    }

    pub fn extract_email(&self, text: &str) -> String {
        self.email
            .find(text)
            .map(|m| m.as_str().to_string())
            .unwrap_or_default()
    }

    pub fn extract_phone(&self, text: &str) -> String {
        for pattern in &self.phones {
            let found = pattern.find_iter(text).find(|m| {
                let digits = m.as_str().chars().filter(|c| c.is_ascii_digit()).count();
                (PHONE_MIN_DIGITS..=PHONE_MAX_DIGITS).contains(&digits)
            });
            if let Some(m) = found {
                return m.as_str().trim().to_string();
            }
        }
        String::new()
    }

    pub fn extract_experience_years(&self, text: &str) -> Option<u32> {
        let lower = text.to_lowercase();
        self.experience.iter().find_map(|pattern| {
            pattern
                .captures(&lower)
                .and_then(|c| c.get(1))
                .and_then(|m| m.as_str().parse().ok())
        })
    }
}

/// First short line near the top that reads like a person's name.
pub fn extract_name(text: &str) -> String {
    for line in text.lines().take(NAME_SEARCH_LINES) {
        let line = line.trim();
        if line.is_empty() || line.contains('@') {
            continue;
        }
        let words: Vec<&str> = line.split_whitespace().collect();
        if words.len() > NAME_MAX_WORDS {
            continue;
        }
        let kept: Vec<&str> = words
            .into_iter()
            .filter(|w| !NAME_NOISE_WORDS.contains(&w.to_lowercase().as_str()))
            .collect();
        if kept.len() >= 2 {
            return kept.join(" ");
        }
    }
    String::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keywords::Vocabulary;

    fn parser() -> ResumeParser {
        let extractor = KeywordExtractor::new(Arc::new(Vocabulary::default()), 30).unwrap();
        ResumeParser::new(Arc::new(extractor)).unwrap()
    }

    const RESUME: &str = "Jane Q Doe\n\
        jane.doe@example.com | +1 415 555 0134\n\
        Senior Backend Engineer\n\
        \n\
        Summary: 7 years of experience building Python and Rust services on AWS.\n\
        Employment: 2018 - 2021 Acme Corp\n\
        Skills: Docker, Kubernetes, PostgreSQL\n";

    #[test]
    fn test_parse_extracts_all_fields() {
        let record = parser().parse("jane.txt", RESUME);
        assert!(record.is_success());
        assert_eq!(record.name, "Jane Q Doe");
        assert_eq!(record.email, "jane.doe@example.com");
        assert_eq!(record.phone, "+1 415 555 0134");
        assert_eq!(record.experience_years, Some(7));
        for skill in ["aws", "docker", "kubernetes", "postgresql", "python", "rust"] {
            assert!(record.skills.contains(&skill.to_string()), "missing {skill}");
        }
        assert!(record.keywords.contains(&"senior".to_string()));
        assert!(record.embedding.is_none());
    }

    #[test]
    fn test_name_skips_resume_heading() {
        assert_eq!(extract_name("Resume\nJohn Smith\nEngineer"), "John Smith");
        assert_eq!(extract_name("Curriculum Vitae Maria Garcia"), "Maria Garcia");
    }

    #[test]
    fn test_name_ignores_long_and_email_lines() {
        let text = "a.b@example.com\nThis line has far too many words to be a name\nfoo";
        assert_eq!(extract_name(text), "");
    }

    #[test]
    fn test_phone_ignores_date_ranges() {
        let p = parser();
        assert_eq!(p.extract_phone("Worked 2018 - 2021 at Acme"), "");
        assert_eq!(p.extract_phone("Call 415-555-0134 today"), "415-555-0134");
    }

    #[test]
    fn test_experience_variants() {
        let p = parser();
        assert_eq!(p.extract_experience_years("5+ years of work in fintech"), Some(5));
        assert_eq!(p.extract_experience_years("Experience of 12 years"), Some(12));
        assert_eq!(p.extract_experience_years("fresh graduate"), None);
    }

    #[test]
    fn test_empty_text_is_a_parse_error() {
        let record = parser().parse("blank.pdf", "   \n  ");
        assert!(!record.is_success());
        assert!(!record.is_rankable());
    }

    #[test]
    fn test_missing_fields_stay_empty() {
        let record = parser().parse("x.txt", "python");
        assert!(record.is_success());
        assert_eq!(record.email, "");
        assert_eq!(record.phone, "");
        assert_eq!(record.name, "");
        assert_eq!(record.experience_years, None);
    }
}
