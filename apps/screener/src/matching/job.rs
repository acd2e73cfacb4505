//! Job analysis: keywords plus a structured requirement summary for a job description.

use std::sync::Arc;

use anyhow::{Context, Result};
use regex::Regex;

use crate::keywords::KeywordExtractor;
use crate::models::job::{ExperienceLevel, JobRequirementSummary};

const TOP_KEYWORDS: usize = 15;
const REQUIRED_SKILLS: usize = 10;
const MIN_REQUIREMENT_LINE_CHARS: usize = 10;

/// A job description prepared for ranking. Built per request, never persisted on its own.
#[derive(Debug, Clone)]
pub struct JobRequirement {
    /// Most frequent first.
    pub keywords: Vec<String>,
    pub embedding: Option<Vec<f32>>,
}

pub struct JobAnalyzer {
    extractor: Arc<KeywordExtractor>,
    experience: Vec<Regex>,
    entry_cues: Regex,
    senior_cues: Regex,
    mid_cues: Regex,
    education: Vec<(&'static str, Regex)>,
    job_types: Vec<(&'static str, Regex)>,
    list_item: Regex,
}

impl JobAnalyzer {
    pub fn new(extractor: Arc<KeywordExtractor>) -> Result<Self> {
        let compile = |p: &str| Regex::new(p).with_context(|| format!("Invalid job pattern {p}"));

        let experience = [
            r"(\d+)\+?\s*years?\s*(?:of\s*)?experience",
            r"(\d+)\+?\s*years?\s*(?:of\s*)?work",
            r"minimum\s*(?:of\s*)?(\d+)\+?\s*years?",
            r"at least\s*(\d+)\+?\s*years?",
        ]
        .into_iter()
        .map(compile)
        .collect::<Result<Vec<_>>>()?;

        let education = [
            ("PhD", r"\b(?:phd|ph\.d|doctorate)"),
            ("Masters", r"\b(?:master|msc)"),
            ("MBA", r"\bmba\b"),
            ("Bachelors", r"\b(?:bachelor|degree)"),
            ("Diploma", r"\bdiploma"),
            ("High School", r"\bhigh school"),
        ]
        .into_iter()
        .map(|(label, p)| compile(p).map(|re| (label, re)))
        .collect::<Result<Vec<_>>>()?;

        let job_types = [
            ("Full-time", r"\bfull[- ]?time\b"),
            ("Part-time", r"\bpart[- ]?time\b"),
            ("Contract", r"\bcontract"),
            ("Internship", r"\binterns?(?:hip)?\b"),
            ("Freelance", r"\bfreelance"),
            ("Remote", r"\bremote\b"),
            ("Hybrid", r"\bhybrid\b"),
        ]
        .into_iter()
        .map(|(label, p)| compile(p).map(|re| (label, re)))
        .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            extractor,
            experience,
            entry_cues: compile(r"\b(?:entry[- ]level|junior|associate|graduate|new grad)\b")?,
            senior_cues: compile(r"\b(?:senior|lead|principal|staff)\b")?,
            mid_cues: compile(r"\bmid[- ]?level\b")?,
            education,
            job_types,
            list_item: compile(r"^\s*(?:[•\-*]|\d+[.)])\s*(.+)$")?,
        })
    }

    pub fn extractor(&self) -> &KeywordExtractor {
        &self.extractor
    }

    /// Keywords for ranking; the embedding is attached by the caller.
    pub fn requirement(&self, job_text: &str) -> JobRequirement {
        JobRequirement {
            keywords: self.extractor.extract(job_text),
            embedding: None,
        }
    }

    pub fn extract_job_requirements(&self, job_text: &str) -> JobRequirementSummary {
        if job_text.trim().is_empty() {
            return JobRequirementSummary::default();
        }

        let hits = self.extractor.extract_all(job_text);
        let keywords: Vec<String> = hits
            .iter()
            .take(self.extractor.limit())
            .map(|h| h.keyword.clone())
            .collect();
        let technical_skills = hits
            .iter()
            .filter(|h| h.category().is_some_and(|c| c.is_technical()))
            .map(|h| h.keyword.clone())
            .collect();
        let required_skills = hits
            .iter()
            .filter(|h| h.category().is_some())
            .take(REQUIRED_SKILLS)
            .map(|h| h.keyword.clone())
            .collect();

        let lower = job_text.to_lowercase();
        let years = self.required_years(&lower);

        JobRequirementSummary {
            top_keywords: keywords.iter().take(TOP_KEYWORDS).cloned().collect(),
            total_keywords: keywords.len(),
            technical_skills,
            required_skills,
            experience_required: match years {
                Some(n) => format!("{n}+ years"),
                None if self.entry_cues.is_match(&lower) => "Entry Level".to_string(),
                None => "Not specified".to_string(),
            },
            experience_level: self.experience_level(&lower, years),
            education_level: self
                .education
                .iter()
                .find(|(_, re)| re.is_match(&lower))
                .map(|(label, _)| label.to_string())
                .unwrap_or_else(|| "Not specified".to_string()),
            job_types: self
                .job_types
                .iter()
                .filter(|(_, re)| re.is_match(&lower))
                .map(|(label, _)| label.to_string())
                .collect(),
            requirement_lines: job_text
                .lines()
                .filter_map(|line| self.list_item.captures(line))
                .filter_map(|c| c.get(1))
                .map(|m| m.as_str().trim().to_string())
                .filter(|l| l.chars().count() > MIN_REQUIREMENT_LINE_CHARS)
                .collect(),
        }
    }

    fn required_years(&self, lower: &str) -> Option<u32> {
        self.experience.iter().find_map(|re| {
            re.captures(lower)
                .and_then(|c| c.get(1))
                .and_then(|m| m.as_str().parse().ok())
        })
    }

    fn experience_level(&self, lower: &str, years: Option<u32>) -> ExperienceLevel {
        if self.senior_cues.is_match(lower) || years.is_some_and(|y| y >= 5) {
            ExperienceLevel::Senior
        } else if self.mid_cues.is_match(lower) || years.is_some_and(|y| (2..=4).contains(&y)) {
            ExperienceLevel::MidLevel
        } else if self.entry_cues.is_match(lower) || years.is_some_and(|y| y <= 1) {
            ExperienceLevel::EntryLevel
        } else {
            ExperienceLevel::NotSpecified
        }
    }
}
