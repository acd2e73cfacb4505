//! ATS Optimizer: scores a resume against a job and lists concrete fixes.
//!
//! Basic mode is a pure function of the two texts. LLM mode asks the model for the
//! same report shape and falls back to basic mode when the reply is unusable.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use regex::Regex;
use tracing::{info, warn};

use crate::keywords::KeywordExtractor;
use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::llm_client::{call_json, LanguageModel};
use crate::models::optimization::{KeywordOptimization, OptimizationMode, OptimizationReport};
use crate::models::truncate_chars;
use crate::optimization::prompts::{
    CONTENT_ADVICE, IMPROVE_SECTIONS, OPTIMIZE_PROMPT_TEMPLATE, STANDARD_ACTION_ITEMS,
    STANDARD_FORMAT_ADVICE,
};
use crate::store::screening::round_to;

const MISSING_KEYWORDS: usize = 10;
const ADD_KEYWORDS: usize = 5;
const SKILLS_GAP: usize = 7;
const STRENGTHS: usize = 5;

const RESUME_PROMPT_CHARS: usize = 2000;
const JOB_PROMPT_CHARS: usize = 1000;
const OPTIMIZE_MAX_TOKENS: u32 = 1000;

const KEYWORD_WEIGHT: f64 = 0.7;
const FORMAT_WEIGHT: f64 = 0.3;

/// Sections every ATS-friendly resume names.
const REQUIRED_SECTIONS: &[&str] = &["experience", "education", "skills"];

pub struct AtsOptimizer {
    extractor: Arc<KeywordExtractor>,
    email: Regex,
    phone: Regex,
}

impl AtsOptimizer {
    pub fn new(extractor: Arc<KeywordExtractor>) -> Result<Self> {
        Ok(Self {
            extractor,
            email: Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b")
                .context("invalid email pattern")?,
            phone: Regex::new(r"[+(]?[1-9][0-9 .\-()]{8,}[0-9]").context("invalid phone pattern")?,
        })
    }

    /// Uses the model when given one; any model failure falls back to [`Self::basic`].
    pub async fn optimize(
        &self,
        llm: Option<&dyn LanguageModel>,
        resume_text: &str,
        job_text: &str,
        timeout: Duration,
    ) -> OptimizationReport {
        let Some(llm) = llm else {
            return self.basic(resume_text, job_text);
        };

        let prompt = OPTIMIZE_PROMPT_TEMPLATE
            .replace("{resume_text}", &truncate_chars(resume_text, RESUME_PROMPT_CHARS))
            .replace("{job_text}", &truncate_chars(job_text, JOB_PROMPT_CHARS));

        match call_json::<OptimizationReport>(
            llm,
            &prompt,
            JSON_ONLY_SYSTEM,
            OPTIMIZE_MAX_TOKENS,
            timeout,
        )
        .await
        {
            Ok(mut report) => {
                report.ats_score = sanitize_score(report.ats_score);
                report.mode = OptimizationMode::Llm;
                info!(ats_score = report.ats_score, "LLM optimization complete");
                report
            }
            Err(e) => {
                warn!(error = %e, "LLM optimization failed, using basic analysis");
                self.basic(resume_text, job_text)
            }
        }
    }

    /// Deterministic keyword and format analysis.
    pub fn basic(&self, resume_text: &str, job_text: &str) -> OptimizationReport {
        let job_keywords = self.extractor.extract(job_text);
        let resume_keywords: BTreeSet<String> = self.extractor.keyword_set(resume_text);

        let (present, missing): (Vec<String>, Vec<String>) = job_keywords
            .iter()
            .cloned()
            .partition(|k| resume_keywords.contains(k));

        let keyword_score = if job_keywords.is_empty() {
            0.0
        } else {
            present.len() as f64 / job_keywords.len() as f64 * 100.0
        };
        let format_score = self.format_score(resume_text);
        let ats_score = round_to(
            keyword_score * KEYWORD_WEIGHT + format_score * FORMAT_WEIGHT,
            1,
        );

        OptimizationReport {
            ats_score,
            missing_keywords: missing.iter().take(MISSING_KEYWORDS).cloned().collect(),
            keyword_optimization: KeywordOptimization {
                add_keywords: missing.iter().take(ADD_KEYWORDS).cloned().collect(),
                improve_sections: IMPROVE_SECTIONS.iter().map(|s| s.to_string()).collect(),
            },
            format_improvements: self.format_suggestions(resume_text),
            content_suggestions: CONTENT_ADVICE.iter().map(|s| s.to_string()).collect(),
            skills_gap: missing.iter().take(SKILLS_GAP).cloned().collect(),
            strengths: present.into_iter().take(STRENGTHS).collect(),
            action_items: action_items(&missing, resume_text),
            mode: OptimizationMode::Basic,
        }
    }

    /// 100 minus penalties for length, contact details and missing sections. Never below 0.
    pub fn format_score(&self, resume_text: &str) -> f64 {
        let words = resume_text.split_whitespace().count();
        let lower = resume_text.to_lowercase();
        let mut score: i32 = 100;

        if words < 100 {
            score -= 20;
        }
        if words > 1000 {
            score -= 10;
        }
        if !self.email.is_match(resume_text) {
            score -= 15;
        }
        if !self.phone.is_match(resume_text) {
            score -= 10;
        }
        for section in REQUIRED_SECTIONS {
            if !lower.contains(section) {
                score -= 10;
            }
        }
        f64::from(score.max(0))
    }

    fn format_suggestions(&self, resume_text: &str) -> Vec<String> {
        let words = resume_text.split_whitespace().count();
        let mut suggestions = Vec::new();

        if !self.email.is_match(resume_text) {
            suggestions.push("Add a professional email address".to_string());
        }
        if !self.phone.is_match(resume_text) {
            suggestions.push("Include a phone number".to_string());
        }
        if words < 200 {
            suggestions.push(
                "Resume appears too short - add more detail to experience and skills".to_string(),
            );
        }
        if words > 800 {
            suggestions
                .push("Resume may be too long - consider condensing to 1-2 pages".to_string());
        }
        suggestions.extend(STANDARD_FORMAT_ADVICE.iter().map(|s| s.to_string()));
        suggestions
    }
}

fn action_items(missing: &[String], resume_text: &str) -> Vec<String> {
    let lower = resume_text.to_lowercase();
    let mut items = Vec::new();

    if !missing.is_empty() {
        let top: Vec<&str> = missing.iter().take(ADD_KEYWORDS).map(String::as_str).collect();
        items.push(format!("Add these key skills to your resume: {}", top.join(", ")));
    }
    if !lower.contains("experience") {
        items.push("Add a dedicated 'Experience' or 'Work History' section".to_string());
    }
    if !lower.contains("skills") {
        items.push("Create a 'Skills' section with relevant technical and soft skills".to_string());
    }
    items.extend(STANDARD_ACTION_ITEMS.iter().map(|s| s.to_string()));
    items
}

fn sanitize_score(score: f64) -> f64 {
    if score.is_finite() {
        round_to(score.clamp(0.0, 100.0), 1)
    } else {
        0.0
    }
}
