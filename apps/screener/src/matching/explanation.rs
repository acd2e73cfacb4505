use std::time::Duration;

use tracing::{info, warn};

use crate::llm_client::prompts::HR_ANALYST_SYSTEM;
use crate::llm_client::{complete_with_timeout, LanguageModel};
use crate::matching::prompts::{EXPLAIN_CANDIDATE_TEMPLATE, EXPLAIN_PROMPT_TEMPLATE};
use crate::models::screening::{Explanation, ExplanationMode, MatchResult};
use crate::models::truncate_chars;

/// Candidates covered by an explanation.
const EXPLAINED_CANDIDATES: usize = 3;
const JOB_PROMPT_CHARS: usize = 800;
const PREVIEW_PROMPT_CHARS: usize = 300;
const EXPLAIN_MAX_TOKENS: u32 = 500;

pub const NO_MATCHES_TEXT: &str = "No matching resumes found.";

/// Explains a ranking. Uses the model when one is configured and falls back to
/// the template on any model failure, so this never errors.
pub async fn explain(
    llm: Option<&dyn LanguageModel>,
    job_text: &str,
    matches: &[MatchResult],
    timeout: Duration,
) -> Explanation {
    if matches.is_empty() {
        return template(matches);
    }
    let Some(llm) = llm else {
        return template(matches);
    };

    let prompt = build_prompt(job_text, matches);
    match complete_with_timeout(llm, &prompt, HR_ANALYST_SYSTEM, EXPLAIN_MAX_TOKENS, timeout).await
    {
        Ok(text) => {
            info!(candidates = matches.len().min(EXPLAINED_CANDIDATES), "LLM explanation generated");
            Explanation {
                text,
                mode: ExplanationMode::Llm,
            }
        }
        Err(e) => {
            warn!(error = %e, "LLM explanation failed, using template");
            template(matches)
        }
    }
}

fn build_prompt(job_text: &str, matches: &[MatchResult]) -> String {
    let candidates: Vec<String> = matches
        .iter()
        .take(EXPLAINED_CANDIDATES)
        .enumerate()
        .map(|(i, m)| {
            EXPLAIN_CANDIDATE_TEMPLATE
                .replace("{position}", &(i + 1).to_string())
                .replace("{file_name}", &m.file_name)
                .replace("{name}", or_not_specified(&m.name))
                .replace("{skills}", &list_or_not_specified(&m.skills))
                .replace("{experience}", &experience_label(m.experience_years))
                .replace("{score}", &format!("{:.4}", m.score))
                .replace("{matched}", &list_or_not_specified(&m.matched_keywords))
                .replace("{preview}", &truncate_chars(&m.preview, PREVIEW_PROMPT_CHARS))
        })
        .collect();

    EXPLAIN_PROMPT_TEMPLATE
        .replace("{job_text}", &truncate_chars(job_text, JOB_PROMPT_CHARS))
        .replace("{candidates}", &candidates.join("\n"))
}

/// Deterministic explanation built only from the match data.
pub fn template(matches: &[MatchResult]) -> Explanation {
    if matches.is_empty() {
        return Explanation {
            text: NO_MATCHES_TEXT.to_string(),
            mode: ExplanationMode::Template,
        };
    }

    let mut text = String::from("Resume Matching Analysis:\n\n");
    for m in matches.iter().take(EXPLAINED_CANDIDATES) {
        let similarity = if m.similarity_available {
            format!("{:.4}", m.similarity)
        } else {
            "unavailable".to_string()
        };
        text.push_str(&format!(
            "{}. {}\n   \
             - Match Score: {:.4} (higher is better)\n   \
             - Similarity: {}\n   \
             - Keyword Overlap: {:.0}%\n   \
             - Skills: {}\n   \
             - Experience: {}\n   \
             - Email: {}\n\n",
            m.rank,
            m.file_name,
            m.score,
            similarity,
            m.keyword_overlap * 100.0,
            list_or_not_specified(&m.skills),
            experience_label(m.experience_years),
            or_not_specified(&m.email),
        ));
    }

    Explanation {
        text: text.trim_end().to_string(),
        mode: ExplanationMode::Template,
    }
}

fn or_not_specified(value: &str) -> &str {
    if value.trim().is_empty() {
        "Not specified"
    } else {
        value
    }
}

fn list_or_not_specified(values: &[String]) -> String {
    if values.is_empty() {
        "Not specified".to_string()
    } else {
        values.join(", ")
    }
}

fn experience_label(years: Option<u32>) -> String {
    match years {
        Some(y) => format!("{y} years"),
        None => "Not specified".to_string(),
    }
}
