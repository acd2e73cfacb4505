use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExperienceLevel {
    EntryLevel,
    MidLevel,
    Senior,
    NotSpecified,
}

/// Structured summary of a job description, shown next to screening and optimization results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRequirementSummary {
    pub top_keywords: Vec<String>,
    pub total_keywords: usize,
    pub technical_skills: Vec<String>,
    pub required_skills: Vec<String>,
    /// "5+ years", "Entry Level" or "Not specified".
    pub experience_required: String,
    pub experience_level: ExperienceLevel,
    pub education_level: String,
    pub job_types: Vec<String>,
    pub requirement_lines: Vec<String>,
}

impl Default for JobRequirementSummary {
    fn default() -> Self {
        Self {
            top_keywords: Vec::new(),
            total_keywords: 0,
            technical_skills: Vec::new(),
            required_skills: Vec::new(),
            experience_required: "Not specified".to_string(),
            experience_level: ExperienceLevel::NotSpecified,
            education_level: "Not specified".to_string(),
            job_types: Vec::new(),
            requirement_lines: Vec::new(),
        }
    }
}
