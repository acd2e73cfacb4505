// Prompt templates and fixed advice for ATS optimization.

/// Optimization prompt. Replace `{resume_text}` and `{job_text}` before sending.
pub const OPTIMIZE_PROMPT_TEMPLATE: &str = r#"As an ATS (Applicant Tracking System) expert and HR professional, analyze this resume against the job description and provide optimization recommendations.

RESUME:
{resume_text}

JOB DESCRIPTION:
{job_text}

Return a JSON object with this EXACT schema:
{
  "ats_score": <number from 0 to 100>,
  "missing_keywords": [<important keywords missing from the resume>],
  "keyword_optimization": {
    "add_keywords": [<keywords to add>],
    "improve_sections": [<sections that need keyword improvement>]
  },
  "format_improvements": [<formatting suggestions>],
  "content_suggestions": [<content improvement suggestions>],
  "skills_gap": [<skills in the job but missing from the resume>],
  "strengths": [<existing strengths that match the job>],
  "action_items": [<specific actionable recommendations>]
}

Focus on:
1. ATS-friendly formatting
2. Keyword optimization
3. Skills alignment
4. Content structure
5. Quantifiable achievements"#;

pub const IMPROVE_SECTIONS: &[&str] = &["Skills", "Experience", "Summary"];

pub const STANDARD_FORMAT_ADVICE: &[&str] = &[
    "Use standard section headers (Experience, Education, Skills)",
    "Use bullet points for achievements and responsibilities",
    "Include quantifiable achievements (numbers, percentages, metrics)",
    "Use consistent date formatting",
    "Avoid headers, footers, and graphics that ATS can't read",
];

pub const CONTENT_ADVICE: &[&str] = &[
    "Tailor your professional summary to match the job requirements",
    "Use action verbs to describe your accomplishments",
    "Include specific technologies and tools mentioned in the job posting",
    "Quantify your achievements with numbers and metrics",
    "Match your experience descriptions to job requirements",
    "Include relevant certifications and training",
    "Use industry-specific terminology from the job description",
];

pub const STANDARD_ACTION_ITEMS: &[&str] = &[
    "Review job description and incorporate exact phrases where truthful",
    "Add quantifiable achievements to each role",
    "Ensure your resume is in a simple, ATS-friendly format",
    "Proofread for spelling and grammatical errors",
    "Save resume as both PDF and Word document",
];
