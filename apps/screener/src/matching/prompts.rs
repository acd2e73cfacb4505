// Prompt templates for screening explanations.

/// Explanation prompt. Replace `{job_text}` and `{candidates}` before sending.
pub const EXPLAIN_PROMPT_TEMPLATE: &str = r#"Analyze why these resumes are good matches for the given job description.

Job Description:
{job_text}

Top Matching Resumes:
{candidates}

Please provide:
1. Overall assessment of the matches
2. Key skills alignment for each candidate
3. Strengths and potential concerns for each candidate
4. Ranking recommendation with justification

Keep the response concise but informative (max 400 words)."#;

/// One candidate block inside `{candidates}`.
pub const EXPLAIN_CANDIDATE_TEMPLATE: &str = r#"Resume {position}: {file_name}
- Name: {name}
- Skills: {skills}
- Experience: {experience}
- Match Score: {score}
- Matched Keywords: {matched}
- Best Match Text: {preview}
"#;
