// Interview-prep prompt templates.
// Reuses cross-cutting fragments from llm_client::prompts.

/// Job analysis prompt. Replace `{company}`, `{role}`, `{job_description}`
/// and `{entries}` before sending.
pub const JOB_ANALYSIS_PROMPT_TEMPLATE: &str = r#"Help the user prepare for an interview.

COMPANY: {company}
ROLE: {role}

JOB DESCRIPTION:
{job_description}

THE USER'S ACHIEVEMENTS (title | one-line summary | skills):
{entries}

Return a JSON object with this EXACT schema (no extra fields):
{
  "fit_summary": "two or three sentences, second person, on how the user's achievements fit the role",
  "relevant_entries": ["titles of the most relevant achievements, copied exactly from the list above"],
  "talking_points": ["short points the user should bring up"],
  "likely_questions": ["interview questions the user should expect"]
}

RULES:
1. Only reference achievements that appear in the list above.
2. At most five items per list.
3. If the list is empty, leave "relevant_entries" empty and focus on the job description."#;

/// Interview-prep blurb prompt. Replace `{entries}` before sending.
pub const PREP_BLURB_PROMPT_TEMPLATE: &str = "\
Based on the user's achievements below, write a short paragraph (at most four sentences, \
second person) telling them which strengths to highlight in their next interview and \
which achievement makes the best story.

THE USER'S ACHIEVEMENTS (title | one-line summary | skills):
{entries}";
