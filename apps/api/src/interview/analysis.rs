//! Job analysis and prep blurb: the interview-prep flow over a user's entries.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::interview::prompts::{JOB_ANALYSIS_PROMPT_TEMPLATE, PREP_BLURB_PROMPT_TEMPLATE};
use crate::interview::render_entries_for_prompt;
use crate::journal::models::JournalEntry;
use crate::llm_client::prompts::{BRIDGET_SYSTEM, JSON_ONLY_INSTRUCTION};
use crate::llm_client::{parse_json_lenient, TextGenerator};

/// Entries included in interview-prep prompts, newest first.
const PREP_CONTEXT_ENTRIES: usize = 25;

#[derive(Debug, Clone, Deserialize)]
pub struct JobPostingRequest {
    #[serde(default)]
    pub company: String,
    pub role: String,
    pub job_description: String,
}

/// Structured model output for a job posting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobAnalysis {
    pub fit_summary: String,
    #[serde(default)]
    pub relevant_entries: Vec<String>,
    #[serde(default)]
    pub talking_points: Vec<String>,
    #[serde(default)]
    pub likely_questions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrepBlurb {
    pub blurb: String,
    pub entry_count: usize,
}

/// Analyzes a job posting against the user's entries.
pub async fn analyze_job(
    generator: &dyn TextGenerator,
    entries: &[JournalEntry],
    request: &JobPostingRequest,
) -> Result<JobAnalysis, AppError> {
    if request.role.trim().is_empty() {
        return Err(AppError::Validation("role cannot be empty".to_string()));
    }
    if request.job_description.trim().is_empty() {
        return Err(AppError::Validation(
            "job_description cannot be empty".to_string(),
        ));
    }

    let prompt = JOB_ANALYSIS_PROMPT_TEMPLATE
        .replace("{company}", non_empty_or(&request.company, "(not given)"))
        .replace("{role}", request.role.trim())
        .replace("{job_description}", request.job_description.trim())
        .replace(
            "{entries}",
            &render_entries_for_prompt(entries, PREP_CONTEXT_ENTRIES),
        );
    let prompt = format!("{prompt}\n\n{JSON_ONLY_INSTRUCTION}");

    let raw = generator.complete(BRIDGET_SYSTEM, &prompt).await?;
    let mut analysis: JobAnalysis = parse_json_lenient(&raw)?;

    // Drop titles the model invented.
    analysis
        .relevant_entries
        .retain(|title| entries.iter().any(|e| e.title.eq_ignore_ascii_case(title.trim())));

    info!(
        "Job analysis for role '{}': {} relevant entries, {} talking points",
        request.role,
        analysis.relevant_entries.len(),
        analysis.talking_points.len()
    );
    Ok(analysis)
}

/// Short interview-prep paragraph for the achievement summary.
pub async fn prep_blurb(
    generator: &dyn TextGenerator,
    entries: &[JournalEntry],
) -> Result<PrepBlurb, AppError> {
    if entries.is_empty() {
        return Err(AppError::Validation(
            "No journal entries found. Add an achievement before preparing.".to_string(),
        ));
    }

    let prompt = PREP_BLURB_PROMPT_TEMPLATE.replace(
        "{entries}",
        &render_entries_for_prompt(entries, PREP_CONTEXT_ENTRIES),
    );
    let blurb = generator.complete(BRIDGET_SYSTEM, &prompt).await?;

    Ok(PrepBlurb {
        blurb: blurb.trim().to_string(),
        entry_count: entries.len(),
    })
}

fn non_empty_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    let value = value.trim();
    if value.is_empty() {
        fallback
    } else {
        value
    }
}
