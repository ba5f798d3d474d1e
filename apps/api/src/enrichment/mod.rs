//! AI Enrichment: derives title, summaries, skills, categories and a
//! reflection from raw entry text.
//!
//! Eight independent prompts run concurrently; the operation succeeds only
//! when all of them do. No retries and no caching at this layer.

pub mod parsing;
pub mod prompts;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::journal::models::{Category, NewEntry};
use crate::llm_client::prompts::{
    BRIDGET_SYSTEM, BULLET_FORMAT_INSTRUCTION, SINGLE_LINE_INSTRUCTION,
};
use crate::llm_client::TextGenerator;

use parsing::{parse_bullets, parse_categories, parse_paragraph, parse_single_line, parse_skill_list};
use prompts::{
    CATEGORIES_PROMPT, HARD_SKILLS_PROMPT, REFLECTION_PROMPT, SHORT_SUMMARY_PROMPT,
    SOFT_SKILLS_PROMPT, SUMMARY_PROMPT, TITLE_PROMPT, TYPE_PROMPT,
};

/// Aggregate result of all enrichment prompts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enrichment {
    pub achievement_type: String,
    pub title: String,
    pub summary: Vec<String>,
    pub hard_skills: Vec<String>,
    pub soft_skills: Vec<String>,
    pub reflection: String,
    pub categories: Vec<Category>,
    pub short_summary: String,
}

impl Enrichment {
    /// Combines the enrichment with the source text into a storable entry.
    pub fn into_new_entry(self, content: String) -> NewEntry {
        NewEntry {
            title: self.title,
            content,
            summary: self.summary,
            short_summary: self.short_summary,
            hard_skills: self.hard_skills,
            soft_skills: self.soft_skills,
            categories: self.categories,
            reflection: self.reflection,
            achievement_type: self.achievement_type,
        }
    }
}

/// Runs every enrichment prompt for `text` and parses the replies.
pub async fn enrich(generator: &dyn TextGenerator, text: &str) -> Result<Enrichment, AppError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(AppError::Validation("content cannot be empty".to_string()));
    }

    let category_labels = Category::ALL
        .iter()
        .map(Category::label)
        .collect::<Vec<_>>()
        .join(", ");

    let fill = |template: &str| template.replace("{text}", text);
    let single = |template: &str| format!("{}\n\n{}", fill(template), SINGLE_LINE_INSTRUCTION);
    let bullets = |template: &str| format!("{}\n\n{}", fill(template), BULLET_FORMAT_INSTRUCTION);

    let type_prompt = single(TYPE_PROMPT);
    let title_prompt = single(TITLE_PROMPT);
    let summary_prompt = bullets(SUMMARY_PROMPT);
    let hard_prompt = bullets(HARD_SKILLS_PROMPT);
    let soft_prompt = bullets(SOFT_SKILLS_PROMPT);
    let reflection_prompt = fill(REFLECTION_PROMPT);
    let categories_prompt = fill(CATEGORIES_PROMPT).replace("{categories}", &category_labels);
    let short_prompt = single(SHORT_SUMMARY_PROMPT);

    let (achievement_type, title, summary, hard, soft, reflection, categories, short_summary) =
        tokio::try_join!(
            generator.complete(BRIDGET_SYSTEM, &type_prompt),
            generator.complete(BRIDGET_SYSTEM, &title_prompt),
            generator.complete(BRIDGET_SYSTEM, &summary_prompt),
            generator.complete(BRIDGET_SYSTEM, &hard_prompt),
            generator.complete(BRIDGET_SYSTEM, &soft_prompt),
            generator.complete(BRIDGET_SYSTEM, &reflection_prompt),
            generator.complete(BRIDGET_SYSTEM, &categories_prompt),
            generator.complete(BRIDGET_SYSTEM, &short_prompt),
        )?;

    let enrichment = Enrichment {
        achievement_type: parse_single_line(&achievement_type),
        title: parse_single_line(&title),
        summary: parse_bullets(&summary),
        hard_skills: parse_skill_list(&hard),
        soft_skills: parse_skill_list(&soft),
        reflection: parse_paragraph(&reflection),
        categories: parse_categories(&categories),
        short_summary: parse_single_line(&short_summary),
    };

    info!(
        "Enriched entry: title='{}', {} categories, {} hard / {} soft skills",
        enrichment.title,
        enrichment.categories.len(),
        enrichment.hard_skills.len(),
        enrichment.soft_skills.len()
    );

    Ok(enrichment)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::llm_client::testing::{FailingGenerator, StubGenerator};

    /// Stub that answers each enrichment prompt with a plausible reply.
    pub(crate) fn enrichment_stub() -> StubGenerator {
        StubGenerator::new("unexpected prompt")
            .with_rule("Classify the type", "Team leadership")
            .with_rule("Write a short, specific title", "\"Team Feature Launch\"")
            .with_rule(
                "Summarize the achievement described below in two to four",
                "• Led a team of five engineers\n• Shipped a feature on schedule",
            )
            .with_rule("hard (technical", "• Project planning\n• Git\n")
            .with_rule("soft (interpersonal", "• Leadership\n• Communication")
            .with_rule(
                "Write one paragraph",
                "When my team needed direction, I stepped up and coordinated the work.",
            )
            .with_rule("Choose the categories", "Leadership, Project, Sports")
            .with_rule(
                "exactly one sentence",
                "I led a team of five to ship a feature.",
            )
    }

    #[tokio::test]
    async fn test_enrich_aggregates_all_fields() {
        let stub = enrichment_stub();
        let enrichment = enrich(&stub, "Led a team of 5 to ship a feature")
            .await
            .unwrap();

        assert_eq!(stub.calls(), 8);
        assert_eq!(enrichment.achievement_type, "Team leadership");
        assert_eq!(enrichment.title, "Team Feature Launch");
        assert_eq!(
            enrichment.summary,
            vec!["Led a team of five engineers", "Shipped a feature on schedule"]
        );
        assert_eq!(enrichment.hard_skills, vec!["Project planning", "Git"]);
        assert_eq!(enrichment.soft_skills, vec!["Leadership", "Communication"]);
        assert_eq!(
            enrichment.categories,
            vec![Category::Leadership, Category::Project]
        );
        assert!(enrichment.reflection.starts_with("When my team"));
        assert_eq!(enrichment.short_summary, "I led a team of five to ship a feature.");
    }

    #[tokio::test]
    async fn test_enrich_uses_bridget_system_instruction() {
        let stub = enrichment_stub();
        enrich(&stub, "Published a paper").await.unwrap();
        let system = stub.last_system.lock().unwrap().clone().unwrap();
        assert!(system.contains("Bridget"));
    }

    #[tokio::test]
    async fn test_enrich_rejects_blank_text_without_calling_model() {
        let stub = enrichment_stub();
        let err = enrich(&stub, "   \n").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(stub.calls(), 0);
    }

    #[tokio::test]
    async fn test_enrich_propagates_model_failure() {
        let err = enrich(&FailingGenerator, "Won a hackathon").await.unwrap_err();
        assert!(matches!(err, AppError::Llm(_)));
    }

    #[tokio::test]
    async fn test_identical_text_reissues_prompts() {
        let stub = enrichment_stub();
        enrich(&stub, "Same text").await.unwrap();
        enrich(&stub, "Same text").await.unwrap();
        assert_eq!(stub.calls(), 16);
    }

    #[test]
    fn test_into_new_entry_keeps_content() {
        let enrichment = Enrichment {
            achievement_type: "Award".into(),
            title: "Dean's List".into(),
            summary: vec![],
            hard_skills: vec![],
            soft_skills: vec![],
            reflection: String::new(),
            categories: vec![Category::Academic],
            short_summary: "I made the Dean's list.".into(),
        };
        let entry = enrichment.into_new_entry("Made the dean's list".into());
        assert_eq!(entry.content, "Made the dean's list");
        assert_eq!(entry.title, "Dean's List");
        assert_eq!(entry.categories, vec![Category::Academic]);
    }
}
