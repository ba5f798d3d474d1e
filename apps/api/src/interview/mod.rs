// Interview preparation: job analysis and the prep blurb.
// All LLM calls go through the TextGenerator seam.

pub mod analysis;
pub mod handlers;
pub mod prompts;

use crate::journal::models::JournalEntry;

/// Renders up to `limit` entries as prompt lines: `- title | short summary | skills`.
pub fn render_entries_for_prompt(entries: &[JournalEntry], limit: usize) -> String {
    if entries.is_empty() {
        return "(no achievements recorded yet)".to_string();
    }
    entries
        .iter()
        .take(limit)
        .map(|e| {
            let skills = e
                .hard_skills
                .iter()
                .chain(e.soft_skills.iter())
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(", ");
            format!("- {} | {} | {}", e.title, e.short_summary, skills)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;
    use crate::journal::store::tests::new_entry;

    #[test]
    fn test_render_entries_respects_limit() {
        let entries: Vec<_> = ["a", "b", "c"]
            .iter()
            .map(|t| new_entry(t).into_entry("u1", Uuid::new_v4(), Utc::now()))
            .collect();
        let rendered = render_entries_for_prompt(&entries, 2);
        assert_eq!(rendered.lines().count(), 2);
        assert_eq!(rendered.lines().next(), Some("- a | I did a. | Rust, Teamwork"));
    }

    #[test]
    fn test_render_no_entries() {
        assert_eq!(
            render_entries_for_prompt(&[], 10),
            "(no achievements recorded yet)"
        );
    }
}
