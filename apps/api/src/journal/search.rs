use serde::{Deserialize, Serialize};

use crate::journal::models::{Category, JournalEntry};

/// Keeps entries whose title or short summary contains `query`
/// (case-insensitive) and which carry `category`, if one is selected.
/// Input order is preserved.
pub fn filter_entries<'a>(
    entries: &'a [JournalEntry],
    query: &str,
    category: Option<Category>,
) -> Vec<&'a JournalEntry> {
    let needle = query.trim().to_lowercase();
    entries
        .iter()
        .filter(|e| matches_query(e, &needle) && matches_category(e, category))
        .collect()
}

/// `needle` must already be lower-cased. Empty matches everything.
fn matches_query(entry: &JournalEntry, needle: &str) -> bool {
    needle.is_empty()
        || entry.title.to_lowercase().contains(needle)
        || entry.short_summary.to_lowercase().contains(needle)
}

fn matches_category(entry: &JournalEntry, category: Option<Category>) -> bool {
    category.map_or(true, |c| entry.has_category(c))
}

/// Single-select category chip state. Selecting the active category clears it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryFilter {
    selected: Option<Category>,
}

impl CategoryFilter {
    pub fn selected(&self) -> Option<Category> {
        self.selected
    }

    pub fn toggle(&mut self, category: Category) {
        self.selected = if self.selected == Some(category) {
            None
        } else {
            Some(category)
        };
    }
}
