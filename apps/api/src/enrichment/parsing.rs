//! Normalizes the plain-text model replies into entry fields.

use tracing::warn;

use crate::journal::models::Category;

const BULLET: char = '•';

/// Splits bullet-delimited text into items, dropping blank segments.
pub fn parse_bullets(text: &str) -> Vec<String> {
    text.split(BULLET)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Strips any leading run of `.`, `•` or whitespace.
pub fn remove_leading_bullet_or_dot(s: &str) -> &str {
    s.trim_start_matches(|c: char| c == '.' || c == BULLET || c.is_whitespace())
}

/// Bullet list of skills, one clean name per item.
pub fn parse_skill_list(text: &str) -> Vec<String> {
    parse_bullets(text)
        .iter()
        .map(|item| remove_leading_bullet_or_dot(item).trim())
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect()
}

/// Comma or line separated categories. Labels outside the enumeration are
/// dropped; duplicates keep their first position.
pub fn parse_categories(text: &str) -> Vec<Category> {
    let mut categories = Vec::new();
    for raw in text.split([',', '\n']) {
        let label = remove_leading_bullet_or_dot(raw).trim().trim_end_matches('.');
        if label.is_empty() {
            continue;
        }
        match label.parse::<Category>() {
            Ok(c) if !categories.contains(&c) => categories.push(c),
            Ok(_) => {}
            Err(_) => warn!("Dropping category outside the fixed set: '{label}'"),
        }
    }
    categories
}

/// Cleans a reply that should be a single line (title, type, short summary).
pub fn parse_single_line(text: &str) -> String {
    let line = text
        .lines()
        .map(|l| remove_leading_bullet_or_dot(l).trim())
        .find(|l| !l.is_empty())
        .unwrap_or_default();
    line.trim_matches(|c| c == '"' || c == '\'' || c == '*')
        .trim()
        .to_string()
}

/// Trims a paragraph reply, dropping a leading bullet if the model added one.
pub fn parse_paragraph(text: &str) -> String {
    remove_leading_bullet_or_dot(text).trim().to_string()
}
