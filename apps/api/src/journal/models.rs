use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Fixed category enumeration. Serialized lower-case, parsed case-insensitively
/// (including when deserialized from request bodies and query strings).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Academic,
    Personal,
    Leadership,
    Research,
    Project,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Academic,
        Category::Personal,
        Category::Leadership,
        Category::Research,
        Category::Project,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Academic => "academic",
            Category::Personal => "personal",
            Category::Leadership => "leadership",
            Category::Research => "research",
            Category::Project => "project",
        }
    }

    /// Display label used in prompts.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Academic => "Academic",
            Category::Personal => "Personal",
            Category::Leadership => "Leadership",
            Category::Research => "Research",
            Category::Project => "Project",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| format!("unknown category '{needle}'"))
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

/// How the entry text was captured. Only text and transcribed voice are supported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureSource {
    #[default]
    Text,
    Voice,
    Camera,
    Upload,
}

impl CaptureSource {
    pub fn is_supported(&self) -> bool {
        matches!(self, CaptureSource::Text | CaptureSource::Voice)
    }
}

/// A single user-authored achievement enriched with AI-derived metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct JournalEntry {
    pub id: Uuid,
    pub user_id: String,
    pub title: String,
    pub content: String,
    pub summary: Vec<String>,
    pub short_summary: String,
    pub hard_skills: Vec<String>,
    pub soft_skills: Vec<String>,
    /// Lower-cased `Category` names.
    pub categories: Vec<String>,
    pub reflection: String,
    pub achievement_type: String,
    #[sqlx(rename = "created_at")]
    pub timestamp: DateTime<Utc>,
}

impl JournalEntry {
    pub fn has_category(&self, category: Category) -> bool {
        self.categories
            .iter()
            .any(|c| c.eq_ignore_ascii_case(category.as_str()))
    }
}

/// Fields submitted on creation. `id` and `timestamp` are assigned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewEntry {
    pub title: String,
    pub content: String,
    pub summary: Vec<String>,
    pub short_summary: String,
    pub hard_skills: Vec<String>,
    pub soft_skills: Vec<String>,
    pub categories: Vec<Category>,
    pub reflection: String,
    pub achievement_type: String,
}

impl NewEntry {
    /// Materializes the entry with server-assigned fields.
    pub fn into_entry(self, user_id: &str, id: Uuid, timestamp: DateTime<Utc>) -> JournalEntry {
        JournalEntry {
            id,
            user_id: user_id.to_string(),
            title: self.title,
            content: self.content,
            summary: self.summary,
            short_summary: self.short_summary,
            hard_skills: self.hard_skills,
            soft_skills: self.soft_skills,
            categories: category_names(&self.categories),
            reflection: self.reflection,
            achievement_type: self.achievement_type,
            timestamp,
        }
    }
}

/// Partial update from the detail/edit flow. `content` and `timestamp` are not editable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EntryPatch {
    pub title: Option<String>,
    pub summary: Option<Vec<String>>,
    pub short_summary: Option<String>,
    pub hard_skills: Option<Vec<String>>,
    pub soft_skills: Option<Vec<String>>,
    pub reflection: Option<String>,
    pub categories: Option<Vec<Category>>,
}

impl EntryPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.summary.is_none()
            && self.short_summary.is_none()
            && self.hard_skills.is_none()
            && self.soft_skills.is_none()
            && self.reflection.is_none()
            && self.categories.is_none()
    }

    /// Overwrites only the fields present in the patch.
    pub fn apply_to(&self, entry: &mut JournalEntry) {
        if let Some(title) = &self.title {
            entry.title = title.clone();
        }
        if let Some(summary) = &self.summary {
            entry.summary = summary.clone();
        }
        if let Some(short_summary) = &self.short_summary {
            entry.short_summary = short_summary.clone();
        }
        if let Some(hard_skills) = &self.hard_skills {
            entry.hard_skills = hard_skills.clone();
        }
        if let Some(soft_skills) = &self.soft_skills {
            entry.soft_skills = soft_skills.clone();
        }
        if let Some(reflection) = &self.reflection {
            entry.reflection = reflection.clone();
        }
        if let Some(categories) = &self.categories {
            entry.categories = category_names(categories);
        }
    }
}

pub fn category_names(categories: &[Category]) -> Vec<String> {
    categories.iter().map(|c| c.as_str().to_string()).collect()
}
