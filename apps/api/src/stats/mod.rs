//! Aggregation: trophy tier, skill radar and per-category counts for the
//! achievement summary.

pub mod handlers;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::journal::models::{Category, JournalEntry};

const TOP_SKILLS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrophyTier {
    Bronze,
    Silver,
    Gold,
}

/// Maps an entry count to a tier.
///
/// NOTE: exactly 10 entries falls through both named ranges and lands on
/// Gold. Kept as-is until the intended boundary is confirmed.
pub fn trophy_tier(entry_count: usize) -> TrophyTier {
    if entry_count < 10 {
        TrophyTier::Bronze
    } else if entry_count > 10 && entry_count < 30 {
        TrophyTier::Silver
    } else {
        TrophyTier::Gold
    }
}

/// Five-axis skill radar, values 0–100.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillRadar {
    pub communication: u8,
    pub leadership: u8,
    pub teamwork: u8,
    pub technical: u8,
    pub problem_solving: u8,
}

impl Default for SkillRadar {
    /// Static chart values; not derived from entry content.
    fn default() -> Self {
        Self {
            communication: 80,
            leadership: 65,
            teamwork: 90,
            technical: 75,
            problem_solving: 85,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub category: Category,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillCount {
    pub skill: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsReport {
    pub entry_count: usize,
    pub tier: TrophyTier,
    pub radar: SkillRadar,
    pub categories: Vec<CategoryCount>,
    pub top_hard_skills: Vec<SkillCount>,
    pub top_soft_skills: Vec<SkillCount>,
}

pub fn compute_stats(entries: &[JournalEntry]) -> StatsReport {
    let categories = Category::ALL
        .into_iter()
        .map(|category| CategoryCount {
            category,
            count: entries.iter().filter(|e| e.has_category(category)).count(),
        })
        .collect();

    StatsReport {
        entry_count: entries.len(),
        tier: trophy_tier(entries.len()),
        radar: SkillRadar::default(),
        categories,
        top_hard_skills: top_skills(entries.iter().flat_map(|e| e.hard_skills.iter())),
        top_soft_skills: top_skills(entries.iter().flat_map(|e| e.soft_skills.iter())),
    }
}

/// Most frequent skills, case-insensitive, keeping the first spelling seen.
/// Ties are ordered alphabetically.
fn top_skills<'a>(skills: impl Iterator<Item = &'a String>) -> Vec<SkillCount> {
    let mut counts: HashMap<String, SkillCount> = HashMap::new();
    for skill in skills {
        let key = skill.trim().to_lowercase();
        if key.is_empty() {
            continue;
        }
        counts
            .entry(key)
            .or_insert_with(|| SkillCount {
                skill: skill.trim().to_string(),
                count: 0,
            })
            .count += 1;
    }
    let mut ranked: Vec<SkillCount> = counts.into_values().collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.skill.cmp(&b.skill)));
    ranked.truncate(TOP_SKILLS);
    ranked
}
