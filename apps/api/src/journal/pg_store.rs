use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::journal::models::{category_names, EntryPatch, JournalEntry, NewEntry};
use crate::journal::store::EntryStore;

/// PostgreSQL-backed entry store. One row per entry in `journal_entries`.
#[derive(Clone)]
pub struct PgEntryStore {
    pool: PgPool,
}

impl PgEntryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EntryStore for PgEntryStore {
    async fn create(&self, user_id: &str, entry: NewEntry) -> Result<JournalEntry, AppError> {
        let entry = entry.into_entry(user_id, Uuid::new_v4(), Utc::now());

        sqlx::query(
            r#"
            INSERT INTO journal_entries
                (id, user_id, title, content, summary, short_summary,
                 hard_skills, soft_skills, categories, reflection, achievement_type, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(entry.id)
        .bind(&entry.user_id)
        .bind(&entry.title)
        .bind(&entry.content)
        .bind(&entry.summary)
        .bind(&entry.short_summary)
        .bind(&entry.hard_skills)
        .bind(&entry.soft_skills)
        .bind(&entry.categories)
        .bind(&entry.reflection)
        .bind(&entry.achievement_type)
        .bind(entry.timestamp)
        .execute(&self.pool)
        .await?;

        info!("Inserted journal entry {} for user {user_id}", entry.id);
        Ok(entry)
    }

    async fn list(&self, user_id: &str) -> Result<Vec<JournalEntry>, AppError> {
        Ok(sqlx::query_as::<_, JournalEntry>(
            r#"
            SELECT id, user_id, title, content, summary, short_summary,
                   hard_skills, soft_skills, categories, reflection, achievement_type, created_at
            FROM journal_entries
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn update(
        &self,
        user_id: &str,
        entry_id: Uuid,
        patch: &EntryPatch,
    ) -> Result<JournalEntry, AppError> {
        let categories = patch.categories.as_deref().map(category_names);

        let updated = sqlx::query_as::<_, JournalEntry>(
            r#"
            UPDATE journal_entries SET
                title         = COALESCE($3, title),
                summary       = COALESCE($4, summary),
                short_summary = COALESCE($5, short_summary),
                hard_skills   = COALESCE($6, hard_skills),
                soft_skills   = COALESCE($7, soft_skills),
                reflection    = COALESCE($8, reflection),
                categories    = COALESCE($9, categories)
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, title, content, summary, short_summary,
                      hard_skills, soft_skills, categories, reflection, achievement_type, created_at
            "#,
        )
        .bind(entry_id)
        .bind(user_id)
        .bind(&patch.title)
        .bind(&patch.summary)
        .bind(&patch.short_summary)
        .bind(&patch.hard_skills)
        .bind(&patch.soft_skills)
        .bind(&patch.reflection)
        .bind(&categories)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Entry {entry_id} not found")))?;

        info!("Updated journal entry {entry_id} for user {user_id}");
        Ok(updated)
    }
}
