//! User profiles. Identity comes from the auth provider; this module only
//! keeps the profile record written at sign-in.

pub mod handlers;

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tokio::sync::RwLock;
use tracing::info;

use crate::errors::AppError;
use crate::models::user::{SignInRequest, UserProfile};

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Creates or refreshes the profile; `created_at` survives re-sign-in.
    async fn upsert(&self, request: &SignInRequest) -> Result<UserProfile, AppError>;

    async fn get(&self, user_id: &str) -> Result<Option<UserProfile>, AppError>;
}

/// Validates and records a sign-in.
pub async fn sign_in(store: &dyn UserStore, request: SignInRequest) -> Result<UserProfile, AppError> {
    if request.user_id.trim().is_empty() {
        return Err(AppError::Validation("user_id cannot be empty".to_string()));
    }
    if !request.email.contains('@') {
        return Err(AppError::Validation(format!(
            "'{}' is not a valid email address",
            request.email
        )));
    }
    let profile = store.upsert(&request).await?;
    info!("User {} signed in", profile.user_id);
    Ok(profile)
}

#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<String, UserProfile>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn upsert(&self, request: &SignInRequest) -> Result<UserProfile, AppError> {
        let now = Utc::now();
        let mut users = self.users.write().await;
        let created_at = users
            .get(&request.user_id)
            .map(|p| p.created_at)
            .unwrap_or(now);
        let profile = UserProfile {
            user_id: request.user_id.clone(),
            display_name: request.display_name.clone(),
            email: request.email.clone(),
            photo_url: request.photo_url.clone(),
            created_at,
            updated_at: now,
        };
        users.insert(profile.user_id.clone(), profile.clone());
        Ok(profile)
    }

    async fn get(&self, user_id: &str) -> Result<Option<UserProfile>, AppError> {
        Ok(self.users.read().await.get(user_id).cloned())
    }
}

#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn upsert(&self, request: &SignInRequest) -> Result<UserProfile, AppError> {
        Ok(sqlx::query_as::<_, UserProfile>(
            r#"
            INSERT INTO users (user_id, display_name, email, photo_url)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id) DO UPDATE SET
                display_name = EXCLUDED.display_name,
                email        = EXCLUDED.email,
                photo_url    = EXCLUDED.photo_url,
                updated_at   = NOW()
            RETURNING user_id, display_name, email, photo_url, created_at, updated_at
            "#,
        )
        .bind(&request.user_id)
        .bind(&request.display_name)
        .bind(&request.email)
        .bind(&request.photo_url)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn get(&self, user_id: &str) -> Result<Option<UserProfile>, AppError> {
        Ok(sqlx::query_as::<_, UserProfile>(
            "SELECT user_id, display_name, email, photo_url, created_at, updated_at FROM users WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?)
    }
}
