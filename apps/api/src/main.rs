mod coach;
mod config;
mod db;
mod enrichment;
mod errors;
mod interview;
mod journal;
mod llm_client;
mod models;
mod routes;
mod state;
mod stats;
mod users;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::journal::pg_store::PgEntryStore;
use crate::journal::repository::JournalRepository;
use crate::journal::store::{EntryStore, MemoryEntryStore};
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;
use crate::users::{MemoryUserStore, PgUserStore, UserStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Bridge It API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize storage: PostgreSQL when configured, in-memory otherwise
    let (entries, users): (Arc<dyn EntryStore>, Arc<dyn UserStore>) = match &config.database_url {
        Some(url) => {
            let db = create_pool(url).await?;
            (
                Arc::new(PgEntryStore::new(db.clone())),
                Arc::new(PgUserStore::new(db)),
            )
        }
        None => {
            warn!("DATABASE_URL not set; entries are kept in memory and lost on restart");
            (
                Arc::new(MemoryEntryStore::new()),
                Arc::new(MemoryUserStore::new()),
            )
        }
    };

    // Initialize LLM client
    let llm = LlmClient::new(&config)?;
    info!(
        "LLM client initialized (model: {}, attempts per call: {})",
        llm.model(),
        config.llm_max_attempts
    );

    let state = AppState {
        journal: JournalRepository::new(entries),
        users,
        llm: Arc::new(llm),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the mobile app's web build has a fixed host

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
