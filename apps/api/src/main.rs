mod analysis;
mod archive;
mod auth;
mod config;
mod db;
mod errors;
mod matching;
mod models;
mod routes;
mod state;
mod store;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::Semaphore;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::vocabulary::Lexicon;
use crate::archive::UploadArchive;
use crate::config::Config;
use crate::db::create_pool;
use crate::matching::matcher::SkillOverlapScorer;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::{MemoryStore, PgStore, Store};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting resume engine v{}", env!("CARGO_PKG_VERSION"));

    let lexicon = Lexicon::load(config.vocabulary_path.as_deref())
        .context("failed to load skill vocabulary")?;
    info!(
        "Vocabulary {} loaded ({} skills)",
        lexicon.version(),
        lexicon.skill_count()
    );

    let store: Arc<dyn Store> = match &config.database_url {
        Some(url) => Arc::new(PgStore::new(create_pool(url).await?)),
        None => {
            warn!("DATABASE_URL not set; using the in-memory store (data is lost on restart)");
            Arc::new(MemoryStore::new())
        }
    };

    let archive = match &config.s3 {
        Some(settings) => {
            let archive = UploadArchive::from_settings(settings).await;
            info!("Upload archive enabled (bucket: {})", archive.bucket());
            Some(archive)
        }
        None => {
            info!("Upload archive disabled");
            None
        }
    };

    let state = AppState {
        store,
        lexicon: Arc::new(lexicon),
        match_scorer: Arc::new(SkillOverlapScorer),
        archive,
        parse_slots: Arc::new(Semaphore::new(config.max_concurrent_parses)),
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
