//! Lyrics bot - Telegram bot that fetches song lyrics
//!
//! Collects an author and a title from each chat, asks a lyrics provider
//! for the song and replies with the text.

mod api;
mod config;
mod db;
mod lyrics;
mod polling;
mod runtime;
mod state_machine;
mod telegram;

use api::{create_router, AppState};
use config::{BotConfig, RunMode};
use db::Database;
use lyrics::{LoggingProvider, LyricsOvhClient};
use polling::Poller;
use reqwest::Url;
use runtime::{ConversationService, DatabaseStorage, ProductionService, UpdateDispatcher};
use std::net::SocketAddr;
use std::sync::Arc;
use telegram::TelegramClient;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lyrics_bot=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    let config = BotConfig::from_env()?;

    // Ensure database directory exists
    if let Some(parent) = config.db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    tracing::info!(path = %config.db_path.display(), "Opening database");
    let db = Database::open(&config.db_path)?;

    let lyrics_url = Url::parse(&config.lyrics_api_url)?;
    tracing::info!(url = %lyrics_url, timeout = ?config.lyrics_timeout, "Lyrics provider configured");
    let lyrics = LoggingProvider::new(Arc::new(LyricsOvhClient::new(
        lyrics_url,
        config.lyrics_timeout,
    )?));

    let telegram = TelegramClient::new(&config.token)?;
    let service: Arc<ProductionService> = Arc::new(ConversationService::new(
        DatabaseStorage::new(db),
        lyrics,
        telegram.clone(),
    ));
    let dispatcher: Arc<dyn UpdateDispatcher> = service;

    let shutdown = CancellationToken::new();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for shutdown signal");
                return;
            }
            tracing::info!("Shutdown requested");
            shutdown.cancel();
        }
    });

    match config.mode {
        RunMode::Webhook { base_url } => {
            let state = AppState::new(dispatcher, telegram, &config.token, &base_url);
            let app = create_router(state);

            let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
            tracing::info!("Lyrics bot listening on {}", addr);

            let listener = tokio::net::TcpListener::bind(addr).await?;
            axum::serve(listener, app)
                .with_graceful_shutdown(async move { shutdown.cancelled().await })
                .await?;
        }
        RunMode::Polling => {
            Poller::new(telegram, dispatcher).run(shutdown).await;
        }
    }

    Ok(())
}
