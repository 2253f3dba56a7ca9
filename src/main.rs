// This is the entry point of the VX site backend.
//
// **Architecture Overview:**
// - `core/` = Business logic (contacts, OAuth token lifecycle)
// - `infra/` = Implementations of core traits (SQLite, Google APIs)
// - `web/` = HTTP adapters (routes, shared state)
//
// This file's job is to:
// 1. Load configuration
// 2. Initialize services (dependency injection)
// 3. Serve the site until Ctrl+C

// These attrs point each module declaration at a more descriptive root file
// so we don't end up with half a dozen mod.rs files that all look the same.
#[path = "core/core_layer.rs"]
mod core;
#[path = "infra/infra_layer.rs"]
mod infra;
#[path = "web/web_layer.rs"]
mod web;

mod config;

use crate::config::SiteConfig;
use crate::core::contact::{
    ContactMirror, ContactService, ContactStore, DisabledMirror, SheetMirror,
};
use crate::core::oauth::{AuthorizationProvider, TokenManager};
use crate::infra::contacts::SqliteContactStore;
use crate::infra::google::{GoogleOAuthClient, GoogleSheetsClient};
use crate::web::AppState;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging so we can see what's happening
    tracing_subscriber::fmt::init();

    // Load environment variables from .env file (if it exists)
    dotenv::dotenv().ok();

    let config = SiteConfig::from_env()?;

    // ========================================================================
    // DEPENDENCY INJECTION
    // ========================================================================

    let store: Box<dyn ContactStore> =
        Box::new(SqliteContactStore::new(&config.database_url).await?);
    tracing::info!("Contact store ready at {}", config.database_url);

    // Nothing is authorized at startup; the site owner has to visit
    // /api/auth/google once per process.
    let (tokens, mirror) = match config.google.clone() {
        Some(google) => {
            let provider: Box<dyn AuthorizationProvider> =
                Box::new(GoogleOAuthClient::new(google, config.google_http_timeout)?);
            let tokens = Arc::new(TokenManager::new(provider));

            let sheets = GoogleSheetsClient::new(config.google_http_timeout)?;
            let mirror: Box<dyn ContactMirror> = Box::new(SheetMirror::new(
                sheets,
                Arc::clone(&tokens),
                config.sheet.clone(),
            ));
            (Some(tokens), mirror)
        }
        None => (None, Box::new(DisabledMirror) as Box<dyn ContactMirror>),
    };
    let contacts = Arc::new(ContactService::new(store, mirror));

    let mirror_enabled = tokens.is_some();
    let state = AppState::new(contacts, tokens, config.site_dir.clone());
    let app = web::router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);
    if mirror_enabled {
        tracing::info!("Visit /api/auth/google to authorize the spreadsheet mirror");
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
