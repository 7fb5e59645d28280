//! Bizline Server
//!
//! HTTP facade over the single-flight classifier: login, text submission,
//! feedback, taxonomy listing and admin access to the request logs.

#![warn(missing_docs)]

pub mod accounts;
pub mod config;
pub mod handlers;
pub mod session;

use axum::http::HeaderValue;
use axum::Router;
use bizline_llm::OpenAiProvider;
use bizline_store::{SqliteStore, StoreError};
use config::ServerConfig;
use handlers::{create_router, AppState};
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Server error
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Log store could not be opened
    #[error("Log store error: {0}")]
    Store(#[from] StoreError),

    /// Server binding error
    #[error("Failed to bind server: {0}")]
    Bind(#[from] std::io::Error),

    /// Server error
    #[error("Server error: {0}")]
    Server(String),
}

/// CORS policy allowing the configured origins with any method and header
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Build the full application: routes plus CORS and request tracing
pub fn build_app(config: &ServerConfig, provider: OpenAiProvider, store: SqliteStore) -> Router {
    let state = AppState::from_config(config, provider, store);
    if state.accounts.is_empty() {
        warn!("No accounts configured; every login will be rejected");
    } else {
        info!("Registered accounts: {}", state.accounts.len());
    }

    create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config.cors_origins))
}

/// Start the HTTP server
///
/// Opens the log store, builds the OpenAI backend and serves until the
/// process is stopped. Tracing must already be initialized.
pub async fn start_server(config: ServerConfig) -> Result<(), ServerError> {
    info!("Starting Bizline server");
    info!("Bind address: {}", config.bind_addr());
    info!("Token expiry: {} seconds", config.token_expiry_secs);
    info!("Log database: {}", config.database_path);

    let store = SqliteStore::new(&config.database_path)?;

    let provider = OpenAiProvider::with_timeout(
        config.openai.endpoint.clone(),
        config.openai.api_key.clone(),
        Duration::from_secs(config.openai.request_timeout_secs),
    )
    .with_max_retries(config.openai.max_retries);

    if config.openai.api_key.is_none() {
        warn!("No OpenAI API key configured; /label will answer 500 until one is set");
    }

    let app = build_app(&config, provider, store);

    let listener = TcpListener::bind(&config.bind_addr()).await?;
    info!("Server listening on {}", config.bind_addr());

    axum::serve(listener, app)
        .await
        .map_err(|e| ServerError::Server(e.to_string()))?;

    Ok(())
}
