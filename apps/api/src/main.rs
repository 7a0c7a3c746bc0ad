mod config;
mod cors;
mod errors;
mod llm_client;
mod routes;
mod state;
mod summary;

use anyhow::Result;
use std::net::SocketAddr;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={},tower_http={}",
                env!("CARGO_CRATE_NAME"),
                &config.rust_log,
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting AI Summary API v{}", env!("CARGO_PKG_VERSION"));

    let llm = LlmClient::new(
        &config.ai_base_url,
        &config.ai_api_key,
        config.ai_max_tokens,
        config.ai_timeout,
    )?;
    info!(
        "LLM client initialized (base_url: {}, model: {}, fallback: {}, timeout: {}ms)",
        config.ai_base_url,
        config.ai_model,
        config.ai_fallback_model.as_deref().unwrap_or("(none)"),
        llm.timeout().as_millis()
    );
    info!("CORS allowed origins: {:?}", config.allowed_origins);

    let state = AppState {
        llm,
        config: config.clone(),
    };

    let app = build_router(state).layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
