//! Voicebot application binary - composition root.
//!
//! 1. Parse CLI arguments and load configuration from TOML
//! 2. Build the session collaborators (voice platform, chat client, data
//!    sources, renderers, artifact sink)
//! 3. Start the metrics refresh loop
//! 4. Serve the local API until Ctrl-C

mod cli;

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use voicebot_api::{create_router, AppState};
use voicebot_chat::{ChatClient, HttpChatClient};
use voicebot_core::VoicebotConfig;
use voicebot_insight::{
    DataSource, FileArtifactSink, HttpDataSource, JsonDocumentRenderer, OfflineSource,
    SvgChartRenderer,
};
use voicebot_session::{Collaborators, SessionController};
use voicebot_voice::{DelegatedPlatform, NullPlatform, VoicePlatform};

use cli::CliArgs;

fn build_collaborators(
    config: &VoicebotConfig,
    args: &CliArgs,
) -> Collaborators {
    let timeout = Duration::from_secs(config.chat.timeout_secs);

    let platform: Arc<dyn VoicePlatform> = if args.text_only {
        tracing::info!("Voice capture disabled, typed input only");
        Arc::new(NullPlatform)
    } else {
        Arc::new(DelegatedPlatform)
    };

    let chat: Option<Arc<dyn ChatClient>> = match config.chat.endpoint.as_deref() {
        Some(endpoint) => match HttpChatClient::new(endpoint, timeout) {
            Ok(client) => {
                tracing::info!(endpoint, "Chat service configured");
                Some(Arc::new(client))
            }
            Err(e) => {
                tracing::warn!(error = %e, "Chat client unavailable, replies will use the local fallback");
                None
            }
        },
        None => {
            tracing::info!("No chat endpoint configured, replies will use the local fallback");
            None
        }
    };

    let data: Arc<dyn DataSource> = match HttpDataSource::new(timeout) {
        Ok(source) => Arc::new(
            source
                .with_metrics_url(config.metrics.metrics_url.clone())
                .with_customers_url(config.metrics.customers_url.clone())
                .with_inventory_url(config.metrics.inventory_url.clone()),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "Data source unavailable, using mock data");
            Arc::new(OfflineSource)
        }
    };

    let output_dir = args.resolve_output_dir(&config.general.output_dir);
    tracing::info!(dir = %output_dir.display(), "Artifacts will be written here");

    Collaborators {
        platform,
        chat,
        data,
        charts: Arc::new(SvgChartRenderer::default()),
        documents: Arc::new(JsonDocumentRenderer),
        artifacts: Arc::new(FileArtifactSink::new(output_dir)),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown requested");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    let config_file = args.resolve_config_path();
    let config = VoicebotConfig::load_or_default(&config_file);

    let log_level = args.resolve_log_level(&config.general.log_level);
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level)),
        )
        .init();

    tracing::info!("Starting Voicebot v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(path = %config_file.display(), "Configuration loaded");

    let collaborators = build_collaborators(&config, &args);
    let session = Arc::new(SessionController::new(&config, collaborators)?);

    if session.start_refresh_loop().is_none() {
        tracing::warn!("Metrics refresh loop was already running");
    }

    let port = args.resolve_port(config.api.port);
    let addr = format!("127.0.0.1:{}", port);
    let router = create_router(AppState::new(Arc::clone(&session), port));

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!(addr = %addr, error = %e, "Failed to bind, is another instance running?");
            tracing::error!("Try: voicebot --port {}", port.saturating_add(1));
            return Err(e.into());
        }
    };

    tracing::info!(addr = %addr, "API server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    session.shutdown().await;
    Ok(())
}
