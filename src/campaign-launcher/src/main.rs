//! Campaign Launcher — authors campaigns, ad sets, creatives and ads on the
//! advertising platform's graph API.
//!
//! Main entry point that wires the platform client, credential provider and
//! synced-asset store into the REST server.

use campaign_api::{ApiServer, AppState};
use campaign_core::assets::InMemoryAssetStore;
use campaign_core::config::AppConfig;
use campaign_core::credential::{StaticCredentialProvider, TokenState};
use campaign_graph::GraphClient;
use clap::Parser;
use std::sync::Arc;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "campaign-launcher")]
#[command(about = "Campaign authoring service for the advertising graph API")]
#[command(version)]
struct Cli {
    /// HTTP port (overrides config)
    #[arg(long, env = "CAMPAIGN_LAUNCHER__API__HTTP_PORT")]
    http_port: Option<u16>,

    /// Graph API version, e.g. v24.0 (overrides config)
    #[arg(long, env = "CAMPAIGN_LAUNCHER__PLATFORM__API_VERSION")]
    api_version: Option<String>,

    /// Graph API base URL (overrides config)
    #[arg(long, env = "CAMPAIGN_LAUNCHER__PLATFORM__BASE_URL")]
    base_url: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "campaign_launcher=info,campaign_pipeline=info,campaign_graph=info,tower_http=info"
                    .into()
            }),
        )
        .json()
        .init();

    let cli = Cli::parse();

    info!("Campaign Launcher starting up");

    let mut config = AppConfig::load().unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        AppConfig::default()
    });

    // Apply CLI overrides
    if let Some(port) = cli.http_port {
        config.api.http_port = port;
    }
    if let Some(version) = cli.api_version {
        config.platform.api_version = version;
    }
    if let Some(base_url) = cli.base_url {
        config.platform.base_url = base_url;
    }

    info!(
        http_port = config.api.http_port,
        metrics_port = config.metrics.port,
        platform = %config.platform.versioned_base_url(),
        timeout_ms = config.platform.request_timeout_ms,
        "Configuration loaded"
    );

    let credentials = StaticCredentialProvider::from_config(&config.credential);
    let token = credentials.status();
    if token.status != TokenState::Active {
        warn!(status = ?token.status, "No usable access token configured; requests must send x-access-token");
    }

    let platform = Arc::new(GraphClient::new(&config.platform)?);
    let assets = InMemoryAssetStore::shared();
    let state = AppState::new(platform, assets, credentials, config.uploads.clone());

    let api_server = ApiServer::new(config.clone(), state);

    if let Err(e) = api_server.start_metrics() {
        error!(error = %e, "Failed to start metrics exporter");
    }

    info!("Campaign Launcher is ready to serve traffic");

    // Blocks until shutdown
    api_server.start_http().await?;

    Ok(())
}
