//! mimird: the Mimir daemon.
//!
//! Serves the [`CodeAnalysisGateway`](mimir::CodeAnalysisGateway) over HTTP.

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use mimir::server::config::{Config, Secrets};
use mimir::server::{ServiceOptions, router};
use mimir::version::{PKG_VERSION, version_string};
use mimir::{CodeAnalysisGateway, FallbackOrchestrator, Mimir, MimirError, RetryConfig};

/// Mimir daemon: multi-provider AI code analysis service.
#[derive(Parser)]
#[command(name = "mimird")]
#[command(version = PKG_VERSION)]
#[command(about = "Mimir code analysis daemon")]
struct Args {
    /// Path to configuration file.
    #[arg(short, long, env = "MIMIR_CONFIG")]
    config: Option<std::path::PathBuf>,

    /// Override the bind address from config.
    #[arg(short, long)]
    address: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    // Load configuration
    let config = Config::load(args.config.as_deref())?;
    let secrets = Secrets::load()?;

    let gateway = build_gateway(&config, &secrets)?;
    let status = gateway.provider_status();
    if status.available_providers.is_empty() {
        warn!("no provider has an API key; every request will fail until one is configured");
    }

    let address = args.address.unwrap_or_else(|| config.server.address.clone());
    let addr: SocketAddr = address
        .parse()
        .map_err(|e| MimirError::Configuration(format!("Invalid address {address:?}: {e}")))?;

    let app = router(
        Arc::new(gateway),
        ServiceOptions {
            limits: config.server.limits.request,
            environment: config.server.environment,
            request_timeout: config.server.limits.request_timeout(),
            max_body_bytes: config.server.limits.max_body_bytes,
        },
    );

    let listener = TcpListener::bind(addr).await?;
    info!(
        version = version_string(),
        addr = %listener.local_addr()?,
        environment = ?config.server.environment,
        providers = ?status.available_providers,
        "mimird listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("mimird stopped");
    Ok(())
}

/// Build a [`FallbackOrchestrator`] from configuration.
///
/// All three adapters are always registered so `/providers` reports them;
/// one without a key is simply unavailable.
fn build_gateway(config: &Config, secrets: &Secrets) -> Result<FallbackOrchestrator, MimirError> {
    let providers = &config.providers;
    Mimir::builder()
        .gemini_with(
            secrets.api_key("gemini").unwrap_or_default(),
            providers.gemini.clone(),
        )
        .openai_with(
            secrets.api_key("openai").unwrap_or_default(),
            providers.openai.clone(),
        )
        .anthropic_with(
            secrets.api_key("anthropic").unwrap_or_default(),
            providers.anthropic.clone(),
        )
        .retry(RetryConfig::from(&config.retry))
        .timeout(config.server.limits.provider_timeout())
        .build()
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
