//! Binary crate for the `weather-gateway` service.

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use weather_gateway::config::{GatewayArgs, api_key_from_env};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = GatewayArgs::parse();

    let default_level = match args.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let state = args.state(api_key_from_env())?;

    let listener = tokio::net::TcpListener::bind(args.listen)
        .await
        .with_context(|| format!("Failed to bind {}", args.listen))?;

    tracing::info!(
        listen = %args.listen,
        provider = %args.provider_url,
        timeout_secs = args.timeout_secs,
        "weather gateway listening"
    );

    axum::serve(listener, weather_gateway::router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutting down");
        })
        .await
        .context("Gateway server failed")
}
