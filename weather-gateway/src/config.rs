use std::{net::SocketAddr, time::Duration};

use anyhow::Context;
use clap::{ArgAction, Parser};
use weather_core::{
    ProviderTransport,
    config::{DEFAULT_PROVIDER_URL, DEFAULT_TIMEOUT_SECS, ENV_API_KEY},
};

use crate::AppState;

/// Gateway settings. The provider key is read from `OPENWEATHERMAP_API_KEY` only.
#[derive(Debug, Parser)]
#[command(name = "weather-gateway", version, about = "Weather lookup gateway")]
pub struct GatewayArgs {
    /// Address to listen on.
    #[arg(long, env = "WEATHER_GATEWAY_LISTEN", default_value = "127.0.0.1:8080")]
    pub listen: SocketAddr,

    /// Provider current-weather endpoint.
    #[arg(long, env = "OPENWEATHERMAP_BASE_URL", default_value = DEFAULT_PROVIDER_URL)]
    pub provider_url: String,

    /// Hard timeout for each provider call, in seconds.
    #[arg(long, env = "WEATHER_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// Increase log verbosity (-v debug, -vv trace). `RUST_LOG` takes precedence.
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl GatewayArgs {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Build the shared state. A missing or blank key leaves the gateway unconfigured.
    pub fn state(&self, api_key: Option<String>) -> anyhow::Result<AppState> {
        let Some(api_key) = api_key.filter(|k| !k.trim().is_empty()) else {
            tracing::warn!("{ENV_API_KEY} is not set; lookups will fail with 500");
            return Ok(AppState::new(None));
        };

        let provider = ProviderTransport::new(&self.provider_url, &api_key, self.timeout())
            .context("Failed to build provider HTTP client")?;

        Ok(AppState::new(Some(provider)))
    }
}

pub fn api_key_from_env() -> Option<String> {
    std::env::var(ENV_API_KEY).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let args = GatewayArgs::try_parse_from(["weather-gateway"]).unwrap();
        assert_eq!(args.listen, "127.0.0.1:8080".parse::<SocketAddr>().unwrap());
        assert_eq!(args.provider_url, DEFAULT_PROVIDER_URL);
        assert_eq!(args.timeout(), Duration::from_secs(10));
    }

    #[test]
    fn flags_override_defaults() {
        let args = GatewayArgs::try_parse_from([
            "weather-gateway",
            "--listen",
            "0.0.0.0:9000",
            "--provider-url",
            "http://localhost:1234/weather",
            "--timeout-secs",
            "3",
            "-vv",
        ])
        .unwrap();

        assert_eq!(args.listen.port(), 9000);
        assert_eq!(args.provider_url, "http://localhost:1234/weather");
        assert_eq!(args.timeout_secs, 3);
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn blank_key_leaves_gateway_unconfigured() {
        let args = GatewayArgs::try_parse_from(["weather-gateway"]).unwrap();
        assert!(!args.state(None).unwrap().is_configured());
        assert!(!args.state(Some("  ".into())).unwrap().is_configured());
        assert!(args.state(Some("KEY".into())).unwrap().is_configured());
    }
}
