use std::process::ExitCode;

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use inquire::{Password, Select, Text};
use weather_core::{
    Config, SubmitOutcome, TransportMode, WeatherController, transport_from_config,
};

use crate::terminal::TerminalSink;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Weather CLI")]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure how lookups reach the weather provider.
    ///
    /// Anything not passed as a flag is asked for interactively.
    Configure {
        /// "gateway" (recommended) or "direct".
        #[arg(long)]
        transport: Option<String>,

        /// Gateway endpoint, e.g. https://xxxx.execute-api.eu-west-1.amazonaws.com/production/weather
        #[arg(long)]
        gateway_url: Option<String>,

        /// Provider API key, for the direct transport.
        #[arg(long)]
        api_key: Option<String>,

        /// Request timeout in seconds.
        #[arg(long)]
        timeout_secs: Option<u64>,
    },

    /// Show the current weather for a city.
    Show {
        /// City name, e.g. "London".
        city: String,

        /// Print the weather view as JSON.
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<ExitCode> {
        match self.command {
            Command::Configure { transport, gateway_url, api_key, timeout_secs } => {
                configure(transport, gateway_url, api_key, timeout_secs)?;
                Ok(ExitCode::SUCCESS)
            }
            Command::Show { city, json } => show(&city, json).await,
        }
    }
}

async fn show(city: &str, json: bool) -> anyhow::Result<ExitCode> {
    let config = Config::load_with_env()?;
    let transport = transport_from_config(&config)?;
    tracing::info!(transport = %config.transport, "looking up weather");

    let controller = WeatherController::new(transport, TerminalSink::new(json));

    match controller.submit(city).await {
        SubmitOutcome::Rendered(_) => Ok(ExitCode::SUCCESS),
        // The sink has already printed the message.
        SubmitOutcome::Rejected(_) | SubmitOutcome::Failed(_) | SubmitOutcome::Superseded => {
            Ok(ExitCode::FAILURE)
        }
    }
}

fn configure(
    transport: Option<String>,
    gateway_url: Option<String>,
    api_key: Option<String>,
    timeout_secs: Option<u64>,
) -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let mode = match transport {
        Some(value) => TransportMode::try_from(value.as_str())?,
        None => Select::new("How should lookups reach the provider?", TransportMode::all().to_vec())
            .with_starting_cursor(0)
            .prompt()
            .context("Transport selection cancelled")?,
    };
    config.transport = mode;

    match mode {
        TransportMode::Gateway => {
            let url = match gateway_url {
                Some(url) => url,
                None => Text::new("Gateway URL:")
                    .with_initial_value(config.gateway_url().unwrap_or_default())
                    .prompt()
                    .context("Gateway URL prompt cancelled")?,
            };
            let url = url.trim();
            if url.is_empty() {
                anyhow::bail!("Gateway URL must not be empty");
            }
            config.set_gateway_url(url.to_owned());
        }
        TransportMode::Direct => {
            let key = match api_key {
                Some(key) => key,
                None => Password::new("OpenWeatherMap API key:")
                    .without_confirmation()
                    .prompt()
                    .context("API key prompt cancelled")?,
            };
            let key = key.trim();
            if key.is_empty() {
                anyhow::bail!("API key must not be empty");
            }
            config.upsert_provider_api_key(key.to_owned());
        }
    }

    if let Some(secs) = timeout_secs {
        config.timeout_secs = secs;
    }

    config.save()?;
    println!(
        "Saved {} transport to {}",
        config.transport,
        Config::config_file_path()?.display()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_show_with_json_flag() {
        let cli = Cli::try_parse_from(["weather", "show", "New York", "--json"]).unwrap();
        match cli.command {
            Command::Show { city, json } => {
                assert_eq!(city, "New York");
                assert!(json);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn parses_configure_flags() {
        let cli = Cli::try_parse_from([
            "weather",
            "-vv",
            "configure",
            "--transport",
            "gateway",
            "--gateway-url",
            "https://gw.example/weather",
            "--timeout-secs",
            "5",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        match cli.command {
            Command::Configure { transport, gateway_url, api_key, timeout_secs } => {
                assert_eq!(transport.as_deref(), Some("gateway"));
                assert_eq!(gateway_url.as_deref(), Some("https://gw.example/weather"));
                assert_eq!(api_key, None);
                assert_eq!(timeout_secs, Some(5));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
