use crate::{
    Config,
    classify::{Failure, classify},
    model::WeatherQuery,
    transport::{gateway::GatewayTransport, provider::ProviderTransport},
};
use async_trait::async_trait;
use reqwest::RequestBuilder;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{fmt::Debug, time::Duration};

pub mod gateway;
pub mod provider;

/// How lookups reach the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportMode {
    /// Through the gateway function, which holds the provider key.
    #[default]
    Gateway,
    /// Straight to the provider with a locally held key.
    Direct,
}

impl TransportMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportMode::Gateway => "gateway",
            TransportMode::Direct => "direct",
        }
    }

    pub const fn all() -> &'static [TransportMode] {
        &[TransportMode::Gateway, TransportMode::Direct]
    }
}

impl std::fmt::Display for TransportMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TransportMode {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "gateway" => Ok(TransportMode::Gateway),
            "direct" => Ok(TransportMode::Direct),
            _ => Err(anyhow::anyhow!(
                "Unknown transport '{value}'. Supported transports: gateway, direct."
            )),
        }
    }
}

/// One outbound lookup, classified.
///
/// Implementations return the provider's success payload, or a [`Failure`] whose
/// message is safe to show to the user.
#[async_trait]
pub trait WeatherTransport: Send + Sync + Debug {
    async fn fetch(&self, query: &WeatherQuery) -> Result<Value, Failure>;
}

#[async_trait]
impl<T: WeatherTransport + ?Sized> WeatherTransport for Box<T> {
    async fn fetch(&self, query: &WeatherQuery) -> Result<Value, Failure> {
        (**self).fetch(query).await
    }
}

/// Construct the configured transport.
pub fn transport_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherTransport>> {
    let timeout = config.timeout();

    let boxed: Box<dyn WeatherTransport> = match config.transport {
        TransportMode::Gateway => {
            let url = config.gateway_url().ok_or_else(|| {
                anyhow::anyhow!(
                    "No gateway URL configured.\n\
                     Hint: run `weather configure --gateway-url <url>` or set WEATHER_GATEWAY_URL."
                )
            })?;
            Box::new(GatewayTransport::new(url, timeout)?)
        }
        TransportMode::Direct => {
            let api_key = config.provider_api_key().ok_or_else(|| {
                anyhow::anyhow!(
                    "No API key configured for direct transport.\n\
                     Hint: run `weather configure --transport direct` or set OPENWEATHERMAP_API_KEY."
                )
            })?;
            Box::new(ProviderTransport::new(config.provider_base_url(), api_key, timeout)?)
        }
    };

    Ok(boxed)
}

pub(crate) fn http_client(timeout: Duration) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder().timeout(timeout).build()
}

/// Send a prepared GET, read the body and classify the outcome.
///
/// Transport errors are logged without their URL, which may carry a credential.
pub(crate) async fn send_and_classify(request: RequestBuilder) -> Result<Value, Failure> {
    let res = request.send().await.map_err(transport_failure)?;

    let status = res.status().as_u16();
    let body = res.bytes().await.map_err(transport_failure)?;

    tracing::debug!(status, bytes = body.len(), "weather response received");

    classify(status, &body)
}

fn transport_failure(err: reqwest::Error) -> Failure {
    let err = err.without_url();
    if err.is_timeout() {
        tracing::warn!(error = %err, "weather request timed out");
        Failure::timeout()
    } else {
        tracing::warn!(error = %err, "weather request failed");
        Failure::network()
    }
}
