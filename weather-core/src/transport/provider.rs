use async_trait::async_trait;
use reqwest::{Client, header};
use serde_json::Value;
use std::time::Duration;

use crate::{classify::Failure, model::WeatherQuery};

use super::{WeatherTransport, http_client, send_and_classify};

/// Calls the provider's current-weather endpoint with the API key.
#[derive(Clone)]
pub struct ProviderTransport {
    base_url: String,
    api_key: String,
    http: Client,
}

impl ProviderTransport {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> reqwest::Result<Self> {
        Ok(Self {
            base_url: base_url.to_owned(),
            api_key: api_key.to_owned(),
            http: http_client(timeout)?,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

// Hand-written so the key never lands in logs via `{:?}`.
impl std::fmt::Debug for ProviderTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderTransport")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

#[async_trait]
impl WeatherTransport for ProviderTransport {
    async fn fetch(&self, query: &WeatherQuery) -> Result<Value, Failure> {
        tracing::debug!(city = query.city(), "querying provider");

        let request = self
            .http
            .get(&self.base_url)
            .header(header::ACCEPT, "application/json")
            .query(&[
                ("q", query.city()),
                ("appid", self.api_key.as_str()),
                ("units", "metric"),
            ]);

        send_and_classify(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_redacts_key() {
        let transport =
            ProviderTransport::new("https://provider.example", "SECRET", Duration::from_secs(1))
                .unwrap();
        let debug = format!("{transport:?}");
        assert!(!debug.contains("SECRET"));
        assert!(debug.contains("<redacted>"));
    }
}
