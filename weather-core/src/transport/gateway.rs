use async_trait::async_trait;
use reqwest::{Client, header};
use serde_json::Value;
use std::time::Duration;

use crate::{classify::Failure, model::WeatherQuery};

use super::{WeatherTransport, http_client, send_and_classify};

/// Calls the gateway function. Carries no credential.
#[derive(Debug, Clone)]
pub struct GatewayTransport {
    url: String,
    http: Client,
}

impl GatewayTransport {
    pub fn new(url: &str, timeout: Duration) -> reqwest::Result<Self> {
        Ok(Self { url: url.to_owned(), http: http_client(timeout)? })
    }
}

#[async_trait]
impl WeatherTransport for GatewayTransport {
    async fn fetch(&self, query: &WeatherQuery) -> Result<Value, Failure> {
        tracing::debug!(city = query.city(), gateway = %self.url, "querying gateway");

        let request = self
            .http
            .get(&self.url)
            .header(header::ACCEPT, "application/json")
            .query(&[("city", query.city())]);

        send_and_classify(request).await
    }
}
