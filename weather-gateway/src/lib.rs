//! Stateless gateway between the browser widget and the weather provider.
//!
//! The provider key lives only here. Each request is handled independently:
//! validate the city, call the provider with a hard timeout, classify, and re-map
//! the result to the gateway's own status code with permissive CORS headers.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State, rejection::QueryRejection},
    http::{HeaderName, header},
    response::{IntoResponse, Response},
    routing::get,
};
use weather_core::{ProviderTransport, WeatherQuery, WeatherTransport};

pub mod config;
pub mod relay;

use relay::Reply;

const CORS_HEADERS: [(HeaderName, &str); 3] = [
    (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
    (
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        "Content-Type,X-Amz-Date,Authorization,X-Api-Key,X-Amz-Security-Token",
    ),
    (header::ACCESS_CONTROL_ALLOW_METHODS, "GET,OPTIONS"),
];

#[derive(Debug, Clone)]
pub struct AppState {
    /// `None` when no API key was supplied; every lookup then answers 500.
    provider: Option<Arc<ProviderTransport>>,
}

impl AppState {
    pub fn new(provider: Option<ProviderTransport>) -> Self {
        Self { provider: provider.map(Arc::new) }
    }

    pub fn is_configured(&self) -> bool {
        self.provider.is_some()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/weather", get(handle_weather).options(handle_preflight))
        .with_state(state)
}

/// OPTIONS /weather: CORS preflight.
async fn handle_preflight() -> Response {
    respond(relay::preflight())
}

/// GET /weather?city=<name>
///
/// The query is read as raw pairs so a repeated `city` never turns into an
/// extractor rejection; the last value wins.
async fn handle_weather(
    State(state): State<AppState>,
    params: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Response {
    let city = match params {
        Ok(Query(pairs)) => last_value(pairs, "city"),
        Err(err) => {
            tracing::warn!(error = %err, "unreadable query string");
            return respond(relay::bad_query());
        }
    };
    tracing::info!(city = ?city, "weather request");

    let Some(provider) = state.provider.as_deref() else {
        tracing::error!("OPENWEATHERMAP_API_KEY is not set");
        return respond(relay::not_configured());
    };

    let query = match WeatherQuery::parse(city.as_deref().unwrap_or_default()) {
        Ok(query) => query,
        Err(err) => return respond(relay::rejected(err)),
    };

    let reply = relay::relay(provider.fetch(&query).await);
    tracing::info!(city = query.city(), status = reply.status.as_u16(), "weather response");

    respond(reply)
}

fn last_value(pairs: Vec<(String, String)>, key: &str) -> Option<String> {
    pairs.into_iter().rev().find(|(k, _)| k == key).map(|(_, v)| v)
}

fn respond(reply: Reply) -> Response {
    (reply.status, CORS_HEADERS, Json(reply.body)).into_response()
}

/// Used by tests and embedders that want to serve on an existing listener.
pub async fn serve(listener: tokio::net::TcpListener, state: AppState) -> std::io::Result<()> {
    axum::serve(listener, router(state)).await
}
