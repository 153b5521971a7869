//! Core library for the weather widget.
//!
//! This crate defines:
//! - Query validation
//! - Transports to the provider or to the gateway function
//! - Classification of HTTP outcomes into user-facing failures
//! - Normalization of provider payloads into display-ready views
//! - The presentation interface and the controller that drives it
//!
//! It is used by `weather-cli` and `weather-gateway`.

pub mod classify;
pub mod config;
pub mod controller;
pub mod country;
pub mod model;
pub mod normalize;
pub mod sink;
pub mod transport;

pub use classify::{Failure, FailureKind, classify};
pub use config::Config;
pub use controller::{SubmitOutcome, WeatherController};
pub use model::{MAX_CITY_LEN, QueryError, WeatherQuery, WeatherView};
pub use normalize::normalize;
pub use sink::PresentationSink;
pub use transport::{
    TransportMode, WeatherTransport, gateway::GatewayTransport, provider::ProviderTransport,
    transport_from_config,
};
