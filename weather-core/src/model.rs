use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Longest city name accepted by both the client and the gateway.
pub const MAX_CITY_LEN: usize = 100;

/// Reasons a raw city input is rejected before any request is made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("Please enter a city name")]
    EmptyInput,
    #[error("City name is too long")]
    TooLong,
}

/// A validated city lookup.
///
/// The only way to obtain one is [`WeatherQuery::parse`], so a `WeatherQuery`
/// always holds a trimmed, non-empty city of at most [`MAX_CITY_LEN`] characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherQuery {
    city: String,
}

impl WeatherQuery {
    pub fn parse(raw: &str) -> Result<Self, QueryError> {
        let city = raw.trim();

        if city.is_empty() {
            return Err(QueryError::EmptyInput);
        }
        if city.chars().count() > MAX_CITY_LEN {
            return Err(QueryError::TooLong);
        }

        Ok(Self { city: city.to_owned() })
    }

    pub fn city(&self) -> &str {
        &self.city
    }
}

/// Display-ready projection of a successful provider response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherView {
    pub location_label: String,
    pub observed_at: DateTime<Utc>,
    pub icon_ref: String,
    pub description: String,
    pub temperature_c: i64,
    pub humidity_pct: u8,
    pub wind_speed_ms: f64,
    pub feels_like_c: i64,
    pub visibility_km: f64,
}

impl WeatherView {
    pub fn icon_url(&self) -> String {
        format!("https://openweathermap.org/img/wn/{}@2x.png", self.icon_ref)
    }

    /// e.g. "Monday, January 1, 2024 at 10:30 AM"
    pub fn observed_at_text(&self) -> String {
        self.observed_at.format("%A, %B %-d, %Y at %I:%M %p").to_string()
    }

    pub fn temperature_text(&self) -> String {
        self.temperature_c.to_string()
    }

    pub fn humidity_text(&self) -> String {
        format!("{}%", self.humidity_pct)
    }

    pub fn wind_text(&self) -> String {
        format!("{} m/s", self.wind_speed_ms)
    }

    pub fn feels_like_text(&self) -> String {
        format!("{}°C", self.feels_like_c)
    }

    pub fn visibility_text(&self) -> String {
        format!("{:.1} km", self.visibility_km)
    }
}
