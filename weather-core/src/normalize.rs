use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::{classify::Failure, country::region_label, model::WeatherView};

#[derive(Debug, Deserialize)]
struct OwSys {
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    icon: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    dt: Option<i64>,
    sys: Option<OwSys>,
    weather: Vec<OwWeather>,
    main: OwMain,
    wind: OwWind,
    visibility: f64,
}

/// Build a [`WeatherView`] from a successful provider payload.
///
/// Fails with [`FailureKind::MalformedPayload`](crate::FailureKind::MalformedPayload)
/// when a required field is missing or the weather-condition list is empty; a
/// partially filled view is never produced.
pub fn normalize(payload: &Value) -> Result<WeatherView, Failure> {
    normalize_at(payload, Utc::now())
}

pub(crate) fn normalize_at(payload: &Value, now: DateTime<Utc>) -> Result<WeatherView, Failure> {
    let parsed = OwCurrentResponse::deserialize(payload).map_err(|err| {
        tracing::warn!(error = %err, "provider payload is missing required fields");
        Failure::malformed()
    })?;

    let condition = parsed.weather.into_iter().next().ok_or_else(|| {
        tracing::warn!("provider payload has no weather condition entry");
        Failure::malformed()
    })?;

    let location_label = match parsed.sys.and_then(|s| s.country) {
        Some(code) => format!("{}, {}", parsed.name, region_label(&code)),
        None => parsed.name,
    };

    let observed_at = parsed.dt.and_then(|ts| DateTime::from_timestamp(ts, 0)).unwrap_or(now);

    Ok(WeatherView {
        location_label,
        observed_at,
        icon_ref: condition.icon,
        description: condition.description,
        temperature_c: round_half_up(parsed.main.temp),
        humidity_pct: parsed.main.humidity,
        wind_speed_ms: parsed.wind.speed,
        feels_like_c: round_half_up(parsed.main.feels_like),
        visibility_km: round_tenths(parsed.visibility / 1000.0),
    })
}

/// Nearest integer, with halves going toward positive infinity (-2.5 → -2).
fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

fn round_tenths(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
