//! Current-conditions weather API client
//!
//! This module fetches current weather for a coordinate pair from a
//! WeatherAPI-compatible `/v1/current.json` endpoint and parses it into a
//! [`WeatherReading`].

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

use super::{ConditionCategory, Coordinates, Temperature, WeatherReading};
use crate::fetcher::{DataKind, DataSource};

/// Base URL for the weather API
pub const WEATHER_API_BASE_URL: &str = "https://api.weatherapi.com";

/// Errors that can occur when fetching weather data
#[derive(Debug, Error)]
pub enum WeatherError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("weather API returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// Failed to parse JSON response
    #[error("Failed to parse JSON response: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// Parameters for a current-conditions request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeatherRequest {
    pub coordinates: Coordinates,
}

impl From<Coordinates> for WeatherRequest {
    fn from(coordinates: Coordinates) -> Self {
        Self { coordinates }
    }
}

/// Client for fetching current weather
#[derive(Debug, Clone)]
pub struct WeatherClient {
    client: Client,
    /// Base URL (allows override for testing)
    base_url: String,
    api_key: String,
}

impl WeatherClient {
    /// Create a new WeatherClient against the public endpoint
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: WEATHER_API_BASE_URL.to_string(),
            api_key: api_key.into(),
        }
    }

    /// Replaces the HTTP client, e.g. to set a timeout
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    /// Points the client at a different server
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Fetch current weather for the given coordinates
    ///
    /// # Returns
    /// * `Ok(WeatherReading)` - Current conditions, temperatures in Celsius
    /// * `Err(WeatherError)` - If the request or parsing fails
    pub async fn fetch_weather(&self, coordinates: Coordinates) -> Result<WeatherReading, WeatherError> {
        let url = format!("{}/v1/current.json", self.base_url);
        let q = coordinates.to_string();

        let response = self
            .client
            .get(&url)
            .query(&[("key", self.api_key.as_str()), ("q", q.as_str()), ("aqi", "no")])
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorResponse>(&text)
                .map(|e| e.error.message)
                .unwrap_or_else(|_| status.canonical_reason().unwrap_or("unknown").to_string());
            return Err(WeatherError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let api_response: CurrentResponse = serde_json::from_str(&text)?;
        Ok(parse_response(api_response))
    }
}

#[async_trait]
impl DataSource for WeatherClient {
    type Params = WeatherRequest;
    type Value = WeatherReading;
    type Error = WeatherError;

    fn kind(&self) -> DataKind {
        DataKind::Weather
    }

    fn is_empty(_value: &WeatherReading) -> bool {
        false
    }

    async fn fetch(&self, params: &WeatherRequest) -> Result<WeatherReading, WeatherError> {
        self.fetch_weather(params.coordinates).await
    }
}

/// Parse the API response into a WeatherReading
fn parse_response(response: CurrentResponse) -> WeatherReading {
    let current = response.current;
    let description = current.condition.text;

    WeatherReading {
        temperature: Temperature::celsius(current.temp_c),
        feels_like: Temperature::celsius(current.feelslike_c),
        humidity: current.humidity.clamp(0.0, 100.0).round() as u8,
        wind_kph: current.wind_kph,
        condition: ConditionCategory::classify(&description),
        description,
        icon_url: current.condition.icon.as_deref().and_then(absolute_icon_url),
        location_name: response.location.and_then(|l| l.name),
        fetched_at: Utc::now(),
    }
}

/// Makes the endpoint's protocol-relative icon path directly usable
fn absolute_icon_url(icon: &str) -> Option<String> {
    if icon.is_empty() {
        None
    } else if icon.starts_with("//") {
        Some(format!("https:{}", icon))
    } else {
        Some(icon.to_string())
    }
}

/// Current-conditions response structure
#[derive(Debug, Deserialize)]
struct CurrentResponse {
    #[serde(default)]
    location: Option<Location>,
    current: Current,
}

#[derive(Debug, Deserialize)]
struct Location {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Current {
    temp_c: f64,
    feelslike_c: f64,
    humidity: f64,
    wind_kph: f64,
    condition: Condition,
}

#[derive(Debug, Deserialize)]
struct Condition {
    text: String,
    #[serde(default)]
    icon: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}
