//! Core data models for news headlines and current weather
//!
//! This module contains the article and weather types shared by the HTTP
//! clients, the snapshot cache and the favorites ledger, along with the
//! condition classifier and temperature unit conversion.

pub mod news;
pub mod weather;

pub use news::{NewsClient, NewsError, NewsRequest};
pub use weather::{WeatherClient, WeatherError, WeatherRequest};

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Publisher of an article
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ArticleSource {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// A news article as returned by the news endpoint
///
/// Field names follow the endpoint's camelCase JSON so the last good article
/// list can be persisted verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    /// Headline
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    /// Short description
    #[serde(default)]
    pub description: Option<String>,
    /// Truncated body text
    #[serde(default)]
    pub content: Option<String>,
    /// Canonical source URL
    #[serde(default)]
    pub url: Option<String>,
    /// Lead image URL
    #[serde(default)]
    pub url_to_image: Option<String>,
    /// Publisher
    #[serde(default)]
    pub source: Option<ArticleSource>,
    #[serde(default)]
    pub author: Option<String>,
    /// ISO-8601 publish time, kept as sent
    #[serde(default)]
    pub published_at: Option<String>,
}

impl Article {
    /// Stable identifier: the source URL when present, otherwise the title
    ///
    /// Two distinct articles without URLs that share a title get the same id.
    pub fn id(&self) -> &str {
        match self.url.as_deref() {
            Some(url) if !url.is_empty() => url,
            _ => &self.title,
        }
    }

    /// Description, falling back to content, falling back to nothing
    pub fn summary(&self) -> &str {
        self.description
            .as_deref()
            .filter(|s| !s.is_empty())
            .or(self.content.as_deref())
            .unwrap_or("")
    }

    pub fn source_name(&self) -> Option<&str> {
        self.source.as_ref().and_then(|s| s.name.as_deref())
    }

    /// Parsed publish time, if the article carries a valid ISO-8601 timestamp
    pub fn published(&self) -> Option<DateTime<FixedOffset>> {
        self.published_at
            .as_deref()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
    }

    /// Case-insensitive match of `needle` against title followed by description
    pub fn matches(&self, needle: &str) -> bool {
        let haystack = format!(
            "{}{}",
            self.title,
            self.description.as_deref().unwrap_or("")
        )
        .to_lowercase();
        haystack.contains(&needle.to_lowercase())
    }

    /// Text for the detail view: content, else description, else a pointer to the web
    pub fn body(&self) -> &str {
        [self.content.as_deref(), self.description.as_deref()]
            .into_iter()
            .flatten()
            .find(|s| !s.is_empty())
            .unwrap_or(FULL_ARTICLE_ON_WEB)
    }

    /// Message used when sharing the article
    pub fn share_text(&self) -> String {
        format!(
            "{}\n\nRead more: {}",
            self.title,
            self.url.as_deref().unwrap_or("")
        )
    }
}

/// Detail text for an article that carries neither content nor description
pub const FULL_ARTICLE_ON_WEB: &str = "Full article available on the web.";

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Temperature scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    /// The other unit
    pub fn toggled(self) -> Self {
        match self {
            TemperatureUnit::Celsius => TemperatureUnit::Fahrenheit,
            TemperatureUnit::Fahrenheit => TemperatureUnit::Celsius,
        }
    }

    /// Display suffix, e.g. `°C`
    pub fn symbol(self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "°C",
            TemperatureUnit::Fahrenheit => "°F",
        }
    }
}

/// Fahrenheit = Celsius × 9/5 + 32
pub fn to_fahrenheit(celsius: f64) -> f64 {
    celsius * 9.0 / 5.0 + 32.0
}

pub fn to_celsius(fahrenheit: f64) -> f64 {
    (fahrenheit - 32.0) * 5.0 / 9.0
}

/// A temperature value tagged with its unit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Temperature {
    pub value: f64,
    pub unit: TemperatureUnit,
}

impl Temperature {
    pub fn celsius(value: f64) -> Self {
        Self {
            value,
            unit: TemperatureUnit::Celsius,
        }
    }

    pub fn fahrenheit(value: f64) -> Self {
        Self {
            value,
            unit: TemperatureUnit::Fahrenheit,
        }
    }

    /// Converts to `unit` without rounding
    pub fn to(self, unit: TemperatureUnit) -> Self {
        let value = match (self.unit, unit) {
            (TemperatureUnit::Celsius, TemperatureUnit::Fahrenheit) => to_fahrenheit(self.value),
            (TemperatureUnit::Fahrenheit, TemperatureUnit::Celsius) => to_celsius(self.value),
            _ => self.value,
        };
        Self { value, unit }
    }

    /// Value rounded to the nearest whole degree, for display only
    pub fn rounded(self) -> i64 {
        self.value.round() as i64
    }
}

impl fmt::Display for Temperature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rounded(), self.unit.symbol())
    }
}

/// Coarse weather category derived from the free-text description
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConditionCategory {
    Sunny,
    Rainy,
    Cloudy,
}

impl ConditionCategory {
    /// Classifies a weather description by keyword
    ///
    /// Rain keywords are checked before cloud keywords, so "light rain and
    /// cloudy" is rainy. Anything unmatched is sunny.
    pub fn classify(description: &str) -> Self {
        const RAINY: [&str; 3] = ["rain", "shower", "drizzle"];
        const CLOUDY: [&str; 4] = ["cloud", "mist", "fog", "overcast"];

        let desc = description.to_lowercase();
        if RAINY.iter().any(|k| desc.contains(k)) {
            ConditionCategory::Rainy
        } else if CLOUDY.iter().any(|k| desc.contains(k)) {
            ConditionCategory::Cloudy
        } else {
            ConditionCategory::Sunny
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ConditionCategory::Sunny => "sunny",
            ConditionCategory::Rainy => "rainy",
            ConditionCategory::Cloudy => "cloudy",
        }
    }
}

/// Latitude/longitude pair in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Whether both components are within their valid ranges
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

impl fmt::Display for Coordinates {
    /// Formats as the `lat,lon` pair the weather endpoint expects
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}

/// Current weather conditions at a location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReading {
    /// Air temperature
    pub temperature: Temperature,
    /// Feels-like temperature
    pub feels_like: Temperature,
    /// Relative humidity percentage (0-100)
    pub humidity: u8,
    /// Wind speed in km/h
    pub wind_kph: f64,
    /// Free-text condition, e.g. "Patchy light drizzle"
    pub description: String,
    /// Absolute URL of the condition icon
    pub icon_url: Option<String>,
    /// Category derived from `description`
    pub condition: ConditionCategory,
    /// Place name reported by the endpoint
    #[serde(default)]
    pub location_name: Option<String>,
    /// When this reading was fetched
    pub fetched_at: DateTime<Utc>,
}

impl WeatherReading {
    /// Builds a reading from Celsius values, deriving the condition category
    pub fn from_celsius(
        temperature_c: f64,
        feels_like_c: f64,
        humidity: u8,
        wind_kph: f64,
        description: impl Into<String>,
    ) -> Self {
        let description = description.into();
        Self {
            temperature: Temperature::celsius(temperature_c),
            feels_like: Temperature::celsius(feels_like_c),
            humidity: humidity.min(100),
            wind_kph,
            condition: ConditionCategory::classify(&description),
            description,
            icon_url: None,
            location_name: None,
            fetched_at: Utc::now(),
        }
    }

    /// The same reading with both temperatures expressed in `unit`
    pub fn in_unit(&self, unit: TemperatureUnit) -> Self {
        Self {
            temperature: self.temperature.to(unit),
            feels_like: self.feels_like.to(unit),
            ..self.clone()
        }
    }
}
