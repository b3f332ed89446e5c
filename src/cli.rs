//! Command-line interface parsing for newsweather
//!
//! This module handles parsing of CLI arguments using clap, including
//! range validation of the `--lat`/`--lon` pair of the weather command.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use thiserror::Error;

use crate::data::Coordinates;

/// Error types for CLI argument parsing
#[derive(Debug, Error, PartialEq)]
pub enum CliError {
    /// The value is not a number or lies outside the allowed range
    #[error("Invalid {axis}: '{value}'. Expected a number between -{limit} and {limit}")]
    InvalidCoordinate {
        axis: &'static str,
        value: String,
        limit: u16,
    },
}

/// newsweather - Headlines and current weather, with offline snapshots
#[derive(Parser, Debug)]
#[command(name = "newsweather")]
#[command(about = "Headlines and current weather with offline snapshots and favorites")]
#[command(version)]
pub struct Cli {
    /// Configuration file (defaults to the XDG config directory)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Directory holding snapshots, favorites and preferences
    #[arg(long, global = true, value_name = "PATH")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Load headlines, searching for QUERY when given
    ///
    /// Examples:
    ///   newsweather news              # Default topic
    ///   newsweather news "monsoon"    # Search
    News {
        /// Search terms; empty means the default topic
        query: Option<String>,
    },

    /// Load current weather, at the fallback coordinate unless --lat/--lon are given
    Weather {
        /// Latitude in decimal degrees, -90 to 90
        #[arg(long, requires = "lon", value_parser = parse_latitude, allow_negative_numbers = true)]
        lat: Option<f64>,

        /// Longitude in decimal degrees, -180 to 180
        #[arg(long, requires = "lat", value_parser = parse_longitude, allow_negative_numbers = true)]
        lon: Option<f64>,
    },

    /// Show one article in full, with its link and share text
    Article {
        #[arg(value_name = "ARTICLE_ID")]
        id: String,
    },

    /// Toggle the favorite status of an article (its URL, or its title when it has none)
    Favorite {
        #[arg(value_name = "ARTICLE_ID")]
        id: String,
    },

    /// List favorite articles
    Favorites,

    /// Switch between the light and dark theme
    Theme,

    /// Switch between Celsius and Fahrenheit
    Units,

    /// Show the profile card and preferences
    Profile,
}

/// Parses a latitude argument.
///
/// # Returns
/// * `Ok(f64)` if the value is a number within [-90, 90]
/// * `Err(CliError::InvalidCoordinate)` otherwise
pub fn parse_latitude(s: &str) -> Result<f64, CliError> {
    parse_bounded(s, "latitude", 90)
}

/// Parses a longitude argument.
///
/// # Returns
/// * `Ok(f64)` if the value is a number within [-180, 180]
/// * `Err(CliError::InvalidCoordinate)` otherwise
pub fn parse_longitude(s: &str) -> Result<f64, CliError> {
    parse_bounded(s, "longitude", 180)
}

fn parse_bounded(s: &str, axis: &'static str, limit: u16) -> Result<f64, CliError> {
    let invalid = || CliError::InvalidCoordinate {
        axis,
        value: s.to_string(),
        limit,
    };
    let value: f64 = s.trim().parse().map_err(|_| invalid())?;
    if value.is_finite() && value.abs() <= f64::from(limit) {
        Ok(value)
    } else {
        Err(invalid())
    }
}

impl Command {
    /// Explicit position for the weather command, if one was given
    pub fn coordinates(&self) -> Option<Coordinates> {
        match self {
            Command::Weather {
                lat: Some(lat),
                lon: Some(lon),
            } => Some(Coordinates::new(*lat, *lon)),
            _ => None,
        }
    }
}
