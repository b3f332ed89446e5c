//! Device location lookup with a fixed fallback
//!
//! The weather request needs a coordinate pair. When the device cannot say
//! where it is within a bounded wait, the configured fallback coordinate is
//! used instead and nothing is reported to the user.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::data::Coordinates;

/// Latitude of the built-in fallback coordinate (New Delhi)
pub const DEFAULT_LATITUDE: f64 = 28.6139;

/// Longitude of the built-in fallback coordinate (New Delhi)
pub const DEFAULT_LONGITUDE: f64 = 77.209;

/// How long to wait for a position before falling back
pub const DEFAULT_LOCATION_TIMEOUT: Duration = Duration::from_secs(30);

/// Reasons a position could not be obtained
#[derive(Debug, Error)]
pub enum LocationError {
    #[error("location permission denied")]
    PermissionDenied,

    #[error("location unavailable: {0}")]
    Unavailable(String),
}

/// Anything that can report the device's current position
#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn current_position(&self) -> Result<Coordinates, LocationError>;
}

/// Always reports the same position
#[derive(Debug, Clone, Copy)]
pub struct FixedLocation(pub Coordinates);

#[async_trait]
impl LocationProvider for FixedLocation {
    async fn current_position(&self) -> Result<Coordinates, LocationError> {
        Ok(self.0)
    }
}

/// A device without positioning support
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableLocation;

#[async_trait]
impl LocationProvider for UnavailableLocation {
    async fn current_position(&self) -> Result<Coordinates, LocationError> {
        Err(LocationError::Unavailable("no positioning provider".to_string()))
    }
}

/// Returns the device position, or `fallback` if it fails or takes longer than `wait`
pub async fn resolve_coordinates<L>(provider: &L, wait: Duration, fallback: Coordinates) -> Coordinates
where
    L: LocationProvider + ?Sized,
{
    match tokio::time::timeout(wait, provider.current_position()).await {
        Ok(Ok(coordinates)) => {
            debug!(%coordinates, "using device location");
            coordinates
        }
        Ok(Err(err)) => {
            warn!(error = %err, %fallback, "location lookup failed, using fallback coordinate");
            fallback
        }
        Err(_) => {
            warn!(?wait, %fallback, "location lookup timed out, using fallback coordinate");
            fallback
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Provider that never answers in time
    struct Stalled;

    #[async_trait]
    impl LocationProvider for Stalled {
        async fn current_position(&self) -> Result<Coordinates, LocationError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(Coordinates::new(1.0, 1.0))
        }
    }

    struct Denied;

    #[async_trait]
    impl LocationProvider for Denied {
        async fn current_position(&self) -> Result<Coordinates, LocationError> {
            Err(LocationError::PermissionDenied)
        }
    }

    fn fallback() -> Coordinates {
        Coordinates::new(DEFAULT_LATITUDE, DEFAULT_LONGITUDE)
    }

    #[tokio::test]
    async fn test_device_position_is_used() {
        let here = Coordinates::new(49.28, -123.12);
        let resolved = resolve_coordinates(&FixedLocation(here), Duration::from_secs(1), fallback()).await;
        assert_eq!(resolved, here);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_uses_fallback() {
        let resolved = resolve_coordinates(&Stalled, DEFAULT_LOCATION_TIMEOUT, fallback()).await;
        assert_eq!(resolved, fallback());
    }

    #[tokio::test]
    async fn test_error_uses_fallback() {
        assert_eq!(
            resolve_coordinates(&Denied, Duration::from_secs(1), fallback()).await,
            fallback()
        );
        assert_eq!(
            resolve_coordinates(&UnavailableLocation, Duration::from_secs(1), fallback()).await,
            fallback()
        );
    }

    #[tokio::test]
    async fn test_works_through_trait_object() {
        let provider: Box<dyn LocationProvider> = Box::new(UnavailableLocation);
        let resolved = resolve_coordinates(provider.as_ref(), Duration::from_secs(1), fallback()).await;
        assert_eq!(resolved, fallback());
    }
}
