//! # Location Service
//!
//! Holds the device's single current location and resolves addresses.
//!
//! Device access goes through [`LocationProvider`], so the platform
//! adapter (GPS, geocoder) is injected at startup and swapped for
//! [`FixedLocationProvider`] in development and tests.
//!
//! ```text
//!  update_current_location()
//!        │
//!        ├─► provider.request_permission() ── denied ──► error message set
//!        │
//!        └─► provider.current_position() ──► current location overwritten
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crowdship_core::geo::{self, Coordinates, GeocodedAddress, LocationPoint, Route};
use crowdship_core::ValidationError;

use crate::error::ApiError;

/// Shown when the user refuses location access.
pub const PERMISSION_DENIED_MESSAGE: &str = "Permission to access location was denied";

/// Shown when the permission request itself fails.
pub const PERMISSION_REQUEST_FAILED_MESSAGE: &str = "Error requesting location permission";

/// Shown when reverse geocoding fails.
pub const GEOCODING_FAILED_MESSAGE: &str = "Error getting address";

/// Failures reported by a location provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationError {
    #[error("Permission to access location was denied")]
    PermissionDenied,

    #[error("Current location unavailable: {0}")]
    Unavailable(String),

    #[error("Reverse geocoding failed: {0}")]
    Geocoding(String),
}

/// Platform location services.
#[async_trait]
pub trait LocationProvider: Send + Sync {
    /// Asks for foreground location permission. `Ok(false)` means denied.
    async fn request_permission(&self) -> Result<bool, LocationError>;

    /// Reads the device's current position.
    async fn current_position(&self) -> Result<Coordinates, LocationError>;

    /// Looks up structured addresses for a point, best match first.
    async fn reverse_geocode(&self, at: Coordinates)
        -> Result<Vec<GeocodedAddress>, LocationError>;
}

/// A provider that always reports the same position and addresses.
#[derive(Debug, Clone)]
pub struct FixedLocationProvider {
    position: Coordinates,
    addresses: Vec<GeocodedAddress>,
    permission_granted: bool,
    permission_error: Option<String>,
    geocoding_error: Option<String>,
}

impl FixedLocationProvider {
    pub fn new(position: Coordinates) -> Self {
        FixedLocationProvider {
            position,
            addresses: Vec::new(),
            permission_granted: true,
            permission_error: None,
            geocoding_error: None,
        }
    }

    /// Addresses returned by every reverse geocode.
    pub fn with_addresses(mut self, addresses: Vec<GeocodedAddress>) -> Self {
        self.addresses = addresses;
        self
    }

    /// Refuse every permission request.
    pub fn deny_permission(mut self) -> Self {
        self.permission_granted = false;
        self
    }

    /// Fail every permission request with `reason`.
    pub fn fail_permission_request(mut self, reason: impl Into<String>) -> Self {
        self.permission_error = Some(reason.into());
        self
    }

    /// Fail every reverse geocode with `reason`.
    pub fn fail_geocoding(mut self, reason: impl Into<String>) -> Self {
        self.geocoding_error = Some(reason.into());
        self
    }
}

#[async_trait]
impl LocationProvider for FixedLocationProvider {
    async fn request_permission(&self) -> Result<bool, LocationError> {
        match &self.permission_error {
            Some(reason) => Err(LocationError::Unavailable(reason.clone())),
            None => Ok(self.permission_granted),
        }
    }

    async fn current_position(&self) -> Result<Coordinates, LocationError> {
        if !self.permission_granted {
            return Err(LocationError::PermissionDenied);
        }
        Ok(self.position)
    }

    async fn reverse_geocode(
        &self,
        _at: Coordinates,
    ) -> Result<Vec<GeocodedAddress>, LocationError> {
        match &self.geocoding_error {
            Some(reason) => Err(LocationError::Geocoding(reason.clone())),
            None => Ok(self.addresses.clone()),
        }
    }
}

#[derive(Debug, Default)]
struct LocationState {
    current: Option<LocationPoint>,
    error: Option<String>,
}

/// Location state holder.
#[derive(Clone)]
pub struct LocationService {
    provider: Arc<dyn LocationProvider>,
    state: Arc<RwLock<LocationState>>,
    fallback: Option<Coordinates>,
}

impl LocationService {
    pub fn new(provider: Arc<dyn LocationProvider>) -> Self {
        LocationService {
            provider,
            state: Arc::new(RwLock::new(LocationState::default())),
            fallback: None,
        }
    }

    /// Route origin to use until the device reports a position.
    pub fn with_fallback(mut self, fallback: Option<Coordinates>) -> Self {
        self.fallback = fallback;
        self
    }

    /// Requests permission. On refusal or provider failure the error
    /// message is recorded and `false` returned.
    pub async fn request_permission(&self) -> bool {
        let outcome = self.provider.request_permission().await;
        let mut state = self.state.write().await;

        match outcome {
            Ok(true) => {
                state.error = None;
                true
            }
            Ok(false) => {
                info!("Location permission denied");
                state.error = Some(PERMISSION_DENIED_MESSAGE.to_string());
                false
            }
            Err(e) => {
                warn!(error = %e, "Location permission request failed");
                state.error = Some(PERMISSION_REQUEST_FAILED_MESSAGE.to_string());
                false
            }
        }
    }

    /// Fetches the device position and makes it the current location.
    pub async fn update_current_location(&self) -> Result<LocationPoint, ApiError> {
        if !self.request_permission().await {
            let message = self
                .error_message()
                .await
                .unwrap_or_else(|| PERMISSION_DENIED_MESSAGE.to_string());
            return Err(ApiError::location(message));
        }

        match self.provider.current_position().await {
            Ok(coordinates) => {
                let point = LocationPoint::from(coordinates);
                let mut state = self.state.write().await;
                state.current = Some(point.clone());
                state.error = None;
                debug!(
                    latitude = point.latitude,
                    longitude = point.longitude,
                    "Current location updated"
                );
                Ok(point)
            }
            Err(e) => {
                warn!(error = %e, "Could not read current position");
                self.state.write().await.error = Some(e.to_string());
                Err(e.into())
            }
        }
    }

    /// The last position the device reported, if any.
    pub async fn current_location(&self) -> Option<LocationPoint> {
        self.state.read().await.current.clone()
    }

    /// The most recent location error, cleared by the next success.
    pub async fn error_message(&self) -> Option<String> {
        self.state.read().await.error.clone()
    }

    /// Human-readable address for `at`.
    ///
    /// Never fails: an empty lookup gives "Unknown location" and a provider
    /// error gives "Error getting address".
    pub async fn address_for(&self, at: Coordinates) -> String {
        match self.provider.reverse_geocode(at).await {
            Ok(results) => geo::format_address(&results),
            Err(e) => {
                warn!(error = %e, "Reverse geocoding failed");
                GEOCODING_FAILED_MESSAGE.to_string()
            }
        }
    }

    /// Plans a straight-line route from the current location through
    /// `stops`, in order.
    pub async fn plan_route(&self, stops: &[Coordinates]) -> Result<Route, ApiError> {
        let origin = self
            .current_location()
            .await
            .map(|point| point.coordinates())
            .or(self.fallback)
            .ok_or_else(|| ApiError::location("Current location unavailable"))?;

        geo::plan_route(origin, stops).ok_or_else(|| {
            ValidationError::Empty {
                field: "stops".to_string(),
            }
            .into()
        })
    }
}

impl std::fmt::Debug for LocationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocationService")
            .field("fallback", &self.fallback)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    const HERE: Coordinates = Coordinates::new(37.7749, -122.4194);

    fn service(provider: FixedLocationProvider) -> LocationService {
        LocationService::new(Arc::new(provider))
    }

    #[tokio::test]
    async fn test_update_current_location() {
        let location = service(FixedLocationProvider::new(HERE));

        assert_eq!(location.current_location().await, None);

        let point = location.update_current_location().await.unwrap();
        assert_eq!(point.coordinates(), HERE);
        assert_eq!(location.current_location().await, Some(point));
        assert_eq!(location.error_message().await, None);
    }

    #[tokio::test]
    async fn test_permission_denied() {
        let location = service(FixedLocationProvider::new(HERE).deny_permission());

        assert!(!location.request_permission().await);
        assert_eq!(
            location.error_message().await.as_deref(),
            Some(PERMISSION_DENIED_MESSAGE)
        );

        let err = location.update_current_location().await.unwrap_err();
        assert_eq!(err.code, ErrorCode::LocationError);
        assert_eq!(location.current_location().await, None);
    }

    #[tokio::test]
    async fn test_permission_request_failure() {
        let location = service(FixedLocationProvider::new(HERE).fail_permission_request("no gps"));

        let err = location.update_current_location().await.unwrap_err();

        assert_eq!(err.code, ErrorCode::LocationError);
        assert_eq!(err.message, PERMISSION_REQUEST_FAILED_MESSAGE);
        assert_eq!(
            location.error_message().await.as_deref(),
            Some(PERMISSION_REQUEST_FAILED_MESSAGE)
        );
        assert_eq!(location.current_location().await, None);
    }

    #[tokio::test]
    async fn test_address_for() {
        let address = GeocodedAddress {
            street: Some("1 Dr Carlton B Goodlett Pl".to_string()),
            city: Some("San Francisco".to_string()),
            region: Some("CA".to_string()),
            postal_code: Some("94102".to_string()),
            country: Some("United States".to_string()),
        };
        let location = service(FixedLocationProvider::new(HERE).with_addresses(vec![address]));

        assert_eq!(
            location.address_for(HERE).await,
            "1 Dr Carlton B Goodlett Pl, San Francisco, CA, 94102, United States"
        );
    }

    #[tokio::test]
    async fn test_address_fallbacks() {
        let empty = service(FixedLocationProvider::new(HERE));
        assert_eq!(empty.address_for(HERE).await, geo::UNKNOWN_LOCATION);

        let failing = service(FixedLocationProvider::new(HERE).fail_geocoding("offline"));
        assert_eq!(failing.address_for(HERE).await, GEOCODING_FAILED_MESSAGE);
    }

    #[tokio::test]
    async fn test_plan_route() {
        let location = service(FixedLocationProvider::new(HERE));
        let stop = Coordinates::new(37.8044, -122.2712);

        let err = location.plan_route(&[stop]).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::LocationError);

        location.update_current_location().await.unwrap();
        let route = location.plan_route(&[stop]).await.unwrap();
        assert_eq!(route.points, vec![HERE, stop]);
        assert!(route.total_distance_km > 10.0 && route.total_distance_km < 20.0);

        let err = location.plan_route(&[]).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_plan_route_uses_fallback() {
        let location = service(FixedLocationProvider::new(HERE)).with_fallback(Some(HERE));
        let route = location.plan_route(&[Coordinates::new(37.8, -122.4)]).await.unwrap();
        assert_eq!(route.points[0], HERE);
    }
}
