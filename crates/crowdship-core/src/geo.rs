//! # Geo Helpers
//!
//! Coordinates, great-circle distance, straight-line route plans and
//! reverse-geocoded address formatting.
//!
//! ## Route Planning
//! ```text
//!   origin ──────► stop 1 ──────► stop 2 ──────► stop 3
//!          leg 1          leg 2          leg 3
//! ```
//! Stops are visited in the order given. There is no path-finding: each
//! leg is the great-circle line between two points.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Mean Earth radius used by the haversine formula.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Shown when reverse geocoding returns nothing usable.
pub const UNKNOWN_LOCATION: &str = "Unknown location";

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    #[inline]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Coordinates {
            latitude,
            longitude,
        }
    }

    /// Great-circle distance to `other` in kilometres.
    pub fn distance_km(&self, other: &Coordinates) -> f64 {
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let d_lat = (other.latitude - self.latitude).to_radians();
        let d_lon = (other.longitude - self.longitude).to_radians();

        let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        EARTH_RADIUS_KM * c
    }

    /// True when both components are within their valid ranges.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// The device's last known position, optionally with a resolved address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LocationPoint {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl LocationPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        LocationPoint {
            latitude,
            longitude,
            address: None,
        }
    }

    #[inline]
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }
}

impl From<Coordinates> for LocationPoint {
    fn from(c: Coordinates) -> Self {
        LocationPoint::new(c.latitude, c.longitude)
    }
}

/// Structured address fields as returned by a reverse geocoder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct GeocodedAddress {
    pub street: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
}

impl GeocodedAddress {
    /// Joins the non-empty fields with ", " in street → country order.
    pub fn format(&self) -> String {
        [
            &self.street,
            &self.city,
            &self.region,
            &self.postal_code,
            &self.country,
        ]
        .into_iter()
        .filter_map(|part| part.as_deref())
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
    }
}

/// Formats the first geocoder result, or [`UNKNOWN_LOCATION`].
pub fn format_address(results: &[GeocodedAddress]) -> String {
    results
        .first()
        .map(GeocodedAddress::format)
        .filter(|formatted| !formatted.is_empty())
        .unwrap_or_else(|| UNKNOWN_LOCATION.to_string())
}

/// A straight-line route through an ordered list of points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    /// Origin first, then each stop.
    pub points: Vec<Coordinates>,
    /// Length of each leg in kilometres; one fewer than `points`.
    pub leg_distances_km: Vec<f64>,
    pub total_distance_km: f64,
}

/// Plans a route from `origin` through `stops` in the given order.
///
/// Returns `None` when there are no stops.
pub fn plan_route(origin: Coordinates, stops: &[Coordinates]) -> Option<Route> {
    if stops.is_empty() {
        return None;
    }

    let mut points = Vec::with_capacity(stops.len() + 1);
    points.push(origin);
    points.extend_from_slice(stops);

    let leg_distances_km: Vec<f64> = points
        .windows(2)
        .map(|leg| leg[0].distance_km(&leg[1]))
        .collect();
    let total_distance_km = leg_distances_km.iter().sum();

    Some(Route {
        points,
        leg_distances_km,
        total_distance_km,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_zero_for_same_point() {
        let p = Coordinates::new(51.5, -0.12);
        assert!(p.distance_km(&p).abs() < 1e-9);
    }

    #[test]
    fn test_distance_one_degree_longitude_at_equator() {
        let a = Coordinates::new(0.0, 0.0);
        let b = Coordinates::new(0.0, 1.0);
        // 2πR / 360 ≈ 111.19 km
        assert!((a.distance_km(&b) - 111.19).abs() < 0.01);
    }

    #[test]
    fn test_coordinates_validity() {
        assert!(Coordinates::new(45.0, 90.0).is_valid());
        assert!(!Coordinates::new(91.0, 0.0).is_valid());
        assert!(!Coordinates::new(0.0, -181.0).is_valid());
        assert!(!Coordinates::new(f64::NAN, 0.0).is_valid());
    }

    #[test]
    fn test_format_address_skips_missing_fields() {
        let address = GeocodedAddress {
            street: Some("1 Market St".to_string()),
            city: Some("San Francisco".to_string()),
            region: None,
            postal_code: Some("  ".to_string()),
            country: Some("USA".to_string()),
        };
        assert_eq!(format_address(&[address]), "1 Market St, San Francisco, USA");
    }

    #[test]
    fn test_format_address_unknown() {
        assert_eq!(format_address(&[]), UNKNOWN_LOCATION);
        assert_eq!(format_address(&[GeocodedAddress::default()]), UNKNOWN_LOCATION);
    }

    #[test]
    fn test_plan_route() {
        let origin = Coordinates::new(0.0, 0.0);
        let stops = [Coordinates::new(0.0, 1.0), Coordinates::new(0.0, 2.0)];

        let route = plan_route(origin, &stops).unwrap();

        assert_eq!(route.points.len(), 3);
        assert_eq!(route.leg_distances_km.len(), 2);
        assert!((route.total_distance_km - 2.0 * 111.19).abs() < 0.05);
    }

    #[test]
    fn test_plan_route_without_stops() {
        assert!(plan_route(Coordinates::new(0.0, 0.0), &[]).is_none());
    }
}
