//! Great-circle distance, and a straight-line travel-time service built on it.
//!
//! The service ignores roads, so it is only an estimate, but it is always
//! available and costs nothing to query.

use crate::error::Result;
use crate::model::GeoPoint;
use crate::traits::TravelTimeService;

/// Average driving speed assumption for time estimation.
const DEFAULT_SPEED_KMH: f64 = 40.0;

/// Earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two (lat, lng) pairs in kilometers.
pub fn haversine_km(from: (f64, f64), to: (f64, f64)) -> f64 {
    let (lat1, lng1) = from;
    let (lat2, lng2) = to;

    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lng = (lng2 - lng1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();

    EARTH_RADIUS_KM * c
}

/// Distance between two points in kilometers.
pub fn distance_km(a: &GeoPoint, b: &GeoPoint) -> f64 {
    haversine_km(a.coords(), b.coords())
}

/// Haversine-based travel-time service.
#[derive(Debug, Clone)]
pub struct HaversineTravelTime {
    /// Assumed average driving speed in km/h.
    pub speed_kmh: f64,
}

impl Default for HaversineTravelTime {
    fn default() -> Self {
        Self {
            speed_kmh: DEFAULT_SPEED_KMH,
        }
    }
}

impl HaversineTravelTime {
    pub fn new(speed_kmh: f64) -> Self {
        Self { speed_kmh }
    }

    /// Convert distance in km to travel time in seconds.
    fn km_to_seconds(&self, km: f64) -> f64 {
        km / self.speed_kmh * 3600.0
    }
}

impl TravelTimeService for HaversineTravelTime {
    fn travel_times(&self, origins: &[GeoPoint], targets: &[GeoPoint]) -> Result<Vec<Vec<Option<f64>>>> {
        Ok(origins
            .iter()
            .map(|from| {
                targets
                    .iter()
                    .map(|to| Some(self.km_to_seconds(distance_km(from, to))))
                    .collect()
            })
            .collect())
    }
}
