//! Seams between the routing core and its collaborators.
//!
//! The core only ever talks to these traits, so transports can be swapped
//! and tests can supply deterministic synthetic data.

use crate::error::Result;
use crate::model::{DeliveryRequest, GeoPoint};

/// An external travel-time matrix source.
///
/// Returns a rectangular matrix of **seconds** indexed by
/// `[origin position][target position]`. `None` marks a cell the service
/// could not answer (no route).
pub trait TravelTimeService {
    fn travel_times(&self, origins: &[GeoPoint], targets: &[GeoPoint]) -> Result<Vec<Vec<Option<f64>>>>;
}

impl<T: TravelTimeService + ?Sized> TravelTimeService for &T {
    fn travel_times(&self, origins: &[GeoPoint], targets: &[GeoPoint]) -> Result<Vec<Vec<Option<f64>>>> {
        (**self).travel_times(origins, targets)
    }
}

/// "Minutes from A to B", keyed by location identifier.
pub trait TravelTimeOracle {
    /// Hint that `origin -> target` times will be needed soon, so they can be
    /// resolved in one batch. Implementations without batching can ignore it.
    fn prefetch(&self, origin: &str, targets: &[&str]) -> Result<()> {
        let _ = (origin, targets);
        Ok(())
    }

    fn time(&self, origin: &str, target: &str) -> Result<f64>;
}

impl<T: TravelTimeOracle + ?Sized> TravelTimeOracle for &T {
    fn prefetch(&self, origin: &str, targets: &[&str]) -> Result<()> {
        (**self).prefetch(origin, targets)
    }

    fn time(&self, origin: &str, target: &str) -> Result<f64> {
        (**self).time(origin, target)
    }
}

/// Resolves free-text queries (postcodes, addresses) to points.
///
/// Must return exactly one point per query, with `identifier` equal to the
/// query, or fail the whole call.
pub trait Geocoder {
    fn geocode(&self, queries: &[String]) -> Result<Vec<GeoPoint>>;
}

/// Supplies the delivery requests for a run.
pub trait RequestSource {
    fn fetch_requests(&self) -> Result<Vec<DeliveryRequest>>;
}
