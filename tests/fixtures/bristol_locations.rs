//! Bristol / Bath postcode centroids for realistic test fixtures.

use delivery_planner::{GeoPoint, Locations};

/// A named location with coordinates.
#[derive(Debug, Clone)]
pub struct Location {
    pub postcode: &'static str,
    pub lat: f64,
    pub lng: f64,
}

impl Location {
    pub const fn new(postcode: &'static str, lat: f64, lng: f64) -> Self {
        Self { postcode, lat, lng }
    }

    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.postcode, self.lat, self.lng)
    }
}

// ============================================================================
// Depot
// ============================================================================

pub const DEPOT: Location = Location::new("Depot", 51.4500, -2.5800);

// ============================================================================
// Central Bristol (all within a few km of each other)
// ============================================================================

pub const CENTRAL: &[Location] = &[
    Location::new("BS1 4DJ", 51.4490, -2.5970),
    Location::new("BS1 6QF", 51.4545, -2.5879),
    Location::new("BS2 0JA", 51.4611, -2.5810),
    Location::new("BS3 1AA", 51.4410, -2.6020),
    Location::new("BS4 3EH", 51.4380, -2.5590),
    Location::new("BS5 9QP", 51.4630, -2.5520),
    Location::new("BS6 5LX", 51.4700, -2.5990),
    Location::new("BS8 1TH", 51.4560, -2.6050),
];

// ============================================================================
// Bath (~18 km east of central Bristol)
// ============================================================================

pub const BATH: &[Location] = &[
    Location::new("BA1 1LZ", 51.3811, -2.3590),
    Location::new("BA1 2QH", 51.3860, -2.3700),
    Location::new("BA2 4BH", 51.3740, -2.3560),
];

/// Three stops 3 km from [`DEPOT`] at bearings 0, 45 and 90 degrees.
pub const RING: &[Location] = &[
    Location::new("RING-N", 51.476980, -2.580000),
    Location::new("RING-NE", 51.469077, -2.549394),
    Location::new("RING-E", 51.450000, -2.536716),
];

pub fn locations_of(sets: &[&[Location]]) -> Locations {
    sets.iter()
        .flat_map(|set| set.iter())
        .map(Location::point)
        .chain(std::iter::once(DEPOT.point()))
        .collect()
}
