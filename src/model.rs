//! Value types shared by every stage of a planning run.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{PlanError, Result};

/// A geocoded location. `identifier` is the join key every other component uses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub identifier: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(identifier: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            identifier: identifier.into(),
            latitude,
            longitude,
        }
    }

    /// (lat, lng) pair.
    pub fn coords(&self) -> (f64, f64) {
        (self.latitude, self.longitude)
    }
}

/// One row of the delivery sheet.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeliveryRequest {
    pub recipient: String,
    pub postcode: String,
    /// Latest acceptable delivery date.
    pub desired_date: NaiveDate,
    pub notes: Option<String>,
}

impl DeliveryRequest {
    pub fn new(recipient: impl Into<String>, postcode: impl Into<String>, desired_date: NaiveDate) -> Self {
        Self {
            recipient: recipient.into(),
            postcode: postcode.into(),
            desired_date,
            notes: None,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// Identifier -> point lookup. Absence of an identifier is a hard failure.
#[derive(Debug, Clone, Default)]
pub struct Locations {
    points: HashMap<String, GeoPoint>,
}

impl Locations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, point: GeoPoint) {
        self.points.insert(point.identifier.clone(), point);
    }

    pub fn get(&self, identifier: &str) -> Result<&GeoPoint> {
        self.points
            .get(identifier)
            .ok_or_else(|| PlanError::MissingLocation {
                identifier: identifier.to_string(),
            })
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.points.contains_key(identifier)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Fails on the first request whose postcode has no point.
    pub fn ensure_covers(&self, requests: &[DeliveryRequest]) -> Result<()> {
        for request in requests {
            self.get(&request.postcode)?;
        }
        Ok(())
    }
}

impl FromIterator<GeoPoint> for Locations {
    fn from_iter<I: IntoIterator<Item = GeoPoint>>(iter: I) -> Self {
        let mut locations = Locations::new();
        for point in iter {
            locations.insert(point);
        }
        locations
    }
}

impl Extend<GeoPoint> for Locations {
    fn extend<I: IntoIterator<Item = GeoPoint>>(&mut self, iter: I) {
        for point in iter {
            self.insert(point);
        }
    }
}

/// The plan for one delivery day. Built once by
/// [`DayPlan::assemble`](crate::day_plan) and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayPlan {
    pub(crate) date: NaiveDate,
    pub(crate) requests: Vec<DeliveryRequest>,
    pub(crate) stop_order: Vec<String>,
    pub(crate) drive_minutes: f64,
    pub(crate) service_minutes: f64,
    pub(crate) feasible: bool,
    pub(crate) reason: Option<String>,
}

impl DayPlan {
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn requests(&self) -> &[DeliveryRequest] {
        &self.requests
    }

    /// Visiting order of stop identifiers, depot excluded.
    pub fn stop_order(&self) -> &[String] {
        &self.stop_order
    }

    pub fn drive_minutes(&self) -> f64 {
        self.drive_minutes
    }

    pub fn service_minutes(&self) -> f64 {
        self.service_minutes
    }

    pub fn total_minutes(&self) -> f64 {
        self.drive_minutes + self.service_minutes
    }

    pub fn feasible(&self) -> bool {
        self.feasible
    }

    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }
}
