//! Travel-time service doubles.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use delivery_planner::traits::TravelTimeService;
use delivery_planner::{GeoPoint, Result};

/// One recorded outbound query.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub origins: Vec<String>,
    pub targets: Vec<String>,
}

impl Query {
    pub fn cells(&self) -> usize {
        self.origins.len() * self.targets.len()
    }

    pub fn pairs(&self) -> Vec<(String, String)> {
        self.origins
            .iter()
            .flat_map(|o| self.targets.iter().map(move |t| (o.clone(), t.clone())))
            .collect()
    }
}

/// Wraps a service and records every query sent through it.
pub struct Counting<S> {
    inner: S,
    delay: Option<Duration>,
    queries: Mutex<Vec<Query>>,
}

impl<S> Counting<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            delay: None,
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Sleep inside every query, to widen race windows in concurrency tests.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn queries(&self) -> Vec<Query> {
        self.queries.lock().unwrap().clone()
    }

    pub fn query_count(&self) -> usize {
        self.queries.lock().unwrap().len()
    }

    pub fn all_pairs(&self) -> Vec<(String, String)> {
        self.queries().iter().flat_map(Query::pairs).collect()
    }
}

impl<S: TravelTimeService> TravelTimeService for Counting<S> {
    fn travel_times(&self, origins: &[GeoPoint], targets: &[GeoPoint]) -> Result<Vec<Vec<Option<f64>>>> {
        self.queries.lock().unwrap().push(Query {
            origins: origins.iter().map(|p| p.identifier.clone()).collect(),
            targets: targets.iter().map(|p| p.identifier.clone()).collect(),
        });
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        self.inner.travel_times(origins, targets)
    }
}

/// Answers from a fixed table of directed minutes; unknown pairs are `None`.
#[derive(Debug, Default, Clone)]
pub struct Scripted {
    minutes: HashMap<(String, String), f64>,
}

impl Scripted {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn directed(mut self, from: &str, to: &str, minutes: f64) -> Self {
        self.minutes.insert((from.to_string(), to.to_string()), minutes);
        self
    }

    pub fn both(self, a: &str, b: &str, minutes: f64) -> Self {
        self.directed(a, b, minutes).directed(b, a, minutes)
    }
}

impl TravelTimeService for Scripted {
    fn travel_times(&self, origins: &[GeoPoint], targets: &[GeoPoint]) -> Result<Vec<Vec<Option<f64>>>> {
        Ok(origins
            .iter()
            .map(|o| {
                targets
                    .iter()
                    .map(|t| {
                        self.minutes
                            .get(&(o.identifier.clone(), t.identifier.clone()))
                            .map(|minutes| minutes * 60.0)
                    })
                    .collect()
            })
            .collect())
    }
}

/// Euclidean distance on raw (lat, lng) numbers, one "degree" per minute.
/// Handy for hand-built planar layouts.
#[derive(Debug, Default, Clone, Copy)]
pub struct Planar;

impl TravelTimeService for Planar {
    fn travel_times(&self, origins: &[GeoPoint], targets: &[GeoPoint]) -> Result<Vec<Vec<Option<f64>>>> {
        Ok(origins
            .iter()
            .map(|o| {
                targets
                    .iter()
                    .map(|t| {
                        let dx = o.latitude - t.latitude;
                        let dy = o.longitude - t.longitude;
                        Some((dx * dx + dy * dy).sqrt() * 60.0)
                    })
                    .collect()
            })
            .collect())
    }
}

/// Always returns a matrix with no rows.
#[derive(Debug, Default, Clone, Copy)]
pub struct Empty;

impl TravelTimeService for Empty {
    fn travel_times(&self, _origins: &[GeoPoint], _targets: &[GeoPoint]) -> Result<Vec<Vec<Option<f64>>>> {
        Ok(Vec::new())
    }
}

/// Sleeps for `delay`, then panics instead of answering.
#[derive(Debug, Clone, Copy)]
pub struct Panicking {
    pub delay: Duration,
}

impl TravelTimeService for Panicking {
    fn travel_times(&self, _origins: &[GeoPoint], _targets: &[GeoPoint]) -> Result<Vec<Vec<Option<f64>>>> {
        std::thread::sleep(self.delay);
        panic!("travel-time service crashed");
    }
}
