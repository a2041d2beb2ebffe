//! Budgeted, caching travel-time oracle.
//!
//! Travel-time lookups are the expensive part of a planning run, so every
//! directed pair is paid for at most once:
//!
//! - pairs are resolved per origin, in chunks of at most `max_cells` targets;
//! - results are cached for the lifetime of the oracle and never evicted;
//! - `(A, B)` never implies `(B, A)`;
//! - a pair is claimed by exactly one in-flight query; concurrent callers
//!   needing the same pair wait for it instead of querying it again;
//! - a pair whose query failed (or panicked) is remembered as unavailable
//!   and never queried again.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

use tracing::debug;

use crate::error::{PlanError, Result};
use crate::model::{GeoPoint, Locations};
use crate::traits::{TravelTimeOracle, TravelTimeService};

type Pair = (String, String);

#[derive(Debug, Default)]
struct CacheState {
    minutes: HashMap<Pair, f64>,
    in_flight: HashSet<Pair>,
    failed: HashSet<Pair>,
}

pub struct DistanceOracle<S> {
    service: S,
    locations: Locations,
    max_cells: usize,
    state: Mutex<CacheState>,
    resolved: Condvar,
    queries: AtomicUsize,
}

impl<S: TravelTimeService> DistanceOracle<S> {
    /// `max_cells` below 1 is treated as 1.
    pub fn new(service: S, locations: Locations, max_cells: usize) -> Self {
        Self {
            service,
            locations,
            max_cells: max_cells.max(1),
            state: Mutex::new(CacheState::default()),
            resolved: Condvar::new(),
            queries: AtomicUsize::new(0),
        }
    }

    /// Number of external queries issued so far.
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    /// Number of directed pairs currently cached.
    pub fn cached_pairs(&self) -> usize {
        self.lock_state().minutes.len()
    }

    pub fn cached(&self, origin: &str, target: &str) -> Option<f64> {
        if origin == target {
            return Some(0.0);
        }
        self.lock_state()
            .minutes
            .get(&(origin.to_string(), target.to_string()))
            .copied()
    }

    /// Resolve every `origin -> target` pair that is not cached yet.
    ///
    /// Origins and targets are deduplicated in order; same-identifier pairs
    /// are skipped.
    pub fn ensure_times<'a>(
        &self,
        origins: impl IntoIterator<Item = &'a str>,
        targets: impl IntoIterator<Item = &'a str>,
    ) -> Result<()> {
        let origins = dedupe(origins);
        let targets = dedupe(targets);

        for origin in origins {
            self.ensure_from(origin, &targets)?;
        }
        Ok(())
    }

    fn ensure_from<'a>(&self, origin: &'a str, targets: &[&'a str]) -> Result<()> {
        // Unknown identifiers fail up front and never mark a pair as failed.
        self.locations.get(origin)?;
        for target in targets {
            self.locations.get(target)?;
        }

        loop {
            let claim = self.claim(origin, targets)?;
            if claim.targets.is_empty() {
                return Ok(());
            }

            let times = self.fetch(origin, &claim.targets)?;

            let mut state = self.lock_state();
            for (target, minutes) in times {
                state.minutes.insert((origin.to_string(), target), minutes);
            }
            drop(state);
            drop(claim);
        }
    }

    /// Marks the unresolved, unclaimed pairs as in flight and returns them as
    /// a claim. Blocks while everything still missing is being fetched by
    /// another caller; an empty claim means all pairs are cached. Fails as
    /// soon as one pair is known to be unavailable.
    fn claim<'a>(&self, origin: &'a str, targets: &[&'a str]) -> Result<Claim<'_, 'a, S>> {
        let mut state = self.lock_state();
        loop {
            let mut claimed = Vec::new();
            let mut waiting = false;

            for target in targets {
                if *target == origin {
                    continue;
                }
                let key = (origin.to_string(), target.to_string());
                if state.minutes.contains_key(&key) {
                    continue;
                }
                if state.failed.contains(&key) {
                    return Err(PlanError::DataUnavailable {
                        origin: origin.to_string(),
                        target: target.to_string(),
                    });
                }
                if state.in_flight.contains(&key) {
                    waiting = true;
                    continue;
                }
                claimed.push(*target);
            }

            if claimed.is_empty() && waiting {
                state = self
                    .resolved
                    .wait(state)
                    .unwrap_or_else(PoisonError::into_inner);
                continue;
            }

            for target in &claimed {
                state.in_flight.insert((origin.to_string(), target.to_string()));
            }
            return Ok(Claim {
                oracle: self,
                origin,
                targets: claimed,
            });
        }
    }

    fn fetch(&self, origin: &str, targets: &[&str]) -> Result<Vec<(String, f64)>> {
        let origin_point = self.locations.get(origin)?.clone();
        let mut times = Vec::with_capacity(targets.len());

        // With a single origin the cell count equals the chunk length.
        for chunk in targets.chunks(self.max_cells) {
            let points = chunk
                .iter()
                .map(|target| self.locations.get(target).cloned())
                .collect::<Result<Vec<GeoPoint>>>()?;

            debug!(origin, targets = chunk.len(), "querying travel times");
            self.queries.fetch_add(1, Ordering::SeqCst);
            let matrix = self
                .service
                .travel_times(std::slice::from_ref(&origin_point), &points)?;

            let row = single_row(matrix, chunk.len())?;
            for (target, seconds) in chunk.iter().zip(row) {
                match seconds {
                    Some(seconds) if seconds.is_finite() && seconds >= 0.0 => {
                        times.push((target.to_string(), seconds / 60.0));
                    }
                    _ => {
                        return Err(PlanError::DataUnavailable {
                            origin: origin.to_string(),
                            target: target.to_string(),
                        });
                    }
                }
            }
        }

        Ok(times)
    }
}

impl<S> DistanceOracle<S> {
    fn lock_state(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Pairs one caller is fetching on behalf of everyone.
///
/// Dropping the claim takes its pairs out of flight and wakes waiters. Any
/// pair still uncached at that point is recorded as failed, whether the
/// fetch returned an error or the service panicked.
struct Claim<'o, 'a, S> {
    oracle: &'o DistanceOracle<S>,
    origin: &'a str,
    targets: Vec<&'a str>,
}

impl<S> Drop for Claim<'_, '_, S> {
    fn drop(&mut self) {
        if self.targets.is_empty() {
            return;
        }

        let mut state = self.oracle.lock_state();
        for target in &self.targets {
            let key = (self.origin.to_string(), target.to_string());
            state.in_flight.remove(&key);
            if !state.minutes.contains_key(&key) {
                state.failed.insert(key);
            }
        }
        drop(state);
        self.oracle.resolved.notify_all();
    }
}

impl<S: TravelTimeService> TravelTimeOracle for DistanceOracle<S> {
    fn prefetch(&self, origin: &str, targets: &[&str]) -> Result<()> {
        self.ensure_times([origin], targets.iter().copied())
    }

    fn time(&self, origin: &str, target: &str) -> Result<f64> {
        if let Some(minutes) = self.cached(origin, target) {
            return Ok(minutes);
        }

        self.ensure_times([origin], [target])?;
        self.cached(origin, target)
            .ok_or_else(|| PlanError::DataUnavailable {
                origin: origin.to_string(),
                target: target.to_string(),
            })
    }
}

fn single_row(matrix: Vec<Vec<Option<f64>>>, expected: usize) -> Result<Vec<Option<f64>>> {
    if matrix.is_empty() {
        return Err(PlanError::MalformedMatrix("service returned no rows".into()));
    }
    if matrix.len() != 1 {
        return Err(PlanError::MalformedMatrix(format!(
            "expected 1 row, got {}",
            matrix.len()
        )));
    }

    let row = matrix.into_iter().next().unwrap_or_default();
    if row.len() != expected {
        return Err(PlanError::MalformedMatrix(format!(
            "expected {} columns, got {}",
            expected,
            row.len()
        )));
    }
    Ok(row)
}

fn dedupe<'a>(ids: impl IntoIterator<Item = &'a str>) -> Vec<&'a str> {
    let mut seen = HashSet::new();
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}
