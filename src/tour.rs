//! Closed depot tours: nearest-neighbour construction + first-improvement 2-opt.
//!
//! Travel times are pulled from the oracle lazily. Construction prefetches
//! only the edges out of the current position; 2-opt asks for the handful of
//! edges each candidate move would introduce.

use std::collections::HashSet;

use tracing::debug;

use crate::error::Result;
use crate::traits::TravelTimeOracle;

#[derive(Debug, Clone, PartialEq)]
pub struct Tour {
    /// Visiting order, depot excluded.
    pub stop_order: Vec<String>,
    /// Minutes along depot -> stops -> depot.
    pub drive_minutes: f64,
}

/// Build a closed tour from `depot` through every distinct stop.
///
/// Duplicate stops are visited once and stops equal to the depot are
/// dropped. A single stop yields `depot -> stop -> depot` without local search.
pub fn build_tour<O>(depot: &str, stops: &[String], oracle: &O, tolerance: f64) -> Result<Tour>
where
    O: TravelTimeOracle + ?Sized,
{
    let stops = distinct_stops(depot, stops);
    if stops.is_empty() {
        return Ok(Tour {
            stop_order: Vec::new(),
            drive_minutes: 0.0,
        });
    }

    let seed = nearest_neighbor(depot, &stops, oracle)?;
    let path = if stops.len() > 1 {
        two_opt(seed, oracle, tolerance)?
    } else {
        seed
    };

    let drive_minutes = path_drive_minutes(&path, oracle)?;
    debug!(depot, stops = stops.len(), drive_minutes, "tour built");

    Ok(Tour {
        stop_order: path[1..path.len() - 1].iter().map(|id| id.to_string()).collect(),
        drive_minutes,
    })
}

/// Greedy construction. Returns the closed path `[depot, .., depot]`.
///
/// Ties on travel time go to the lexicographically smaller identifier.
pub fn nearest_neighbor<'a, O>(depot: &'a str, stops: &[&'a str], oracle: &O) -> Result<Vec<&'a str>>
where
    O: TravelTimeOracle + ?Sized,
{
    let mut remaining = stops.to_vec();
    let mut path = Vec::with_capacity(stops.len() + 2);
    path.push(depot);
    let mut current = depot;

    while !remaining.is_empty() {
        oracle.prefetch(current, &remaining)?;

        let mut best: Option<(usize, f64)> = None;
        for (index, stop) in remaining.iter().enumerate() {
            let minutes = oracle.time(current, stop)?;
            let closer = match best {
                None => true,
                Some((best_index, best_minutes)) => minutes
                    .total_cmp(&best_minutes)
                    .then_with(|| stop.cmp(&remaining[best_index]))
                    .is_lt(),
            };
            if closer {
                best = Some((index, minutes));
            }
        }

        let Some((index, _)) = best else { break };
        current = remaining.remove(index);
        path.push(current);
    }

    path.push(depot);
    Ok(path)
}

/// First-improvement 2-opt over a closed path whose ends are the depot.
///
/// Reverses `path[i..=k]` whenever that saves more than `tolerance` minutes,
/// restarting the scan after each accepted move, until a full scan finds
/// nothing. Single-stop segments (adjacent edges) and the depot positions are
/// never moved.
pub fn two_opt<'a, O>(mut path: Vec<&'a str>, oracle: &O, tolerance: f64) -> Result<Vec<&'a str>>
where
    O: TravelTimeOracle + ?Sized,
{
    let n = path.len();
    if n < 4 {
        return Ok(path);
    }

    'scan: loop {
        for i in 1..n - 2 {
            for k in i + 1..n - 1 {
                if reversal_delta(&path, i, k, oracle)? < -tolerance {
                    path[i..=k].reverse();
                    continue 'scan;
                }
            }
        }
        return Ok(path);
    }
}

/// Sum of oracle times along consecutive path entries.
pub fn path_drive_minutes<O>(path: &[&str], oracle: &O) -> Result<f64>
where
    O: TravelTimeOracle + ?Sized,
{
    path.windows(2)
        .map(|edge| oracle.time(edge[0], edge[1]))
        .sum()
}

/// Change in drive time if `path[i..=k]` were reversed. Only the edges from
/// `path[i - 1]` to `path[k + 1]` change; inner edges flip direction.
fn reversal_delta<O>(path: &[&str], i: usize, k: usize, oracle: &O) -> Result<f64>
where
    O: TravelTimeOracle + ?Sized,
{
    let before = path_drive_minutes(&path[i - 1..=k + 1], oracle)?;

    let mut after = oracle.time(path[i - 1], path[k])?;
    for j in (i + 1..=k).rev() {
        after += oracle.time(path[j], path[j - 1])?;
    }
    after += oracle.time(path[i], path[k + 1])?;

    Ok(after - before)
}

fn distinct_stops<'a>(depot: &str, stops: &'a [String]) -> Vec<&'a str> {
    let mut seen = HashSet::new();
    stops
        .iter()
        .map(String::as_str)
        .filter(|stop| *stop != depot && seen.insert(*stop))
        .collect()
}
