//! End-to-end planning: requests -> day-groups -> tours -> day plans.

use std::collections::BTreeSet;

use rayon::prelude::*;
use tracing::{info, warn};

use crate::cluster::cluster_by_proximity;
use crate::config::PlannerConfig;
use crate::error::{PlanError, Result};
use crate::model::{DayPlan, DeliveryRequest, GeoPoint, Locations};
use crate::oracle::DistanceOracle;
use crate::tour::build_tour;
use crate::traits::{Geocoder, RequestSource, TravelTimeOracle, TravelTimeService};

/// Plan every request into dated, single-vehicle day plans.
///
/// Each day-group is dated with the earliest `desired_date` among its
/// members. Groups are routed in parallel against one shared oracle; plans
/// come back sorted by date.
pub fn plan_routes<S>(
    requests: &[DeliveryRequest],
    depot: &GeoPoint,
    locations: &Locations,
    travel_times: S,
    config: &PlannerConfig,
) -> Result<Vec<DayPlan>>
where
    S: TravelTimeService + Sync,
{
    config.validate()?;
    if requests.is_empty() {
        return Err(PlanError::EmptyRequests);
    }
    locations.ensure_covers(requests)?;

    let clusters = cluster_by_proximity(requests, locations, config.max_group_km)?;
    info!(
        requests = requests.len(),
        clusters = clusters.len(),
        max_group_km = config.max_group_km,
        "clustered delivery requests"
    );

    let mut oracle_locations = Locations::new();
    oracle_locations.insert(depot.clone());
    for request in requests {
        oracle_locations.insert(locations.get(&request.postcode)?.clone());
    }
    let oracle = DistanceOracle::new(travel_times, oracle_locations, config.max_cells);

    let mut plans = clusters
        .into_par_iter()
        .map(|cluster| plan_cluster(cluster, &depot.identifier, &oracle, config))
        .collect::<Result<Vec<DayPlan>>>()?;
    plans.sort_by_key(|plan| plan.date());

    info!(
        plans = plans.len(),
        queries = oracle.query_count(),
        cached_pairs = oracle.cached_pairs(),
        "planning finished"
    );
    Ok(plans)
}

fn plan_cluster<O>(
    cluster: Vec<DeliveryRequest>,
    depot_id: &str,
    oracle: &O,
    config: &PlannerConfig,
) -> Result<DayPlan>
where
    O: TravelTimeOracle + ?Sized,
{
    let date = cluster
        .iter()
        .map(|request| request.desired_date)
        .min()
        .ok_or(PlanError::EmptyRequests)?;

    let stops: Vec<String> = cluster.iter().map(|request| request.postcode.clone()).collect();
    let tour = build_tour(depot_id, &stops, oracle, config.improvement_tolerance)?;

    let plan = DayPlan::assemble(
        date,
        cluster,
        tour.stop_order,
        tour.drive_minutes,
        config.service_minutes_per_stop,
        config.max_workday_minutes,
    );

    if plan.feasible() {
        info!(%date, stops = plan.stop_order().len(), total_minutes = plan.total_minutes(), "day plan feasible");
    } else {
        warn!(%date, stops = plan.stop_order().len(), reason = plan.reason(), "day plan infeasible");
    }
    Ok(plan)
}

/// Fetch requests, geocode the depot and every postcode, then plan.
pub fn plan_deliveries<R, G, S>(
    source: &R,
    geocoder: &G,
    travel_times: S,
    depot_query: &str,
    config: &PlannerConfig,
) -> Result<Vec<DayPlan>>
where
    R: RequestSource + ?Sized,
    G: Geocoder + ?Sized,
    S: TravelTimeService + Sync,
{
    let requests = source.fetch_requests()?;
    if requests.is_empty() {
        return Err(PlanError::EmptyRequests);
    }

    let depot = geocode_one(geocoder, depot_query)?;

    let postcodes: Vec<String> = requests
        .iter()
        .map(|request| request.postcode.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let points = geocoder.geocode(&postcodes)?;
    let locations: Locations = points.into_iter().collect();
    for postcode in &postcodes {
        if !locations.contains(postcode) {
            return Err(PlanError::Geocoding {
                query: postcode.clone(),
            });
        }
    }

    plan_routes(&requests, &depot, &locations, travel_times, config)
}

fn geocode_one<G>(geocoder: &G, query: &str) -> Result<GeoPoint>
where
    G: Geocoder + ?Sized,
{
    geocoder
        .geocode(&[query.to_string()])?
        .into_iter()
        .find(|point| point.identifier == query)
        .ok_or_else(|| PlanError::Geocoding {
            query: query.to_string(),
        })
}
