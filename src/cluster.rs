//! Proximity clustering of requests into day-groups.
//!
//! Requests are walked in a geography-first order and each joins the first
//! existing group whose *every* member lies within `max_group_km` of it, so a
//! group's diameter can never grow past the threshold through chaining.
//! Pure geometry: no travel-time queries are made here.

use std::cmp::Ordering;

use crate::error::{PlanError, Result};
use crate::haversine::distance_km;
use crate::model::{DeliveryRequest, GeoPoint, Locations};

/// Partition `requests` into non-empty day-groups.
///
/// Output does not depend on input row order. Every request's postcode must
/// resolve in `locations`.
pub fn cluster_by_proximity(
    requests: &[DeliveryRequest],
    locations: &Locations,
    max_group_km: f64,
) -> Result<Vec<Vec<DeliveryRequest>>> {
    if requests.is_empty() {
        return Err(PlanError::EmptyRequests);
    }

    let mut located = requests
        .iter()
        .map(|request| Ok((locations.get(&request.postcode)?, request)))
        .collect::<Result<Vec<(&GeoPoint, &DeliveryRequest)>>>()?;
    located.sort_by(|a, b| geography_order(a, b));

    let mut clusters: Vec<Vec<(&GeoPoint, &DeliveryRequest)>> = Vec::new();
    for (point, request) in located {
        let home = clusters.iter_mut().find(|cluster| {
            cluster
                .iter()
                .all(|(member, _)| distance_km(point, member) <= max_group_km)
        });

        match home {
            Some(cluster) => cluster.push((point, request)),
            None => clusters.push(vec![(point, request)]),
        }
    }

    Ok(clusters
        .into_iter()
        .map(|cluster| cluster.into_iter().map(|(_, request)| request.clone()).collect())
        .collect())
}

/// (latitude, longitude, desired_date, postcode).
fn geography_order(a: &(&GeoPoint, &DeliveryRequest), b: &(&GeoPoint, &DeliveryRequest)) -> Ordering {
    let (point_a, request_a) = a;
    let (point_b, request_b) = b;

    point_a
        .latitude
        .total_cmp(&point_b.latitude)
        .then_with(|| point_a.longitude.total_cmp(&point_b.longitude))
        .then_with(|| request_a.desired_date.cmp(&request_b.desired_date))
        .then_with(|| request_a.postcode.cmp(&request_b.postcode))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, day).unwrap()
    }

    fn request(name: &str, postcode: &str, day: u32) -> DeliveryRequest {
        DeliveryRequest::new(name, postcode, date(day))
    }

    /// Points strung out along a meridian, ~1.11 km per 0.01 degree.
    fn line_locations() -> Locations {
        vec![
            GeoPoint::new("P0", 51.00, -1.0),
            GeoPoint::new("P1", 51.05, -1.0), // ~5.6 km from P0
            GeoPoint::new("P2", 51.10, -1.0), // ~5.6 km from P1, ~11.1 km from P0
            GeoPoint::new("FAR", 52.00, -1.0),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn empty_input_is_an_error() {
        let err = cluster_by_proximity(&[], &line_locations(), 12.0).unwrap_err();
        assert!(matches!(err, PlanError::EmptyRequests));
    }

    #[test]
    fn missing_location_fails_instead_of_skipping() {
        let requests = vec![request("a", "P0", 1), request("b", "NOWHERE", 1)];
        let err = cluster_by_proximity(&requests, &line_locations(), 12.0).unwrap_err();
        assert!(matches!(err, PlanError::MissingLocation { .. }));
    }

    #[test]
    fn identical_coordinates_share_a_cluster() {
        let requests = vec![request("a", "P1", 3), request("b", "P1", 1), request("c", "P1", 2)];
        let clusters = cluster_by_proximity(&requests, &line_locations(), 0.0).unwrap();
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].len(), 3);
    }

    #[test]
    fn no_chaining_past_the_threshold() {
        // P0-P1 and P1-P2 are within 6 km, but P0-P2 is not.
        let requests = vec![request("a", "P0", 1), request("b", "P1", 1), request("c", "P2", 1)];
        let clusters = cluster_by_proximity(&requests, &line_locations(), 6.0).unwrap();

        assert_eq!(clusters.len(), 2);
        let locations = line_locations();
        for cluster in &clusters {
            for a in cluster {
                for b in cluster {
                    let pa = locations.get(&a.postcode).unwrap();
                    let pb = locations.get(&b.postcode).unwrap();
                    assert!(distance_km(pa, pb) <= 6.0);
                }
            }
        }
    }

    #[test]
    fn output_ignores_input_order() {
        let forward = vec![
            request("a", "P0", 1),
            request("b", "FAR", 2),
            request("c", "P2", 3),
            request("d", "P1", 4),
        ];
        let mut backward = forward.clone();
        backward.reverse();

        let locations = line_locations();
        assert_eq!(
            cluster_by_proximity(&forward, &locations, 12.0).unwrap(),
            cluster_by_proximity(&backward, &locations, 12.0).unwrap()
        );
    }

    #[test]
    fn clusters_partition_the_input() {
        let requests = vec![
            request("a", "P0", 1),
            request("b", "FAR", 2),
            request("c", "P2", 3),
            request("d", "P1", 4),
            request("e", "P1", 4),
        ];
        let clusters = cluster_by_proximity(&requests, &line_locations(), 6.0).unwrap();

        assert!(clusters.iter().all(|cluster| !cluster.is_empty()));
        let mut seen: Vec<&DeliveryRequest> = clusters.iter().flatten().collect();
        assert_eq!(seen.len(), requests.len());
        seen.sort_by(|a, b| a.recipient.cmp(&b.recipient));
        let mut expected: Vec<&DeliveryRequest> = requests.iter().collect();
        expected.sort_by(|a, b| a.recipient.cmp(&b.recipient));
        assert_eq!(seen, expected);
    }
}
