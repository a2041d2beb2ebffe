//! OSRM `table` adapter for travel times.

use serde::Deserialize;

use crate::error::{PlanError, Result};
use crate::model::GeoPoint;
use crate::traits::TravelTimeService;

#[derive(Debug, Clone)]
pub struct OsrmConfig {
    pub base_url: String,
    pub profile: String,
    pub timeout_secs: u64,
}

impl Default for OsrmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            profile: "car".to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OsrmClient {
    config: OsrmConfig,
    client: reqwest::blocking::Client,
}

impl OsrmClient {
    pub fn new(config: OsrmConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }
}

impl TravelTimeService for OsrmClient {
    fn travel_times(&self, origins: &[GeoPoint], targets: &[GeoPoint]) -> Result<Vec<Vec<Option<f64>>>> {
        if origins.is_empty() || targets.is_empty() {
            return Ok(Vec::new());
        }

        let url = table_url(&self.config, origins, targets);
        let body = self
            .client
            .get(url)
            .send()?
            .error_for_status()?
            .json::<OsrmTableResponse>()?;

        durations_from(body, origins.len(), targets.len())
    }
}

/// Origins are listed first, then targets; `sources`/`destinations` select
/// the rectangle so only origins x targets cells are computed.
fn table_url(config: &OsrmConfig, origins: &[GeoPoint], targets: &[GeoPoint]) -> String {
    let coords = origins
        .iter()
        .chain(targets)
        .map(|point| format!("{:.6},{:.6}", point.longitude, point.latitude))
        .collect::<Vec<_>>()
        .join(";");
    let sources = index_list(0..origins.len());
    let destinations = index_list(origins.len()..origins.len() + targets.len());

    format!(
        "{}/table/v1/{}/{}?sources={}&destinations={}&annotations=duration",
        config.base_url.trim_end_matches('/'),
        config.profile,
        coords,
        sources,
        destinations
    )
}

fn index_list(range: std::ops::Range<usize>) -> String {
    range.map(|i| i.to_string()).collect::<Vec<_>>().join(";")
}

fn durations_from(body: OsrmTableResponse, rows: usize, columns: usize) -> Result<Vec<Vec<Option<f64>>>> {
    if body.code != "Ok" {
        return Err(PlanError::MalformedMatrix(format!(
            "OSRM responded {}: {}",
            body.code,
            body.message.unwrap_or_default()
        )));
    }

    let durations = body
        .durations
        .ok_or_else(|| PlanError::MalformedMatrix("OSRM response has no durations".into()))?;
    if durations.len() != rows || durations.iter().any(|row| row.len() != columns) {
        return Err(PlanError::MalformedMatrix(format!(
            "OSRM table is not {rows}x{columns}"
        )));
    }
    Ok(durations)
}

#[derive(Debug, Deserialize)]
struct OsrmTableResponse {
    code: String,
    message: Option<String>,
    durations: Option<Vec<Vec<Option<f64>>>>,
}
