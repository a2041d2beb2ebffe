//! Geoapify adapter: postcode geocoding and sparse route matrices.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{PlanError, Result};
use crate::model::GeoPoint;
use crate::traits::{Geocoder, TravelTimeService};

/// Geoapify rejects matrices with more than this many source x target cells.
pub const GEOAPIFY_MAX_CELLS: usize = 1000;

#[derive(Debug, Clone)]
pub struct GeoapifyConfig {
    pub api_key: String,
    pub base_url: String,
    /// Routing mode, e.g. "drive".
    pub mode: String,
    /// ISO country code narrowing geocoding results, e.g. "gb".
    pub country: Option<String>,
    pub timeout_secs: u64,
}

impl Default for GeoapifyConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://api.geoapify.com".to_string(),
            mode: "drive".to_string(),
            country: None,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GeoapifyClient {
    config: GeoapifyConfig,
    client: reqwest::blocking::Client,
}

impl GeoapifyClient {
    pub fn new(config: GeoapifyConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(PlanError::InvalidConfig("Geoapify API key is required".into()));
        }

        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    fn geocode_query(&self, query: &str) -> Result<GeoPoint> {
        let mut params = vec![
            ("text", query.to_string()),
            ("format", "json".to_string()),
            ("limit", "1".to_string()),
            ("apiKey", self.config.api_key.clone()),
        ];
        if let Some(country) = &self.config.country {
            params.push(("filter", format!("countrycode:{country}")));
        }

        let body = self
            .client
            .get(format!("{}/v1/geocode/search", self.config.base_url))
            .query(&params)
            .send()?
            .error_for_status()?
            .json::<GeocodeResponse>()?;

        point_from(body, query)
    }
}

impl Geocoder for GeoapifyClient {
    fn geocode(&self, queries: &[String]) -> Result<Vec<GeoPoint>> {
        queries
            .iter()
            .map(|query| self.geocode_query(query))
            .collect()
    }
}

impl TravelTimeService for GeoapifyClient {
    fn travel_times(&self, origins: &[GeoPoint], targets: &[GeoPoint]) -> Result<Vec<Vec<Option<f64>>>> {
        let cells = origins.len() * targets.len();
        if cells > GEOAPIFY_MAX_CELLS {
            return Err(PlanError::CellBudgetExceeded {
                cells,
                limit: GEOAPIFY_MAX_CELLS,
            });
        }
        if cells == 0 {
            return Ok(Vec::new());
        }

        debug!(origins = origins.len(), targets = targets.len(), "geoapify routematrix");
        let request = MatrixRequest::new(&self.config.mode, origins, targets);
        let body = self
            .client
            .post(format!("{}/v1/routematrix", self.config.base_url))
            .query(&[("apiKey", self.config.api_key.as_str())])
            .json(&request)
            .send()?
            .error_for_status()?
            .json::<MatrixResponse>()?;

        times_from(body, origins.len(), targets.len())
    }
}

fn point_from(body: GeocodeResponse, query: &str) -> Result<GeoPoint> {
    body.results
        .into_iter()
        .next()
        .map(|result| GeoPoint::new(query, result.lat, result.lon))
        .ok_or_else(|| PlanError::Geocoding {
            query: query.to_string(),
        })
}

fn times_from(body: MatrixResponse, rows: usize, columns: usize) -> Result<Vec<Vec<Option<f64>>>> {
    if body.sources_to_targets.is_empty() {
        return Err(PlanError::MalformedMatrix("Geoapify returned an empty matrix".into()));
    }
    if body.sources_to_targets.len() != rows {
        return Err(PlanError::MalformedMatrix(format!(
            "expected {rows} rows, got {}",
            body.sources_to_targets.len()
        )));
    }

    let mut matrix = vec![vec![None; columns]; rows];
    for (row_index, row) in body.sources_to_targets.into_iter().enumerate() {
        if row.len() != columns {
            return Err(PlanError::MalformedMatrix(format!(
                "row {row_index} has {} cells, expected {columns}",
                row.len()
            )));
        }
        for (column_index, cell) in row.into_iter().enumerate() {
            let source = cell.source_index.unwrap_or(row_index);
            let target = cell.target_index.unwrap_or(column_index);
            let slot = matrix
                .get_mut(source)
                .and_then(|r| r.get_mut(target))
                .ok_or_else(|| {
                    PlanError::MalformedMatrix(format!("cell index ({source}, {target}) out of range"))
                })?;
            *slot = cell.time;
        }
    }
    Ok(matrix)
}

#[derive(Debug, Serialize)]
struct MatrixRequest {
    mode: String,
    sources: Vec<MatrixLocation>,
    targets: Vec<MatrixLocation>,
}

impl MatrixRequest {
    fn new(mode: &str, origins: &[GeoPoint], targets: &[GeoPoint]) -> Self {
        Self {
            mode: mode.to_string(),
            sources: origins.iter().map(MatrixLocation::from).collect(),
            targets: targets.iter().map(MatrixLocation::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
struct MatrixLocation {
    /// [lon, lat]
    location: [f64; 2],
}

impl From<&GeoPoint> for MatrixLocation {
    fn from(point: &GeoPoint) -> Self {
        Self {
            location: [point.longitude, point.latitude],
        }
    }
}

#[derive(Debug, Deserialize)]
struct MatrixResponse {
    #[serde(default)]
    sources_to_targets: Vec<Vec<MatrixCell>>,
}

#[derive(Debug, Deserialize)]
struct MatrixCell {
    /// Seconds; null when no route exists.
    time: Option<f64>,
    source_index: Option<usize>,
    target_index: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    lat: f64,
    lon: f64,
}
