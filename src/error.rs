//! Error taxonomy for a planning run.
//!
//! Every variant is fatal for the run that raised it. An over-long workday is
//! not an error; it is reported on the [`DayPlan`](crate::model::DayPlan).

use thiserror::Error;

pub type Result<T, E = PlanError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("no delivery requests to plan")]
    EmptyRequests,

    #[error("no coordinates known for location '{identifier}'")]
    MissingLocation { identifier: String },

    #[error("travel time from '{origin}' to '{target}' is unavailable")]
    DataUnavailable { origin: String, target: String },

    #[error("malformed travel-time matrix: {0}")]
    MalformedMatrix(String),

    #[error("travel-time query of {cells} cells exceeds the limit of {limit}")]
    CellBudgetExceeded { cells: usize, limit: usize },

    #[error("could not geocode '{query}'")]
    Geocoding { query: String },

    #[error("invalid record at row {row}: {reason}")]
    InvalidRecord { row: usize, reason: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("http transport failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("csv read failed: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("json decode failed: {0}")]
    Json(#[from] serde_json::Error),
}
