//! delivery-planner core
//!
//! Clusters delivery requests into workdays and builds a single-vehicle
//! depot tour for each day, treating travel-time lookups as a budgeted,
//! cached resource.

pub mod error;
pub mod config;
pub mod model;
pub mod traits;
pub mod haversine;
pub mod oracle;
pub mod cluster;
pub mod tour;
pub mod day_plan;
pub mod planner;
pub mod osrm;
pub mod geoapify;
pub mod csv_source;

pub use config::PlannerConfig;
pub use error::{PlanError, Result};
pub use model::{DayPlan, DeliveryRequest, GeoPoint, Locations};
