//! Planning budgets, passed explicitly into every component.

use serde::{Deserialize, Serialize};

use crate::error::{PlanError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Maximum origins x targets cells in a single travel-time query.
    pub max_cells: usize,
    /// Minutes spent at each delivery.
    pub service_minutes_per_stop: f64,
    /// Drive plus service minutes allowed in one workday (inclusive).
    pub max_workday_minutes: f64,
    /// Maximum great-circle separation between any two members of a day-group.
    pub max_group_km: f64,
    /// A 2-opt move must save more than this many minutes to be accepted.
    pub improvement_tolerance: f64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            max_cells: 1000,
            service_minutes_per_stop: 10.0,
            max_workday_minutes: 8.0 * 60.0,
            max_group_km: 12.0,
            improvement_tolerance: 1e-6,
        }
    }
}

impl PlannerConfig {
    /// Parse a (possibly partial) JSON document; absent fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_cells == 0 {
            return Err(PlanError::InvalidConfig("max_cells must be at least 1".into()));
        }

        let non_negative = [
            ("service_minutes_per_stop", self.service_minutes_per_stop),
            ("max_workday_minutes", self.max_workday_minutes),
            ("max_group_km", self.max_group_km),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(PlanError::InvalidConfig(format!(
                    "{name} must be a finite, non-negative number (got {value})"
                )));
            }
        }

        if !self.improvement_tolerance.is_finite() || self.improvement_tolerance <= 0.0 {
            return Err(PlanError::InvalidConfig(format!(
                "improvement_tolerance must be a finite, positive number (got {})",
                self.improvement_tolerance
            )));
        }

        Ok(())
    }
}
