//! Day plan assembly and feasibility verdict.

use std::fmt;

use chrono::NaiveDate;

use crate::model::{DayPlan, DeliveryRequest};

impl DayPlan {
    /// Combine a tour with service time and check it against the workday.
    ///
    /// The limit is inclusive. An over-long day is still returned, with
    /// `feasible == false` and a reason quoting the computed total.
    pub fn assemble(
        date: NaiveDate,
        requests: Vec<DeliveryRequest>,
        stop_order: Vec<String>,
        drive_minutes: f64,
        service_minutes_per_stop: f64,
        max_workday_minutes: f64,
    ) -> Self {
        let service_minutes = requests.len() as f64 * service_minutes_per_stop;
        let total_minutes = drive_minutes + service_minutes;
        let feasible = total_minutes <= max_workday_minutes;
        let reason = (!feasible).then(|| {
            format!(
                "Estimated {total_minutes:.1} min exceeds workday limit ({total_minutes:.1} > {max_workday_minutes:.1} min)"
            )
        });

        Self {
            date,
            requests,
            stop_order,
            drive_minutes,
            service_minutes,
            feasible,
            reason,
        }
    }
}

impl fmt::Display for DayPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== {} ===", self.date.format("%Y-%m-%d"))?;
        writeln!(f, "Stops: {}", self.requests.len())?;

        write!(f, "Route: Depot")?;
        for stop in &self.stop_order {
            write!(f, " -> {stop}")?;
        }
        writeln!(f, " -> Depot")?;

        writeln!(f, "Drive time: {:.1} min", self.drive_minutes)?;
        writeln!(f, "Service time: {:.1} min", self.service_minutes)?;
        writeln!(f, "Total: {:.1} min", self.total_minutes())?;
        match &self.reason {
            None => write!(f, "Feasible within workday."),
            Some(reason) => write!(f, "Not feasible: {reason}"),
        }
    }
}
