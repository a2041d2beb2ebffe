//! Delivery sheet exported as CSV.
//!
//! The first row is a header. Columns are matched case-insensitively after
//! trimming; `recipient`, `postcode` and `desired_date` are required and
//! `notes` is optional. Row numbers in errors count the header as row 1.

use std::collections::HashMap;
use std::io::Read;
use std::path::PathBuf;

use chrono::NaiveDate;

use crate::error::{PlanError, Result};
use crate::model::DeliveryRequest;
use crate::traits::RequestSource;

const REQUIRED_HEADERS: [&str; 3] = ["recipient", "postcode", "desired_date"];

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y", "%A, %B %d, %Y"];

#[derive(Debug, Clone)]
pub struct CsvRequestSource {
    path: PathBuf,
}

impl CsvRequestSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RequestSource for CsvRequestSource {
    fn fetch_requests(&self) -> Result<Vec<DeliveryRequest>> {
        let file = std::fs::File::open(&self.path)?;
        read_requests(file)
    }
}

/// Parse delivery requests from any CSV reader.
pub fn read_requests<R: Read>(reader: R) -> Result<Vec<DeliveryRequest>> {
    let mut csv = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let columns: HashMap<String, usize> = csv
        .headers()?
        .iter()
        .enumerate()
        .map(|(index, name)| (name.trim().to_lowercase(), index))
        .collect();

    let missing: Vec<&str> = REQUIRED_HEADERS
        .iter()
        .copied()
        .filter(|name| !columns.contains_key(*name))
        .collect();
    if !missing.is_empty() {
        return Err(PlanError::InvalidRecord {
            row: 1,
            reason: format!("missing columns: {}", missing.join(", ")),
        });
    }

    let mut requests = Vec::new();
    for (offset, record) in csv.records().enumerate() {
        let record = record?;
        let row = offset + 2;
        let field = |name: &str| {
            columns
                .get(name)
                .and_then(|index| record.get(*index))
                .unwrap_or("")
                .trim()
        };

        let postcode = field("postcode");
        if postcode.is_empty() {
            return Err(PlanError::InvalidRecord {
                row,
                reason: "postcode is empty".to_string(),
            });
        }

        let raw_date = field("desired_date");
        let desired_date = parse_date(raw_date).ok_or_else(|| PlanError::InvalidRecord {
            row,
            reason: format!("unrecognized date value '{raw_date}'"),
        })?;

        let notes = Some(field("notes")).filter(|notes| !notes.is_empty());

        requests.push(DeliveryRequest {
            recipient: field("recipient").to_string(),
            postcode: postcode.to_string(),
            desired_date,
            notes: notes.map(str::to_string),
        });
    }

    Ok(requests)
}

/// ISO first, then day-first, month-first and long-form dates.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
}
