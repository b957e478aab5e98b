//! The record appended to the spreadsheet for each submission.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::error::CoreError;
use crate::fields::FormFields;
use crate::format::iso_timestamp;
use crate::rank::{find_rank, RankDefinition};
use crate::validation::{self, parse_coordinate, ValidationError};

/// Spreadsheet column order of an appended row.
pub const ROW_COLUMNS: [&str; 7] = [
    "timestamp",
    "rank",
    "name",
    "battalion",
    "address",
    "latitude",
    "longitude",
];

/// A validated registration, fixed at the moment it was assembled.
#[derive(Debug, Clone, PartialEq)]
pub struct MilitaryRecord {
    timestamp: DateTime<Utc>,
    rank: &'static RankDefinition,
    name: String,
    battalion: String,
    address: String,
    latitude: f64,
    longitude: f64,
}

impl MilitaryRecord {
    /// Build a record from the current form values.
    ///
    /// Fails if the form would not pass [`validation::validate`] or the
    /// rank code is not in the catalog. Text fields are kept as typed.
    pub fn assemble(fields: &FormFields, timestamp: DateTime<Utc>) -> Result<Self, CoreError> {
        validation::validate(fields)?;

        let rank =
            find_rank(&fields.rank).ok_or_else(|| CoreError::UnknownRank(fields.rank.clone()))?;
        let latitude = parse_coordinate(&fields.latitude)
            .ok_or_else(|| ValidationError::InvalidLatitude(fields.latitude.clone()))?;
        let longitude = parse_coordinate(&fields.longitude)
            .ok_or_else(|| ValidationError::InvalidLongitude(fields.longitude.clone()))?;

        Ok(Self {
            timestamp,
            rank,
            name: fields.name.clone(),
            battalion: fields.battalion.clone(),
            address: fields.address.clone(),
            latitude,
            longitude,
        })
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn rank(&self) -> &'static RankDefinition {
        self.rank
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn battalion(&self) -> &str {
        &self.battalion
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// The record as one spreadsheet row, in [`ROW_COLUMNS`] order.
    ///
    /// Coordinates stay numeric so the sheet can treat them as numbers.
    pub fn to_row(&self) -> Vec<Value> {
        vec![
            Value::from(iso_timestamp(&self.timestamp)),
            Value::from(self.rank.code),
            Value::from(self.name.as_str()),
            Value::from(self.battalion.as_str()),
            Value::from(self.address.as_str()),
            Value::from(self.latitude),
            Value::from(self.longitude),
        ]
    }
}
