//! Dose log records.

use crate::error::StoreError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_QUANTITY: &str = "1";
pub const DEFAULT_UNIT: &str = "mg";
pub const DEFAULT_ROUTE: &str = "Oral";

/// A logged dose. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoseEvent {
    pub id: u64,
    /// Display name or catalog key.
    pub substance: String,
    #[serde(default = "default_route")]
    pub route: String,
    /// Decimal text, kept verbatim.
    pub quantity: String,
    pub unit: String,
    pub dose_time: DateTime<Utc>,
}

fn default_route() -> String {
    DEFAULT_ROUTE.to_string()
}

/// Create request. `substance` and `doseTime` are required; the rest default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDose {
    #[serde(default)]
    pub substance: Option<String>,
    #[serde(default)]
    pub route: Option<String>,
    /// RFC 3339 text; parsed by `validate`.
    #[serde(default)]
    pub dose_time: Option<String>,
    #[serde(default)]
    pub quantity: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
}

/// A create request that passed validation, with defaults applied.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidDose {
    pub substance: String,
    pub route: String,
    pub quantity: String,
    pub unit: String,
    pub dose_time: DateTime<Utc>,
}

impl NewDose {
    pub fn new(substance: impl Into<String>, dose_time: DateTime<Utc>) -> Self {
        Self {
            substance: Some(substance.into()),
            dose_time: Some(dose_time.to_rfc3339()),
            ..Self::default()
        }
    }

    pub fn route(mut self, route: impl Into<String>) -> Self {
        self.route = Some(route.into());
        self
    }

    pub fn quantity(mut self, quantity: impl Into<String>, unit: impl Into<String>) -> Self {
        self.quantity = Some(quantity.into());
        self.unit = Some(unit.into());
        self
    }

    /// Blank strings count as absent.
    pub fn validate(self) -> Result<ValidDose, StoreError> {
        fn present(s: Option<String>) -> Option<String> {
            s.filter(|v| !v.trim().is_empty())
        }
        let substance = present(self.substance).ok_or(StoreError::MissingField("substance"))?;
        let dose_time = present(self.dose_time).ok_or(StoreError::MissingField("doseTime"))?;
        let dose_time = parse_time(&dose_time)?;
        Ok(ValidDose {
            substance,
            route: present(self.route).unwrap_or_else(default_route),
            quantity: present(self.quantity).unwrap_or_else(|| DEFAULT_QUANTITY.to_string()),
            unit: present(self.unit).unwrap_or_else(|| DEFAULT_UNIT.to_string()),
            dose_time,
        })
    }
}

impl ValidDose {
    pub fn into_event(self, id: u64) -> DoseEvent {
        DoseEvent {
            id,
            substance: self.substance,
            route: self.route,
            quantity: self.quantity,
            unit: self.unit,
            dose_time: self.dose_time,
        }
    }
}

/// Parse an RFC 3339 timestamp (e.g. `2024-05-01T20:00:00Z`).
pub fn parse_time(s: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(s.trim())
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| StoreError::InvalidTime(format!("{s:?}: {e}")))
}
