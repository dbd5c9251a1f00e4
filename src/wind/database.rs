//! Historical wind dataset loading and date indexing.
//!
//! The dataset is a JSON list of per-timestamp records. Each record carries
//! a `datetime` string and one object per daily period (`"AM"`, `"PM"`)
//! holding the altitude levels under `"data"`. Only the configured period
//! is indexed; records without it are skipped rather than rejected, which
//! tolerates partial days in the historical archives.

use std::path::Path;

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde_json::Value;

use crate::config::DateRange;
use crate::error::{DispersionError, DispersionResult};
use crate::wind::{WindLevel, WindObservation};

/// Read-only per-day wind observation index.
///
/// Safe to share across workers after load; there is no mutation API.
#[derive(Debug, Clone)]
pub struct WindDatabase {
    /// Date index in dataset order, first record per date wins.
    index: IndexMap<NaiveDate, WindObservation>,
    /// Daily period this database was indexed for.
    period: String,
}

impl WindDatabase {
    /// Load and index a wind dataset file.
    ///
    /// # Errors
    ///
    /// Returns the data-source error if the file is missing or unreadable,
    /// if the top level is not a record list, or if an indexed record
    /// carries a malformed level entry.
    pub fn load<P: AsRef<Path>>(path: P, period: impl Into<String>) -> DispersionResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            DispersionError::data_source(format!("cannot read {}: {e}", path.display()))
        })?;

        let db = Self::from_json_str(&content, period)?;
        tracing::info!(
            dataset = %path.display(),
            days = db.len(),
            period = db.period(),
            "wind dataset indexed"
        );
        Ok(db)
    }

    /// Index a wind dataset from a JSON string.
    ///
    /// Records are skipped silently when they are not objects, have no
    /// parseable `YYYY-MM-DD` in the first 10 characters of `datetime`,
    /// lack the configured period, or have an empty level sequence. A
    /// level entry that is present but missing a numeric required field
    /// fails the whole load.
    ///
    /// # Errors
    ///
    /// Returns the data-source error on malformed JSON, a non-list top
    /// level, or a malformed level entry.
    pub fn from_json_str(json: &str, period: impl Into<String>) -> DispersionResult<Self> {
        let period = period.into();
        let root: Value = serde_json::from_str(json)
            .map_err(|e| DispersionError::data_source(format!("malformed JSON: {e}")))?;

        let records = root.as_array().ok_or_else(|| {
            DispersionError::data_source("top level must be a list of wind records")
        })?;

        let mut index: IndexMap<NaiveDate, WindObservation> = IndexMap::new();

        for record in records {
            let Some((date, levels)) = record_levels(record, &period)? else {
                continue;
            };
            // First record per date wins
            index
                .entry(date)
                .or_insert(WindObservation { date, levels });
        }

        Ok(Self { index, period })
    }

    /// Observation for the given day, if recorded.
    #[must_use]
    pub fn get(&self, date: NaiveDate) -> Option<&WindObservation> {
        self.index.get(&date)
    }

    /// Whether the given day has an observation.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.index.contains_key(&date)
    }

    /// Number of indexed days.
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether the database holds no observations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Indexed dates in dataset order.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.index.keys().copied()
    }

    /// The daily period this database was indexed for.
    #[must_use]
    pub fn period(&self) -> &str {
        &self.period
    }

    /// Days of the range that have an observation, in calendar order.
    #[must_use]
    pub fn observed_days(&self, range: &DateRange) -> Vec<NaiveDate> {
        range.days().filter(|day| self.contains(*day)).collect()
    }
}

/// Extract `(date, levels)` from one record, or `None` to skip it.
fn record_levels(
    record: &Value,
    period: &str,
) -> DispersionResult<Option<(NaiveDate, Vec<WindLevel>)>> {
    let Some(obj) = record.as_object() else {
        return Ok(None);
    };

    let Some(datetime) = obj.get("datetime").and_then(Value::as_str) else {
        return Ok(None);
    };
    // First 10 characters carry the calendar day
    let Some(date) = datetime
        .get(0..10)
        .and_then(|day| NaiveDate::parse_from_str(day, "%Y-%m-%d").ok())
    else {
        return Ok(None);
    };

    let Some(data) = obj
        .get(period)
        .and_then(Value::as_object)
        .and_then(|p| p.get("data"))
        .and_then(Value::as_array)
    else {
        return Ok(None);
    };
    if data.is_empty() {
        return Ok(None);
    }

    let mut levels = Vec::with_capacity(data.len());
    for entry in data {
        levels.push(parse_level(entry, date)?);
    }

    Ok(Some((date, levels)))
}

/// Parse one altitude level; all three source fields are required.
fn parse_level(entry: &Value, date: NaiveDate) -> DispersionResult<WindLevel> {
    let field = |name: &str| {
        entry.get(name).and_then(Value::as_f64).ok_or_else(|| {
            DispersionError::data_source(format!(
                "record for {date}: level entry missing numeric '{name}'"
            ))
        })
    };

    Ok(WindLevel {
        altitude_m: field("altitude")?,
        speed: field("wind")?,
        heading_deg: field("heading")?,
        deviation: 0.0,
    })
}
