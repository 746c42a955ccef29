use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{ExportError, Result};

/// An inclusive creation-time window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExportRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl ExportRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        if start > end {
            return Err(ExportError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Parses optional RFC 3339 query values into a range.
    pub fn parse(start: Option<&str>, end: Option<&str>) -> Result<Self> {
        let start = parse_bound("start", start)?;
        let end = parse_bound("end", end)?;
        Self::new(start, end)
    }
}

fn parse_bound(field: &'static str, value: Option<&str>) -> Result<DateTime<Utc>> {
    let value = value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(ExportError::MissingParameter(field))?;

    DateTime::parse_from_rfc3339(value)
        .map(|at| at.with_timezone(&Utc))
        .map_err(|_| ExportError::InvalidTimestamp {
            field,
            value: value.to_string(),
        })
}
