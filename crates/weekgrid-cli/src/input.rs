//! Reading appointment records and dates from the command line.
//!
//! Records are read leniently: a field that is missing or cannot be parsed
//! becomes `None`, and the library reports the record as skipped. Only a
//! document that is not a JSON array is rejected outright.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde_json::Value;
use std::io::Read;
use std::path::Path;
use weekgrid_core::{RawAppointment, WeekError};

const DATE_TIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parse a record timestamp. RFC 3339 offsets are dropped and the wall clock kept.
pub fn parse_date_time(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }
    DATE_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

/// Parse `--start`: any record timestamp shape, or a bare `YYYY-MM-DD`.
///
/// # Errors
///
/// Returns [`WeekError::InvalidParameters`] when no shape matches.
pub fn parse_start(raw: &str) -> Result<NaiveDateTime, WeekError> {
    parse_date_time(raw)
        .or_else(|| {
            NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN))
        })
        .ok_or_else(|| WeekError::InvalidParameters {
            reason: format!("start_date must be a date, got {raw:?}"),
        })
}

/// Read the agenda document from `path`, or stdin for `None` and `-`.
///
/// # Errors
///
/// Fails when the source cannot be read.
pub fn read_source(path: Option<&Path>) -> Result<String> {
    match path {
        Some(p) if p != Path::new("-") => std::fs::read_to_string(p)
            .with_context(|| format!("Failed to read {}", p.display())),
        _ => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read agenda from stdin")?;
            Ok(buf)
        }
    }
}

/// Parse a JSON array of `{start_date, end_date, title}` records.
///
/// # Errors
///
/// Returns [`WeekError::InvalidParameters`] when the text is not JSON or the
/// top-level value is not an array.
pub fn parse_agenda(text: &str) -> Result<Vec<RawAppointment>, WeekError> {
    let doc: Value = serde_json::from_str(text).map_err(|e| WeekError::InvalidParameters {
        reason: format!("agenda is not valid JSON: {e}"),
    })?;
    let Value::Array(records) = doc else {
        return Err(WeekError::InvalidParameters {
            reason: "agenda must be a list of appointments".to_string(),
        });
    };
    Ok(records.iter().map(raw_record).collect())
}

fn raw_record(record: &Value) -> RawAppointment {
    let date = |key: &str| record.get(key).and_then(Value::as_str).and_then(parse_date_time);
    RawAppointment {
        start_date: date("start_date"),
        end_date: date("end_date"),
        title: record.get("title").and_then(Value::as_str).map(str::to_string),
    }
}
