//! Turns raw history rows into validated, chronologically sorted readings.

use chrono::NaiveDateTime;
use tracing::{debug, info};

use crate::occupancy::types::{FacilityKind, RawRow, Reading};

/// Why a raw row was discarded.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RowError {
    #[error("unparsable timestamp {0:?}")]
    Timestamp(String),
    #[error("unknown facility kind {0:?}")]
    Kind(String),
    #[error("missing free-slot count")]
    MissingFree,
    #[error("negative slot count {0}")]
    NegativeCount(i64),
    #[error("non-integral slot count {0}")]
    NotInteger(String),
}

/// Output of [`normalize`]: the kept readings and how many rows were dropped.
#[derive(Debug, Default)]
pub struct Normalized {
    pub readings: Vec<Reading>,
    pub dropped: usize,
}

/// Parses `"{date} {time}"` with `format`, falling back to the same format
/// with seconds appended.
pub fn parse_timestamp(date: &str, time: &str, format: &str) -> Option<NaiveDateTime> {
    let joined = format!("{} {}", date.trim(), time.trim());
    NaiveDateTime::parse_from_str(&joined, format)
        .or_else(|_| NaiveDateTime::parse_from_str(&joined, &format!("{format}:%S")))
        .ok()
}

/// Integral, non-negative float to a slot count. Saturates at `u32::MAX`.
fn slot_count(value: f64) -> Result<u32, RowError> {
    if !value.is_finite() || value.fract() != 0.0 {
        return Err(RowError::NotInteger(value.to_string()));
    }
    if value < 0.0 {
        return Err(RowError::NegativeCount(value as i64));
    }
    Ok(value as u32)
}

/// Validates a single row.
pub fn parse_row(row: &RawRow, timestamp_format: &str) -> Result<Reading, RowError> {
    let timestamp = parse_timestamp(&row.date, &row.time, timestamp_format)
        .ok_or_else(|| RowError::Timestamp(format!("{} {}", row.date, row.time)))?;

    let kind = row.kind.parse::<FacilityKind>().map_err(RowError::Kind)?;

    let free = slot_count(row.free.ok_or(RowError::MissingFree)?)?;
    let total = slot_count(row.total.unwrap_or(0.0))?;

    Ok(Reading {
        name: row.name.trim().to_string(),
        kind,
        timestamp,
        free,
        total,
    })
}

/// Drops malformed rows and sorts the rest by timestamp.
///
/// The sort is stable: readings sharing a timestamp keep their input order.
pub fn normalize<I>(rows: I, timestamp_format: &str) -> Normalized
where
    I: IntoIterator<Item = RawRow>,
{
    let mut out = Normalized::default();

    for (i, row) in rows.into_iter().enumerate() {
        match parse_row(&row, timestamp_format) {
            Ok(reading) => out.readings.push(reading),
            Err(e) => {
                debug!(row = i, name = %row.name, error = %e, "Dropping history row");
                out.dropped += 1;
            }
        }
    }

    out.readings.sort_by_key(|r| r.timestamp);

    info!(
        kept = out.readings.len(),
        dropped = out.dropped,
        "History rows normalized"
    );
    out
}
