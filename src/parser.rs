//! CSV decoder for the occupancy history file.

use anyhow::{Result, bail};
use tracing::debug;

use crate::occupancy::types::RawRow;

/// Columns the history file must declare in its header.
pub const REQUIRED_COLUMNS: &[&str] = &[
    "Date",
    "Heure",
    "Nom",
    "Type",
    "Places_Libres",
    "Places_Totales",
];

/// Decoded history rows plus the number of records the CSV layer rejected.
#[derive(Debug, Default)]
pub struct History {
    pub rows: Vec<RawRow>,
    pub rejected: usize,
}

/// Decodes a `;`-separated history file.
///
/// # Errors
///
/// Returns an error if the header is unreadable or lacks one of
/// [`REQUIRED_COLUMNS`]. Individual malformed records are skipped and
/// counted, never fatal.
pub fn parse_history(bytes: &[u8]) -> Result<History> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b';')
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let headers = rdr.headers()?.clone();
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|c| !headers.iter().any(|h| h == *c))
        .collect();
    if !missing.is_empty() {
        bail!("History file is missing columns: {}", missing.join(", "));
    }

    let mut history = History::default();
    for (i, result) in rdr.deserialize::<RawRow>().enumerate() {
        match result {
            Ok(row) => history.rows.push(row),
            Err(e) => {
                debug!(record = i + 1, error = %e, "Skipping undecodable record");
                history.rejected += 1;
            }
        }
    }

    Ok(history)
}
