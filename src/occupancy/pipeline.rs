use anyhow::Result;
use tracing::info;

use crate::config::PipelineConfig;
use crate::gazetteer::Gazetteer;
use crate::occupancy::normalizer::normalize;
use crate::occupancy::report::{FacilityRecord, build_report};
use crate::parser::parse_history;
use crate::registry::Registry;

/// Result of one pipeline run.
#[derive(Debug)]
pub struct Run {
    pub records: Vec<FacilityRecord>,
    /// Records the CSV layer could not decode.
    pub rejected: usize,
    /// Decoded rows dropped by the normalizer.
    pub dropped: usize,
}

/// Runs the whole pipeline over a history file already in memory.
///
/// Reference data is borrowed read-only; the same inputs always produce the
/// same records in the same order.
pub fn run(
    history: &[u8],
    registry: &Registry,
    gazetteer: &Gazetteer,
    config: &PipelineConfig,
) -> Result<Run> {
    let parsed = parse_history(history)?;
    let normalized = normalize(parsed.rows, &config.timestamp_format);
    let records = build_report(normalized.readings, registry, gazetteer, config);

    info!(
        records = records.len(),
        rejected = parsed.rejected,
        dropped = normalized.dropped,
        "Pipeline complete"
    );

    Ok(Run {
        records,
        rejected: parsed.rejected,
        dropped: normalized.dropped,
    })
}
