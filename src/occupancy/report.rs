//! Packages per-facility results into the records consumed by renderers.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::PipelineConfig;
use crate::gazetteer::{Gazetteer, slugify};
use crate::occupancy::aggregate::aggregate;
use crate::occupancy::capacity::{Capacity, resolve_capacity};
use crate::occupancy::types::{Coordinate, FacilityKey, FacilityKind, Reading, Status};
use crate::occupancy::utility::percent;
use crate::registry::Registry;

/// Chart-ready history. `labels` and `data` always have the same length.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct History {
    pub labels: Vec<String>,
    /// Occupancy as a whole percentage of capacity, 0 to 100.
    pub data: Vec<u8>,
}

/// One output record per facility.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct FacilityRecord {
    pub name: String,
    pub slug: String,
    #[serde(rename = "Type")]
    pub kind: FacilityKind,
    pub lat: f64,
    pub lon: f64,
    pub status: Status,
    /// Latest raw free-slot count.
    pub libres: Option<u32>,
    /// Latest raw total-slot count.
    pub total: Option<u32>,
    pub capacity: Capacity,
    /// Capacity comes from the largest observed total, not the registry.
    pub provisional: bool,
    pub address: Option<String>,
    /// Spaces reserved for disabled drivers, from the registry.
    pub accessible_spaces: Option<u32>,
    pub history: History,
}

/// Where a facility's position comes from: the registry, then the gazetteer,
/// then the configured default centre.
pub fn locate(
    key: &FacilityKey,
    registry: &Registry,
    gazetteer: &Gazetteer,
    config: &PipelineConfig,
) -> Coordinate {
    if let Some(c) = registry.get(key).and_then(|e| e.coordinate) {
        return c;
    }
    match gazetteer.resolve(&key.name) {
        Some(c) => c,
        None => {
            debug!(facility = %key, "No gazetteer match, using default centre");
            config.default_center
        }
    }
}

/// Builds the record for one facility from its chronologically sorted
/// readings (possibly empty). [`build_report`] does the sorting.
pub fn assemble(
    key: &FacilityKey,
    readings: &[Reading],
    registry: &Registry,
    gazetteer: &Gazetteer,
    config: &PipelineConfig,
) -> FacilityRecord {
    let capacity = resolve_capacity(registry.declared_capacity(key), readings);
    if capacity == Capacity::Unresolved && !readings.is_empty() {
        warn!(facility = %key, "Capacity unresolved, history omitted");
    }

    let agg = aggregate(readings, capacity, config.bucket_width());
    let coordinate = locate(key, registry, gazetteer, config);

    let skip = match config.history_limit {
        0 => 0,
        limit => agg.points.len().saturating_sub(limit),
    };
    let cap = capacity.value().map_or(0.0, f64::from);
    let (labels, data): (Vec<String>, Vec<u8>) = agg.points[skip..]
        .iter()
        .map(|p| {
            (
                p.bucket_start.format(&config.label_format).to_string(),
                percent(p.occupied, cap),
            )
        })
        .unzip();

    let last = readings.last();
    let entry = registry.get(key);

    FacilityRecord {
        name: key.name.clone(),
        slug: slugify(&key.name),
        kind: key.kind,
        lat: coordinate.lat,
        lon: coordinate.lon,
        status: agg.status,
        libres: last.map(|r| r.free),
        total: last.map(|r| r.total),
        capacity,
        provisional: capacity.is_provisional(),
        address: entry.and_then(|e| e.address.clone()),
        accessible_spaces: entry.and_then(|e| e.accessible_spaces),
        history: History { labels, data },
    }
}

/// Groups `readings` by facility and assembles one record per facility,
/// including registry facilities that never reported.
///
/// Each facility's readings are stable-sorted by timestamp, so readings
/// sharing a timestamp keep their input order. Records come out ordered by
/// facility key.
pub fn build_report(
    readings: Vec<Reading>,
    registry: &Registry,
    gazetteer: &Gazetteer,
    config: &PipelineConfig,
) -> Vec<FacilityRecord> {
    let mut groups: BTreeMap<FacilityKey, Vec<Reading>> = BTreeMap::new();
    for reading in readings {
        groups.entry(reading.key()).or_default().push(reading);
    }
    for entry in registry.iter() {
        groups.entry(entry.key()).or_default();
    }

    let records: Vec<FacilityRecord> = groups
        .iter_mut()
        .map(|(key, group)| {
            group.sort_by_key(|r| r.timestamp);
            assemble(key, group, registry, gazetteer, config)
        })
        .collect();

    let out_of_service = records
        .iter()
        .filter(|r| r.status == Status::OutOfService)
        .count();
    info!(
        facilities = records.len(),
        out_of_service, "Report assembled"
    );
    records
}
