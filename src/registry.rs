//! Facility registry: declared capacities and metadata, keyed by facility.
//!
//! Loaded from a `;`-separated file with the header
//! `Nom;Type;Capacite;Adresse;PMR;Lat;Lon`. Only `Nom` is required; a missing
//! `Type` means a car park.

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::debug;

use crate::occupancy::types::{Coordinate, FacilityKey, FacilityKind};

#[derive(Debug, Clone, PartialEq)]
pub struct RegistryEntry {
    pub name: String,
    pub kind: FacilityKind,
    pub capacity: Option<u32>,
    pub address: Option<String>,
    pub accessible_spaces: Option<u32>,
    pub coordinate: Option<Coordinate>,
}

impl RegistryEntry {
    pub fn key(&self) -> FacilityKey {
        FacilityKey::new(self.name.clone(), self.kind)
    }
}

#[derive(Debug, Deserialize)]
struct RegistryRow {
    #[serde(rename = "Nom")]
    name: String,
    #[serde(rename = "Type", default)]
    kind: Option<String>,
    #[serde(rename = "Capacite", default, deserialize_with = "csv::invalid_option")]
    capacity: Option<u32>,
    #[serde(rename = "Adresse", default)]
    address: Option<String>,
    #[serde(rename = "PMR", default, deserialize_with = "csv::invalid_option")]
    accessible_spaces: Option<u32>,
    #[serde(rename = "Lat", default, deserialize_with = "csv::invalid_option")]
    lat: Option<f64>,
    #[serde(rename = "Lon", default, deserialize_with = "csv::invalid_option")]
    lon: Option<f64>,
}

impl TryFrom<RegistryRow> for RegistryEntry {
    type Error = anyhow::Error;

    fn try_from(row: RegistryRow) -> Result<Self> {
        let kind = match row.kind.as_deref().map(str::trim) {
            None | Some("") => FacilityKind::Car,
            Some(tag) => tag
                .parse()
                .map_err(|t| anyhow!("unknown facility kind {t:?}"))?,
        };
        let coordinate = match (row.lat, row.lon) {
            (Some(lat), Some(lon)) => Some(Coordinate::new(lat, lon)),
            _ => None,
        };
        Ok(RegistryEntry {
            name: row.name.trim().to_string(),
            kind,
            capacity: row.capacity,
            address: row.address.filter(|a| !a.trim().is_empty()),
            accessible_spaces: row.accessible_spaces,
            coordinate,
        })
    }
}

/// Read-only facility metadata.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    entries: BTreeMap<FacilityKey, RegistryEntry>,
}

impl Registry {
    pub fn new(entries: impl IntoIterator<Item = RegistryEntry>) -> Self {
        Self {
            entries: entries.into_iter().map(|e| (e.key(), e)).collect(),
        }
    }

    /// Parses registry CSV bytes. Any malformed row fails the whole load.
    pub fn from_csv(bytes: &[u8]) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(b';')
            .trim(csv::Trim::All)
            .from_reader(bytes);

        let mut entries = Vec::new();
        for (i, result) in rdr.deserialize::<RegistryRow>().enumerate() {
            let row = result.with_context(|| format!("Invalid registry row {}", i + 1))?;
            let entry = RegistryEntry::try_from(row)
                .with_context(|| format!("Invalid registry row {}", i + 1))?;
            entries.push(entry);
        }

        debug!(entries = entries.len(), "Registry parsed");
        Ok(Self::new(entries))
    }

    pub fn get(&self, key: &FacilityKey) -> Option<&RegistryEntry> {
        self.entries.get(key)
    }

    pub fn declared_capacity(&self, key: &FacilityKey) -> Option<u32> {
        self.get(key).and_then(|e| e.capacity)
    }

    /// Entries in facility-key order.
    pub fn iter(&self) -> impl Iterator<Item = &RegistryEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
