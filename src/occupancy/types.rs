//! Data types shared by the occupancy pipeline.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::gazetteer::slugify;

/// Kind of parking facility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FacilityKind {
    #[serde(rename = "Voiture")]
    Car,
    #[serde(rename = "Velo")]
    Bike,
}

impl FacilityKind {
    /// Wire tag used in the history file and in output records.
    pub fn tag(self) -> &'static str {
        match self {
            FacilityKind::Car => "Voiture",
            FacilityKind::Bike => "Velo",
        }
    }
}

impl fmt::Display for FacilityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for FacilityKind {
    type Err = String;

    /// Accepts the wire tags case-insensitively, with or without accents
    /// (`"Velo"`, `"Vélo"`, `"voiture"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match slugify(s).as_str() {
            "voiture" | "car" => Ok(FacilityKind::Car),
            "velo" | "bike" => Ok(FacilityKind::Bike),
            _ => Err(s.to_string()),
        }
    }
}

/// One row of the history file, before any validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRow {
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Heure")]
    pub time: String,
    #[serde(rename = "Nom")]
    pub name: String,
    #[serde(rename = "Type")]
    pub kind: String,
    /// Read as a float so exports writing `10.0` still decode; the
    /// normalizer rejects fractional values.
    #[serde(rename = "Places_Libres", default, deserialize_with = "csv::invalid_option")]
    pub free: Option<f64>,
    #[serde(rename = "Places_Totales", default, deserialize_with = "csv::invalid_option")]
    pub total: Option<f64>,
}

/// A validated observation. `total == 0` means the sensor did not report it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reading {
    pub name: String,
    pub kind: FacilityKind,
    pub timestamp: NaiveDateTime,
    pub free: u32,
    pub total: u32,
}

impl Reading {
    pub fn key(&self) -> FacilityKey {
        FacilityKey {
            name: self.name.clone(),
            kind: self.kind,
        }
    }
}

/// Identity of a facility for one run.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FacilityKey {
    pub name: String,
    pub kind: FacilityKind,
}

impl FacilityKey {
    pub fn new(name: impl Into<String>, kind: FacilityKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

impl fmt::Display for FacilityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.kind)
    }
}

/// WGS84 position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Operational status derived from the free-slot series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Status {
    #[serde(rename = "OK")]
    Ok,
    /// Out of service: the sensor never changed value.
    #[serde(rename = "HS")]
    OutOfService,
    /// No readings at all.
    #[serde(rename = "UNKNOWN")]
    Unknown,
}

/// Mean occupied-slot count over one time bucket.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OccupancyPoint {
    pub bucket_start: NaiveDateTime,
    pub occupied: f64,
}
