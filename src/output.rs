//! Serialization and persistence of the facility records.
//!
//! Supports a `data.js` script (`const realData = [...];`) embedded by the
//! dashboard page, and plain pretty-printed JSON.

use anyhow::{Context, Result};
use clap::ValueEnum;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::occupancy::report::FacilityRecord;

/// JavaScript variable the dashboard reads the records from.
pub const JS_VARIABLE: &str = "realData";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// `const realData = [...];`
    #[default]
    Js,
    /// Pretty-printed JSON array.
    Json,
}

/// Logs each record using Rust's debug pretty-print format.
pub fn print_pretty(records: &[FacilityRecord]) {
    for record in records {
        debug!("{:#?}", record);
    }
}

/// Serializes `records` in the requested format.
pub fn render(records: &[FacilityRecord], format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Js => format!("const {JS_VARIABLE} = {};", serde_json::to_string(records)?),
        OutputFormat::Json => serde_json::to_string_pretty(records)?,
    })
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Writes the artifact to `path`.
///
/// The content goes to a sibling `.tmp` file first and is renamed into place,
/// so a failed run never leaves a truncated artifact behind.
pub fn write_artifact(path: &Path, records: &[FacilityRecord], format: OutputFormat) -> Result<()> {
    let content = render(records, format)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let tmp = temp_path(path);
    fs::write(&tmp, content.as_bytes())
        .with_context(|| format!("Failed to write {}", tmp.display()))?;
    fs::rename(&tmp, path)
        .with_context(|| format!("Failed to move output to {}", path.display()))?;

    info!(
        path = %path.display(),
        records = records.len(),
        bytes = content.len(),
        "Artifact written"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::occupancy::capacity::Capacity;
    use crate::occupancy::report::History;
    use crate::occupancy::types::{FacilityKind, Status};
    use std::env;

    fn temp_file(name: &str) -> PathBuf {
        env::temp_dir().join(name)
    }

    fn record() -> FacilityRecord {
        FacilityRecord {
            name: "Comédie".to_string(),
            slug: "comedie".to_string(),
            kind: FacilityKind::Car,
            lat: 43.6085,
            lon: 3.8797,
            status: Status::Ok,
            libres: Some(12),
            total: Some(600),
            capacity: Capacity::Declared(620),
            provisional: false,
            address: None,
            accessible_spaces: None,
            history: History {
                labels: vec!["01/03 08:00".to_string()],
                data: vec![98],
            },
        }
    }

    #[test]
    fn test_print_pretty_does_not_panic() {
        print_pretty(&[record()]);
    }

    #[test]
    fn test_render_js() {
        let js = render(&[record()], OutputFormat::Js).unwrap();
        assert!(js.starts_with("const realData = [{"));
        assert!(js.ends_with("];"));
        // Non-ASCII names are kept verbatim.
        assert!(js.contains("\"Name\":\"Comédie\""));
    }

    #[test]
    fn test_render_json_parses_back() {
        let json = render(&[record()], OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["History"]["Data"][0], 98);
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(render(&[], OutputFormat::Js).unwrap(), "const realData = [];");
    }

    #[test]
    fn test_write_artifact_replaces_file() {
        let path = temp_file("parking_occupancy_test_data.js");
        fs::write(&path, "stale").unwrap();

        write_artifact(&path, &[record()], OutputFormat::Js).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("const realData"));
        assert!(!temp_path(&path).exists());

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_temp_path_is_sibling() {
        let p = Path::new("/srv/site/data.js");
        assert_eq!(temp_path(p), PathBuf::from("/srv/site/data.js.tmp"));
    }
}
