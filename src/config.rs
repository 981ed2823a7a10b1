//! Pipeline settings shared by the CLI and the library entry points.

use chrono::Duration;
use tracing::info;

use crate::occupancy::types::Coordinate;

/// Centre of Montpellier, used for facilities no source could place.
pub const DEFAULT_CENTER: Coordinate = Coordinate::new(43.6107, 3.8767);

/// Tuning knobs for one pipeline run. Immutable once built.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Width of the resampling window, in minutes.
    pub bucket_minutes: u32,

    /// Number of most recent buckets kept per facility (`0` keeps all).
    pub history_limit: usize,

    /// `chrono` format of `"{Date} {Heure}"` in the history file.
    pub timestamp_format: String,

    /// `chrono` format of `History.Labels`.
    pub label_format: String,

    /// Fallback position for names the gazetteer and registry cannot place.
    pub default_center: Coordinate,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            bucket_minutes: 5,
            history_limit: 300,
            timestamp_format: "%Y-%m-%d %H:%M".to_string(),
            label_format: "%d/%m %H:%M".to_string(),
            default_center: DEFAULT_CENTER,
        }
    }
}

impl PipelineConfig {
    pub fn bucket_width(&self) -> Duration {
        Duration::minutes(i64::from(self.bucket_minutes.max(1)))
    }

    pub fn log_config(&self) {
        info!("Pipeline configuration:");
        info!("  bucket_minutes   : {}", self.bucket_minutes);
        info!("  history_limit    : {}", self.history_limit);
        info!("  timestamp_format : {}", self.timestamp_format);
        info!("  label_format     : {}", self.label_format);
        info!(
            "  default_center   : {}, {}",
            self.default_center.lat, self.default_center.lon
        );
    }
}
