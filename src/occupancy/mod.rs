//! Occupancy pipeline: row normalization, capacity resolution, 5-minute
//! resampling, status detection and record assembly.

pub mod aggregate;
pub mod capacity;
pub mod normalizer;
pub mod pipeline;
pub mod report;
pub mod types;
pub mod utility;
