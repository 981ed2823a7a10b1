use chrono::{Duration, NaiveDateTime, Timelike};

use crate::occupancy::capacity::Capacity;
use crate::occupancy::types::{OccupancyPoint, Reading, Status};
use crate::occupancy::utility::{mean, stddev};

/// Bucketed occupancy series and status for one facility.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregate {
    pub points: Vec<OccupancyPoint>,
    pub status: Status,
}

/// Start of the `width`-wide bucket containing `ts`, aligned on midnight of
/// the same day.
///
/// `width` must be positive and should divide a day evenly.
pub fn bucket_start(ts: NaiveDateTime, width: Duration) -> NaiveDateTime {
    let width_secs = width.num_seconds().max(1);
    let secs = i64::from(ts.num_seconds_from_midnight());
    let floored = secs - secs.rem_euclid(width_secs);
    ts.date().and_time(chrono::NaiveTime::MIN) + Duration::seconds(floored)
}

/// Derives the status from the raw free-slot series.
///
/// Zero standard deviation means the sensor never moved, which includes the
/// single-reading case.
pub fn status(readings: &[Reading]) -> Status {
    if readings.is_empty() {
        return Status::Unknown;
    }
    let free: Vec<f64> = readings.iter().map(|r| f64::from(r.free)).collect();
    if stddev(&free, mean(&free)) == 0.0 {
        Status::OutOfService
    } else {
        Status::Ok
    }
}

/// Buckets `readings` into `width`-wide windows and averages occupied slots in
/// each non-empty window.
///
/// `readings` must be sorted by timestamp. With unresolved capacity no point
/// can be computed and the series is empty.
pub fn aggregate(readings: &[Reading], capacity: Capacity, width: Duration) -> Aggregate {
    let status = status(readings);

    let mut points = Vec::new();
    if capacity.value().is_none() {
        return Aggregate { points, status };
    }

    let mut current: Option<NaiveDateTime> = None;
    let mut window: Vec<f64> = Vec::new();

    for reading in readings {
        let Some(occupied) = capacity.occupied(reading.free) else {
            continue;
        };
        let start = bucket_start(reading.timestamp, width);

        if current != Some(start) {
            if let Some(prev) = current {
                points.push(OccupancyPoint {
                    bucket_start: prev,
                    occupied: mean(&window),
                });
            }
            current = Some(start);
            window.clear();
        }
        window.push(f64::from(occupied));
    }

    if let Some(prev) = current {
        points.push(OccupancyPoint {
            bucket_start: prev,
            occupied: mean(&window),
        });
    }

    Aggregate { points, status }
}
