use serde::{Serialize, Serializer};

use crate::occupancy::types::Reading;

/// Resolved capacity of a facility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capacity {
    /// Positive value from the facility registry.
    Declared(u32),
    /// Largest `total` reported by the sensor. Provisional: the true capacity
    /// may be higher.
    Observed(u32),
    Unresolved,
}

impl Capacity {
    pub fn value(self) -> Option<u32> {
        match self {
            Capacity::Declared(n) | Capacity::Observed(n) => Some(n),
            Capacity::Unresolved => None,
        }
    }

    pub fn is_provisional(self) -> bool {
        matches!(self, Capacity::Observed(_))
    }

    /// Clamps a free-slot count to `[0, capacity]`. Unresolved capacity
    /// leaves the value untouched.
    pub fn clamp_free(self, free: u32) -> u32 {
        match self.value() {
            Some(cap) => free.min(cap),
            None => free,
        }
    }

    /// Occupied slots for a raw free-slot reading, or `None` when capacity is
    /// unresolved.
    pub fn occupied(self, free: u32) -> Option<u32> {
        self.value().map(|cap| cap - self.clamp_free(free))
    }
}

impl Serialize for Capacity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.value().serialize(serializer)
    }
}

/// Picks the authoritative capacity: a positive declared value first, then the
/// maximum positive `total` observed across `readings`.
pub fn resolve_capacity(declared: Option<u32>, readings: &[Reading]) -> Capacity {
    if let Some(n) = declared.filter(|n| *n > 0) {
        return Capacity::Declared(n);
    }

    readings
        .iter()
        .map(|r| r.total)
        .filter(|t| *t > 0)
        .max()
        .map_or(Capacity::Unresolved, Capacity::Observed)
}
