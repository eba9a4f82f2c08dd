//! Per-device work schedules.

use serde::{Deserialize, Serialize};

/// From `timestamp` onward the device should read `target_value`, until
/// the next phase starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Phase {
    pub timestamp: u64,
    pub target_value: u8,
}

impl Phase {
    pub const fn new(timestamp: u64, target_value: u8) -> Self {
        Self {
            timestamp,
            target_value,
        }
    }
}

impl From<(u64, u8)> for Phase {
    fn from((timestamp, target_value): (u64, u8)) -> Self {
        Self::new(timestamp, target_value)
    }
}

/// Time-ordered phases for one device.
///
/// Sorting is stable: phases sharing a timestamp keep their input order,
/// and the later ones are only reached by advancing past the earlier ones.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Schedule {
    phases: Vec<Phase>,
}

impl Schedule {
    pub fn new(mut phases: Vec<Phase>) -> Self {
        phases.sort_by_key(|p| p.timestamp);
        Self { phases }
    }

    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    pub fn get(&self, index: usize) -> Option<Phase> {
        self.phases.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.phases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }

    /// Move `cursor` forward across every phase that has started by
    /// `timestamp`.  Never moves backwards or past the last phase.
    pub fn advance(&self, mut cursor: usize, timestamp: u64) -> usize {
        while self
            .phases
            .get(cursor + 1)
            .is_some_and(|next| next.timestamp <= timestamp)
        {
            cursor += 1;
        }
        cursor
    }
}

impl From<Vec<Phase>> for Schedule {
    fn from(phases: Vec<Phase>) -> Self {
        Self::new(phases)
    }
}

impl<'de> Deserialize<'de> for Schedule {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<Phase>::deserialize(deserializer).map(Self::new)
    }
}
