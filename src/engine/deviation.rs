//! Running RMS deviation per phase instance.
//!
//! A phase instance is identified by value: a new record starts whenever the
//! applied `(timestamp, target_value)` differs from the latest record's,
//! including when an earlier phase comes back after a different one.

use serde::{Deserialize, Serialize};

use super::schedule::Phase;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeviationRecord {
    /// Phase this instance applied.
    pub phase: Phase,
    /// Timestamp of the measurement that activated the instance.
    pub first_timestamp: u64,
    /// Root-mean-square of the corrections seen so far.
    pub deviation: f64,
}

/// Append-only history of [`DeviationRecord`]s for one device.
#[derive(Debug, Clone, Default)]
pub struct DeviationTracker {
    records: Vec<DeviationRecord>,
    // Accumulator for the last record only.  Squares are at most 255², so
    // an exact integer sum cannot overflow in any realistic run.
    sum_squares: u64,
    samples: u64,
}

impl DeviationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one correction into the record for `phase`, opening a new
    /// record first if `phase` is not the one currently tracked.
    pub fn record(&mut self, phase: Phase, timestamp: u64, correction: i16) {
        if self.records.last().is_none_or(|r| r.phase != phase) {
            self.records.push(DeviationRecord {
                phase,
                first_timestamp: timestamp,
                deviation: 0.0,
            });
            self.sum_squares = 0;
            self.samples = 0;
        }

        let c = i64::from(correction);
        self.sum_squares = self.sum_squares.saturating_add(c.unsigned_abs().pow(2));
        self.samples += 1;

        let deviation = (self.sum_squares as f64 / self.samples as f64).sqrt();
        if let Some(last) = self.records.last_mut() {
            last.deviation = deviation;
        }
    }

    pub fn records(&self) -> &[DeviationRecord] {
        &self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
