//! Command center: per-device schedule tracking and command generation.
//!
//! ```text
//!  Meterage ──▶ stale? ──▶ schedule? ──▶ advance cursor ──▶ started?
//!                 │            │                               │
//!              Obsolete    NoSchedule                     NoTimestamp
//!                                                              │
//!                              Command ◀── deviation ◀── target − value
//! ```

use std::collections::HashMap;

use log::{debug, info, warn};

use crate::protocol::message::{ErrorKind, Message, Meterage};

use super::DeviceId;
use super::deviation::{DeviationRecord, DeviationTracker};
use super::schedule::{Phase, Schedule};

// ───────────────────────────────────────────────────────────────
// Per-device state
// ───────────────────────────────────────────────────────────────

/// Everything the engine knows about one device.
///
/// Kept as a single record so that replacing or forgetting a device can
/// never leave its pieces out of step.
#[derive(Debug, Clone, Default)]
pub struct DeviceState {
    schedule: Schedule,
    /// Index of the active phase.  Meaningless while `schedule` is empty.
    cursor: usize,
    last_timestamp: Option<u64>,
    deviations: DeviationTracker,
}

impl DeviceState {
    /// Replace the schedule and rewind the cursor.  Deviation history and
    /// the last accepted timestamp survive.
    pub fn set_schedule(&mut self, schedule: Schedule) {
        self.schedule = schedule;
        self.cursor = 0;
    }

    /// Run one measurement through the engine.
    pub fn process(&mut self, meterage: Meterage) -> Result<i8, ErrorKind> {
        let Meterage { timestamp, value } = meterage;

        if self.last_timestamp.is_some_and(|last| timestamp <= last) {
            return Err(ErrorKind::Obsolete);
        }
        // Accepted even if a later step fails, so a replay is still obsolete.
        self.last_timestamp = Some(timestamp);

        if self.schedule.is_empty() {
            return Err(ErrorKind::NoSchedule);
        }

        self.cursor = self.schedule.advance(self.cursor, timestamp);
        let phase = self.schedule.get(self.cursor).ok_or(ErrorKind::NoSchedule)?;
        if phase.timestamp > timestamp {
            return Err(ErrorKind::NoTimestamp);
        }

        let (raw, command) = correction(phase.target_value, value);
        self.deviations.record(phase, timestamp, raw);
        Ok(command)
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    /// Active phase index, if a schedule is set.
    pub fn cursor(&self) -> Option<usize> {
        (!self.schedule.is_empty()).then_some(self.cursor)
    }

    pub fn last_timestamp(&self) -> Option<u64> {
        self.last_timestamp
    }

    pub fn deviation_stats(&self) -> &[DeviationRecord] {
        self.deviations.records()
    }
}

/// Difference `target − value`: the exact value and its saturated wire form.
pub fn correction(target: u8, value: u8) -> (i16, i8) {
    let raw = i16::from(target) - i16::from(value);
    let command = raw.clamp(i16::from(i8::MIN), i16::from(i8::MAX)) as i8;
    if i16::from(command) != raw {
        warn!(
            "Correction {} saturated to {} (target={}, value={})",
            raw, command, target, value
        );
    }
    (raw, command)
}

// ───────────────────────────────────────────────────────────────
// CommandCenter
// ───────────────────────────────────────────────────────────────

/// Single-owner engine holding the state of every known device.
#[derive(Debug, Default)]
pub struct CommandCenter {
    devices: HashMap<DeviceId, DeviceState>,
}

impl CommandCenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace `device_id`'s schedule with a time-sorted copy of `phases`.
    /// An empty list leaves the device without a schedule.
    pub fn set_schedule(&mut self, device_id: DeviceId, phases: Vec<Phase>) {
        let schedule = Schedule::new(phases);
        info!(
            "Device {}: schedule replaced ({} phases)",
            device_id,
            schedule.len()
        );
        self.devices.entry(device_id).or_default().set_schedule(schedule);
    }

    /// Answer a measurement with a `Command` or an `Error` message.
    pub fn process_meterage(&mut self, device_id: DeviceId, meterage: Meterage) -> Message {
        let state = self.devices.entry(device_id).or_default();
        match state.process(meterage) {
            Ok(command) => {
                debug!(
                    "Device {}: t={} value={} -> command {} (phase {:?})",
                    device_id,
                    meterage.timestamp,
                    meterage.value,
                    command,
                    state.cursor()
                );
                Message::Command(command)
            }
            Err(kind) => {
                debug!(
                    "Device {}: t={} value={} -> {}",
                    device_id, meterage.timestamp, meterage.value, kind
                );
                Message::Error(kind)
            }
        }
    }

    /// Deviation history of `device_id`; empty for an unknown device.
    pub fn deviation_stats(&self, device_id: DeviceId) -> Vec<DeviationRecord> {
        self.devices
            .get(&device_id)
            .map(|s| s.deviation_stats().to_vec())
            .unwrap_or_default()
    }

    /// Drop everything known about `device_id`.
    pub fn forget_device(&mut self, device_id: DeviceId) {
        if self.devices.remove(&device_id).is_some() {
            info!("Device {}: forgotten", device_id);
        }
    }

    pub fn device(&self, device_id: DeviceId) -> Option<&DeviceState> {
        self.devices.get(&device_id)
    }

    pub fn device_ids(&self) -> impl Iterator<Item = DeviceId> + '_ {
        self.devices.keys().copied()
    }
}
