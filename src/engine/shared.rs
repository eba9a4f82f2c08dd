//! Thread-safe facade over per-device engine state.
//!
//! The outer `RwLock` only guards the device table; every engine operation
//! runs under the owning device's `Mutex`.  Operations on one device are
//! therefore serialized while different devices proceed in parallel.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use log::info;

use crate::protocol::message::{Message, Meterage};

use super::DeviceId;
use super::center::DeviceState;
use super::deviation::DeviationRecord;
use super::schedule::{Phase, Schedule};

type Slot = Arc<Mutex<DeviceState>>;

/// Cloneable handle; all clones share the same devices.
#[derive(Debug, Clone, Default)]
pub struct SharedCommandCenter {
    devices: Arc<RwLock<HashMap<DeviceId, Slot>>>,
}

impl SharedCommandCenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_schedule(&self, device_id: DeviceId, phases: Vec<Phase>) {
        let schedule = Schedule::new(phases);
        info!(
            "Device {}: schedule replaced ({} phases)",
            device_id,
            schedule.len()
        );
        lock(&self.slot(device_id)).set_schedule(schedule);
    }

    pub fn process_meterage(&self, device_id: DeviceId, meterage: Meterage) -> Message {
        match lock(&self.slot(device_id)).process(meterage) {
            Ok(command) => Message::Command(command),
            Err(kind) => Message::Error(kind),
        }
    }

    pub fn deviation_stats(&self, device_id: DeviceId) -> Vec<DeviationRecord> {
        let slot = self
            .devices
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&device_id)
            .cloned();
        slot.map(|s| lock(&s).deviation_stats().to_vec())
            .unwrap_or_default()
    }

    /// Detach the device's state in one step.  A call already holding the
    /// old slot finishes against the detached state; later calls start fresh.
    pub fn forget_device(&self, device_id: DeviceId) {
        let removed = self
            .devices
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&device_id);
        if removed.is_some() {
            info!("Device {}: forgotten", device_id);
        }
    }

    pub fn device_count(&self) -> usize {
        self.devices
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Find or lazily create the slot for `device_id`.
    fn slot(&self, device_id: DeviceId) -> Slot {
        if let Some(slot) = self
            .devices
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&device_id)
        {
            return Arc::clone(slot);
        }

        let mut devices = self.devices.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(devices.entry(device_id).or_default())
    }
}

// The engine never panics while holding a device lock, so a poisoned lock
// still holds consistent state.
fn lock(slot: &Mutex<DeviceState>) -> MutexGuard<'_, DeviceState> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}
