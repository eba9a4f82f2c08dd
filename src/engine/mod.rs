//! Command-generation engine: pure domain logic, zero I/O.
//!
//! Matches each measurement to the device's active schedule phase, answers
//! with a correction command or an error, and keeps a per-phase RMS of the
//! corrections.  Nothing here blocks or suspends; transports drive it
//! through [`CommandCenter`] (single owner) or [`SharedCommandCenter`]
//! (per-device locking).

pub mod center;
pub mod deviation;
pub mod schedule;
pub mod shared;

/// Stable key for a device across connections.
pub type DeviceId = u64;

pub use center::{CommandCenter, DeviceState};
pub use deviation::{DeviationRecord, DeviationTracker};
pub use schedule::{Phase, Schedule};
pub use shared::SharedCommandCenter;
