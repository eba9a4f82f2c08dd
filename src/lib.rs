//! Device monitoring server library.
//!
//! Devices report timestamped measurements; the server compares each one
//! with the device's work schedule, answers with a correction command, and
//! keeps per-phase deviation statistics.  All traffic passes through a
//! selectable obfuscation cipher.

#![deny(unused_must_use)]

pub mod config;
pub mod engine;
pub mod error;
pub mod protocol;
pub mod server;

pub use config::{DeviceWorkSchedule, ServerConfig};
pub use engine::{CommandCenter, DeviationRecord, DeviceId, Phase, SharedCommandCenter};
pub use error::{Error, Result};
pub use protocol::{ErrorKind, Message, MessageEncoder, Meterage};
pub use server::{ConnectionPort, MonitoringServer, ServerEvent};
