//! Transport → server event queue.
//!
//! A bounded `embassy-sync` channel carries connection lifecycle and
//! inbound payloads from whatever owns the sockets to the task running
//! [`MonitoringServer`](super::MonitoringServer).  Events from one
//! producer are delivered in order.
//!
//! ```text
//! ┌──────────────┐  ServerEvent  ┌──────────────────┐
//! │  Transport   │─────────────▶│ MonitoringServer │──▶ ConnectionPort
//! │  (any task)  │               │  (single owner)  │
//! └──────────────┘               └──────────────────┘
//! ```

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use heapless::Vec;
use log::warn;

use crate::engine::DeviceId;

/// Largest inbound payload accepted from a transport.  Covers the widest
/// cipher expansion of the largest message.
pub const MAX_PAYLOAD_LEN: usize = 64;

/// Channel depth for inbound events.
pub const EVENT_QUEUE_DEPTH: usize = 16;

#[derive(Debug)]
pub enum ServerEvent {
    /// A connection was bound to a device id.
    Connected(DeviceId),
    /// The device's connection closed.
    Disconnected(DeviceId),
    /// One ciphered payload received from a device.
    Message {
        device_id: DeviceId,
        payload: Vec<u8, MAX_PAYLOAD_LEN>,
    },
    /// Stop [`serve`](super::MonitoringServer::serve) after everything
    /// queued before it.
    Shutdown,
}

impl ServerEvent {
    /// Build a `Message` event, or `None` if `payload` exceeds
    /// [`MAX_PAYLOAD_LEN`].
    pub fn message(device_id: DeviceId, payload: &[u8]) -> Option<Self> {
        let payload = Vec::from_slice(payload).ok()?;
        Some(Self::Message { device_id, payload })
    }
}

pub type EventChannel = Channel<CriticalSectionRawMutex, ServerEvent, EVENT_QUEUE_DEPTH>;

/// Empty event channel.
pub const fn event_channel() -> EventChannel {
    Channel::new()
}

/// Non-blocking enqueue for producers that must not wait.
/// Returns `false` (and logs) when the queue is full.
pub fn post(channel: &EventChannel, event: ServerEvent) -> bool {
    if channel.try_send(event).is_err() {
        warn!("Server: event queue full, dropping event");
        return false;
    }
    true
}
