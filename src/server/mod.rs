//! Device-facing server: event queue, outbound port, and the service that
//! ties them to the engine.
//!
//! ```text
//!  Transport ──ServerEvent──▶ EventChannel ──▶ MonitoringServer
//!      ▲                                            │
//!      └──────────── ConnectionPort::send ◀─────────┘
//! ```
//!
//! Nothing in this module performs I/O directly; transports implement
//! [`ConnectionPort`] and post [`ServerEvent`]s.

pub mod channels;
pub mod ports;
pub mod service;

pub use channels::{EVENT_QUEUE_DEPTH, EventChannel, MAX_PAYLOAD_LEN, ServerEvent};
pub use ports::{ConnectionPort, NullConnection};
pub use service::MonitoringServer;
