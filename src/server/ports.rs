//! Connection port: the server's only outbound capability.
//!
//! Concrete implementations live with the transport (TCP, serial, an
//! in-process loopback for tests).  The transport owns its connections and
//! the binding of connections to device ids; the server only asks it to
//! deliver a payload to a device.

use crate::engine::DeviceId;

/// Outbound side of a device transport.
pub trait ConnectionPort {
    /// Error type for this transport.
    type Error: core::fmt::Debug;

    /// Deliver one already-encoded payload to `device_id`.
    fn send(&mut self, device_id: DeviceId, payload: &[u8]) -> Result<(), Self::Error>;
}

/// A port that discards every reply.
/// Useful when only the engine's side effects matter.
pub struct NullConnection;

impl ConnectionPort for NullConnection {
    type Error = ();

    fn send(&mut self, _device_id: DeviceId, _payload: &[u8]) -> Result<(), ()> {
        Ok(())
    }
}

impl<T: ConnectionPort + ?Sized> ConnectionPort for &mut T {
    type Error = T::Error;

    fn send(&mut self, device_id: DeviceId, payload: &[u8]) -> Result<(), Self::Error> {
        (**self).send(device_id, payload)
    }
}
