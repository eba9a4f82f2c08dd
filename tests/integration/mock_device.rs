//! Mock devices and an in-process loopback link for server tests.
//!
//! A [`MockDevice`] plays back a list of measurements the way a real meter
//! does: it sends one, waits for the reply, then sends the next.  The
//! [`Bench`] shuttles payloads between devices and a live
//! [`MonitoringServer`] through the real event channel.

use std::collections::{BTreeMap, VecDeque};

use devmon::engine::DeviceId;
use devmon::protocol::cipher::{self, DUMMY};
use devmon::protocol::{Message, MessageEncoder, Meterage};
use devmon::server::channels::{event_channel, post};
use devmon::server::{ConnectionPort, EventChannel, MonitoringServer, ServerEvent};

// ── MockDevice ────────────────────────────────────────────────

pub struct MockDevice {
    encoder: MessageEncoder,
    meterages: Vec<u8>,
    next: usize,
    received: Vec<Message>,
}

#[allow(dead_code)]
impl MockDevice {
    /// Device speaking plain bytes (`Dummy` cipher).
    pub fn new() -> Self {
        let mut encoder = MessageEncoder::new();
        encoder.add_cipher(Box::new(cipher::Dummy));
        encoder.select(DUMMY).unwrap();
        Self {
            encoder,
            meterages: Vec::new(),
            next: 0,
            received: Vec::new(),
        }
    }

    pub fn encoder_mut(&mut self) -> &mut MessageEncoder {
        &mut self.encoder
    }

    /// Queue a new run.  Timestamps restart at zero, one per value.
    pub fn set_meterages(&mut self, values: &[u8]) {
        self.meterages = values.to_vec();
        self.next = 0;
    }

    /// Ciphered payload for the next measurement, if any remain.
    pub fn next_payload(&mut self) -> Option<Vec<u8>> {
        let value = *self.meterages.get(self.next)?;
        let meterage = Meterage::new(self.next as u64, value);
        self.next += 1;
        Some(self.encoder.encode(&Message::from(meterage).to_bytes()))
    }

    /// Accept a reply and hand back the next measurement to send.
    /// Replies that fail to decode are not recorded.
    pub fn receive(&mut self, payload: &[u8]) -> Option<Vec<u8>> {
        let plain = self.encoder.decode(payload);
        if let Ok(message) = Message::decode(&plain) {
            self.received.push(message);
        }
        self.next_payload()
    }

    pub fn messages(&self) -> &[Message] {
        &self.received
    }
}

// ── Loopback link ─────────────────────────────────────────────

/// Captures every reply the server sends, in order.
#[derive(Default)]
pub struct Loopback {
    pub outbox: VecDeque<(DeviceId, Vec<u8>)>,
}

impl ConnectionPort for Loopback {
    type Error = ();

    fn send(&mut self, device_id: DeviceId, payload: &[u8]) -> Result<(), ()> {
        self.outbox.push_back((device_id, payload.to_vec()));
        Ok(())
    }
}

// ── Bench ─────────────────────────────────────────────────────

/// A server wired to any number of mock devices.
pub struct Bench {
    pub server: MonitoringServer,
    pub devices: BTreeMap<DeviceId, MockDevice>,
    channel: EventChannel,
    link: Loopback,
}

#[allow(dead_code)]
impl Bench {
    /// Server and devices both on the `Dummy` cipher.
    pub fn new() -> Self {
        let mut server = MonitoringServer::new();
        server.encoder_mut().add_cipher(Box::new(cipher::Dummy));
        server.encoder_mut().select(DUMMY).unwrap();
        Self::with_server(server)
    }

    pub fn with_server(server: MonitoringServer) -> Self {
        Self {
            server,
            devices: BTreeMap::new(),
            channel: event_channel(),
            link: Loopback::default(),
        }
    }

    pub fn connect(&mut self, device_id: DeviceId) {
        self.devices.insert(device_id, MockDevice::new());
        assert!(post(&self.channel, ServerEvent::Connected(device_id)));
    }

    pub fn disconnect(&mut self, device_id: DeviceId) {
        self.devices.remove(&device_id);
        assert!(post(&self.channel, ServerEvent::Disconnected(device_id)));
    }

    pub fn device(&mut self, device_id: DeviceId) -> &mut MockDevice {
        self.devices.get_mut(&device_id).unwrap()
    }

    /// Send `values` from `device_id`, one per reply, starting now.
    pub fn start(&mut self, device_id: DeviceId, values: &[u8]) {
        let device = self.device(device_id);
        device.set_meterages(values);
        if let Some(payload) = device.next_payload() {
            self.send(device_id, &payload);
        }
    }

    /// Run until no event or reply is in flight.
    pub fn run(&mut self) {
        loop {
            self.server.drain(&self.channel, &mut self.link);
            if self.link.outbox.is_empty() {
                break;
            }
            while let Some((device_id, reply)) = self.link.outbox.pop_front() {
                let next = self
                    .devices
                    .get_mut(&device_id)
                    .and_then(|d| d.receive(&reply));
                if let Some(payload) = next {
                    self.send(device_id, &payload);
                }
            }
        }
    }

    pub fn messages(&self, device_id: DeviceId) -> &[Message] {
        self.devices[&device_id].messages()
    }

    fn send(&self, device_id: DeviceId, payload: &[u8]) {
        let event = ServerEvent::message(device_id, payload).unwrap();
        assert!(post(&self.channel, event), "event queue overflow");
    }
}
