//! Monitoring server, the device-facing core.
//!
//! [`MonitoringServer`] owns the command engine and the obfuscation layer.
//! Transports feed it [`ServerEvent`]s and hand it a [`ConnectionPort`] to
//! answer through; it never touches a socket itself.
//!
//! ```text
//!  payload ──▶ cipher decode ──▶ Message::decode ──▶ CommandCenter
//!                                                        │
//!  ConnectionPort ◀── cipher encode ◀── Message::to_bytes ┘
//! ```

use log::{debug, info, warn};

use crate::config::{DeviceWorkSchedule, ServerConfig};
use crate::engine::{CommandCenter, DeviationRecord, DeviceId, Phase};
use crate::error::{EncoderError, Error, Result};
use crate::protocol::cipher;
use crate::protocol::{Message, MessageEncoder};

use super::channels::{EventChannel, ServerEvent};
use super::ports::ConnectionPort;

#[derive(Debug, Default)]
pub struct MonitoringServer {
    center: CommandCenter,
    encoder: MessageEncoder,
    forget_on_disconnect: bool,
}

impl MonitoringServer {
    /// Server with the default cipher registry and nothing selected.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a server from validated configuration: select the cipher
    /// (registering it first if the default registry lacks it) and apply
    /// the initial schedules.
    pub fn from_config(config: &ServerConfig) -> Result<Self> {
        config.validate()?;

        let mut server = Self::new();
        server.forget_on_disconnect = config.forget_on_disconnect;

        if let Some(name) = config.cipher.as_deref() {
            if !server.encoder.contains(name) {
                let builtin = cipher::builtin(name)
                    .ok_or_else(|| EncoderError::UnknownCipher(name.to_owned()))?;
                server.encoder.add_cipher(builtin);
            }
            server.encoder.select(name)?;
        }

        for schedule in &config.schedules {
            server.set_device_work_schedule(schedule);
        }

        info!(
            "Server: ready (cipher={:?}, devices={}, forget_on_disconnect={})",
            server.encoder.selected(),
            config.schedules.len(),
            server.forget_on_disconnect
        );
        Ok(server)
    }

    // ── Passthrough operations ────────────────────────────────

    pub fn set_device_work_schedule(&mut self, schedule: &DeviceWorkSchedule) {
        self.set_schedule(schedule.device_id, schedule.phases.clone());
    }

    pub fn set_schedule(&mut self, device_id: DeviceId, phases: Vec<Phase>) {
        self.center.set_schedule(device_id, phases);
    }

    pub fn deviation_stats(&self, device_id: DeviceId) -> Vec<DeviationRecord> {
        self.center.deviation_stats(device_id)
    }

    pub fn forget_device(&mut self, device_id: DeviceId) {
        self.center.forget_device(device_id);
    }

    pub fn set_forget_on_disconnect(&mut self, enabled: bool) {
        self.forget_on_disconnect = enabled;
    }

    pub fn encoder(&self) -> &MessageEncoder {
        &self.encoder
    }

    /// Register or select ciphers at runtime.
    pub fn encoder_mut(&mut self) -> &mut MessageEncoder {
        &mut self.encoder
    }

    pub fn command_center(&self) -> &CommandCenter {
        &self.center
    }

    // ── Event handling ────────────────────────────────────────

    /// Turn one ciphered payload into a ciphered reply.
    ///
    /// `Ok(None)` means the payload decoded to something other than a
    /// meterage and was ignored.
    pub fn handle_message(
        &mut self,
        device_id: DeviceId,
        payload: &[u8],
    ) -> Result<Option<Vec<u8>>> {
        let plain = self.encoder.try_decode(payload)?;
        let message = Message::decode(&plain)?;

        let Message::Meterage(meterage) = message else {
            warn!("Server[{}]: ignoring unexpected {}", device_id, message);
            return Ok(None);
        };

        let reply = self.center.process_meterage(device_id, meterage);
        debug!("Server[{}]: {} -> {}", device_id, message, reply);

        let encoded = self.encoder.encode(&reply.to_bytes());
        if encoded.is_empty() {
            return Err(EncoderError::NoCipherSelected.into());
        }
        Ok(Some(encoded))
    }

    /// Apply one event.  Failures are logged and never reach the engine.
    pub fn handle_event<P: ConnectionPort>(&mut self, event: ServerEvent, port: &mut P) {
        match event {
            ServerEvent::Connected(device_id) => {
                info!("Server[{}]: connected", device_id);
            }
            ServerEvent::Disconnected(device_id) => {
                info!("Server[{}]: disconnected", device_id);
                if self.forget_on_disconnect {
                    self.center.forget_device(device_id);
                }
            }
            ServerEvent::Message { device_id, payload } => {
                let reply = match self.handle_message(device_id, &payload) {
                    Ok(Some(reply)) => reply,
                    Ok(None) => return,
                    Err(e) => {
                        warn!("Server[{}]: dropped payload: {}", device_id, e);
                        return;
                    }
                };
                if let Err(e) = port.send(device_id, &reply) {
                    let e = Error::Transport(format!("{e:?}"));
                    warn!("Server[{}]: reply not delivered: {}", device_id, e);
                }
            }
            ServerEvent::Shutdown => {
                debug!("Server: shutdown requested");
            }
        }
    }

    /// Handle every event already queued, without waiting.  Stops early at
    /// `Shutdown`.  Returns the number of events consumed.
    pub fn drain<P: ConnectionPort>(&mut self, channel: &EventChannel, port: &mut P) -> usize {
        let mut handled = 0;
        while let Ok(event) = channel.try_receive() {
            handled += 1;
            if matches!(event, ServerEvent::Shutdown) {
                break;
            }
            self.handle_event(event, port);
        }
        handled
    }

    /// Serve events until `Shutdown` arrives.
    pub async fn serve<P: ConnectionPort>(&mut self, channel: &EventChannel, port: &mut P) {
        info!("Server: serving");
        loop {
            let event = channel.receive().await;
            if matches!(event, ServerEvent::Shutdown) {
                info!("Server: stopped");
                return;
            }
            self.handle_event(event, port);
        }
    }
}
