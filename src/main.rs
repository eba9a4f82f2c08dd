//! devmon-replay: drive the monitoring server from a measurement log.
//!
//! Each input line `<device_id> <timestamp> <value>` is ciphered the way a
//! device would send it, queued on the server's event channel, and the
//! server's reply is deciphered and printed as `<device_id> <reply>`.
//!
//! ```text
//!  reader thread ──ServerEvent──▶ EventChannel ──▶ MonitoringServer::serve
//!                                                        │
//!                              stdout ◀── ReplyPrinter ◀─┘
//! ```
//!
//! Usage:
//!   devmon-replay --config server.json --input log.txt --stats
//!   RUST_LOG=debug devmon-replay < log.txt
#![deny(unused_must_use)]

use std::collections::{BTreeMap, HashSet};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;
use std::thread;

use anyhow::{Context, Result, bail};
use clap::Parser;
use futures_lite::future::block_on;
use log::{info, warn};

use devmon::engine::{DeviationRecord, DeviceId};
use devmon::protocol::cipher::{self, DUMMY};
use devmon::protocol::{Message, MessageEncoder, Meterage};
use devmon::server::channels::event_channel;
use devmon::server::{ConnectionPort, EventChannel, MonitoringServer, ServerEvent};
use devmon::ServerConfig;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server configuration (JSON).  Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Measurement log; reads stdin when omitted
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Print deviation statistics as JSON after the replay
    #[arg(long)]
    stats: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            ServerConfig::from_json(&json)?
        }
        None => ServerConfig::default(),
    };
    if config.cipher.is_none() {
        config.cipher = Some(DUMMY.into());
    }

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.log_filter.as_str()),
    )
    .init();

    let mut server = MonitoringServer::from_config(&config)?;
    let cipher_name = config.cipher.as_deref().unwrap_or(DUMMY);
    let mut printer = ReplyPrinter {
        encoder: device_encoder(cipher_name)?,
        out: io::stdout().lock(),
    };
    let sender = device_encoder(cipher_name)?;

    let input: Box<dyn BufRead + Send> = match &args.input {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("opening {}", path.display()))?,
        )),
        None => Box::new(BufReader::new(io::stdin())),
    };

    let channel = &event_channel();
    let sent = thread::scope(|s| {
        let reader = s.spawn(move || replay(input, &sender, channel));
        block_on(server.serve(channel, &mut printer));
        reader.join()
    });
    let sent = match sent {
        Ok(result) => result?,
        Err(_) => bail!("reader thread panicked"),
    };
    info!("Replay: {} measurements sent", sent);

    if args.stats {
        let mut ids: Vec<DeviceId> = server.command_center().device_ids().collect();
        ids.sort_unstable();
        let stats: BTreeMap<DeviceId, Vec<DeviationRecord>> = ids
            .into_iter()
            .map(|id| (id, server.deviation_stats(id)))
            .collect();
        writeln!(printer.out, "{}", serde_json::to_string_pretty(&stats)?)?;
    }
    Ok(())
}

/// Encoder playing the device side of the link.
fn device_encoder(name: &str) -> Result<MessageEncoder> {
    let mut encoder = MessageEncoder::new();
    if !encoder.contains(name) {
        let builtin = cipher::builtin(name).with_context(|| format!("unknown cipher {name}"))?;
        encoder.add_cipher(builtin);
    }
    encoder.select(name)?;
    Ok(encoder)
}

/// Feed every measurement in `input` to the server, then close all
/// connections and stop the server.  Returns the number of measurements
/// queued.
fn replay(
    input: Box<dyn BufRead + Send>,
    encoder: &MessageEncoder,
    channel: &EventChannel,
) -> Result<usize> {
    let mut connected = HashSet::new();
    let mut sent = 0;

    for (lineno, line) in input.lines().enumerate() {
        let line = line?;
        let (device_id, meterage) = match parse_line(&line) {
            Ok(Some(sample)) => sample,
            Ok(None) => continue,
            Err(e) => {
                warn!("Replay: line {}: {}", lineno + 1, e);
                continue;
            }
        };

        if connected.insert(device_id) {
            block_on(channel.send(ServerEvent::Connected(device_id)));
        }
        let payload = encoder.encode(&Message::from(meterage).to_bytes());
        let Some(event) = ServerEvent::message(device_id, &payload) else {
            warn!("Replay: line {}: payload too large", lineno + 1);
            continue;
        };
        block_on(channel.send(event));
        sent += 1;
    }

    let mut ids: Vec<DeviceId> = connected.into_iter().collect();
    ids.sort_unstable();
    for device_id in ids {
        block_on(channel.send(ServerEvent::Disconnected(device_id)));
    }
    block_on(channel.send(ServerEvent::Shutdown));
    Ok(sent)
}

/// `<device_id> <timestamp> <value>`; `None` for blank lines and comments.
fn parse_line(line: &str) -> Result<Option<(DeviceId, Meterage)>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let fields: Vec<&str> = line.split_whitespace().collect();
    let [device_id, timestamp, value] = fields[..] else {
        bail!("expected 3 fields, got {}", fields.len());
    };
    let device_id = device_id.parse().context("device_id")?;
    let timestamp = timestamp.parse().context("timestamp")?;
    let value = value.parse().context("value")?;
    Ok(Some((device_id, Meterage::new(timestamp, value))))
}

/// Device end of the loopback: deciphers each reply and prints it.
struct ReplyPrinter<W: Write> {
    encoder: MessageEncoder,
    out: W,
}

impl<W: Write> ConnectionPort for ReplyPrinter<W> {
    type Error = anyhow::Error;

    fn send(&mut self, device_id: DeviceId, payload: &[u8]) -> Result<()> {
        let plain = self.encoder.try_decode(payload)?;
        let reply = Message::decode(&plain)?;
        writeln!(self.out, "{} {}", device_id, reply)?;
        Ok(())
    }
}
