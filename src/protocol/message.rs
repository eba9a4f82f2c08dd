//! Tagged binary message model.
//!
//! Wire format (all multi-byte integers big-endian):
//! ```text
//! ┌─────┬──────────────────────┬──────────┐
//! │ 'm' │ timestamp (8B) u64   │ value u8 │   Meterage   (10 bytes)
//! ├─────┼──────────┬───────────┴──────────┘
//! │ 'c' │ delta i8 │                            Command    (2 bytes)
//! ├─────┼──────────┤
//! │ 'e' │ 's'|'t'|'o' │                         Error      (2 bytes)
//! └─────┴─────────────┘
//! ```
//!
//! Messages are not self-delimiting beyond their fixed payload width, so a
//! decode call must own exactly one message's bytes.  Leftover bytes are
//! rejected rather than silently ignored.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::error::DecodeError;

pub const METERAGE_SIGNATURE: u8 = b'm';
pub const COMMAND_SIGNATURE: u8 = b'c';
pub const ERROR_SIGNATURE: u8 = b'e';

const METERAGE_PAYLOAD: usize = 9;
const COMMAND_PAYLOAD: usize = 1;
const ERROR_PAYLOAD: usize = 1;

/// Largest encoded message (a meterage).
pub const MAX_MESSAGE_LEN: usize = 1 + METERAGE_PAYLOAD;

/// A device's reading at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Meterage {
    pub timestamp: u64,
    pub value: u8,
}

impl Meterage {
    pub const fn new(timestamp: u64, value: u8) -> Self {
        Self { timestamp, value }
    }
}

/// Reasons the command engine declines to produce a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// The device has no schedule (never set, or set empty).
    NoSchedule,
    /// The measurement predates the first scheduled phase.
    NoTimestamp,
    /// The timestamp is not newer than the last accepted one.
    Obsolete,
}

impl ErrorKind {
    /// Single-byte wire code.
    pub const fn code(self) -> u8 {
        match self {
            Self::NoSchedule => b's',
            Self::NoTimestamp => b't',
            Self::Obsolete => b'o',
        }
    }

    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            b's' => Some(Self::NoSchedule),
            b't' => Some(Self::NoTimestamp),
            b'o' => Some(Self::Obsolete),
            _ => None,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoSchedule => write!(f, "NoSchedule"),
            Self::NoTimestamp => write!(f, "NoTimestamp"),
            Self::Obsolete => write!(f, "Obsolete"),
        }
    }
}

/// Every message that can cross the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Message {
    /// Device → server: a measurement.
    Meterage(Meterage),
    /// Server → device: corrective delta.
    Command(i8),
    /// Server → device: why no command was produced.
    Error(ErrorKind),
}

/// Decoders in trial order.  Each receives the bytes after the signature.
const DECODERS: [(u8, fn(&[u8]) -> Result<Message, DecodeError>); 3] = [
    (ERROR_SIGNATURE, decode_error),
    (METERAGE_SIGNATURE, decode_meterage),
    (COMMAND_SIGNATURE, decode_command),
];

impl Message {
    pub const fn signature(&self) -> u8 {
        match self {
            Self::Meterage(_) => METERAGE_SIGNATURE,
            Self::Command(_) => COMMAND_SIGNATURE,
            Self::Error(_) => ERROR_SIGNATURE,
        }
    }

    /// Total encoded size including the signature byte.
    pub const fn encoded_len(&self) -> usize {
        1 + match self {
            Self::Meterage(_) => METERAGE_PAYLOAD,
            Self::Command(_) => COMMAND_PAYLOAD,
            Self::Error(_) => ERROR_PAYLOAD,
        }
    }

    /// Encode into `out`.
    ///
    /// Returns the number of bytes written, or `None` if `out` is too small.
    pub fn encode_into(&self, out: &mut [u8]) -> Option<usize> {
        let len = self.encoded_len();
        if out.len() < len {
            return None;
        }

        out[0] = self.signature();
        match *self {
            Self::Meterage(m) => {
                out[1..9].copy_from_slice(&m.timestamp.to_be_bytes());
                out[9] = m.value;
            }
            Self::Command(delta) => out[1] = delta.to_be_bytes()[0],
            Self::Error(kind) => out[1] = kind.code(),
        }

        Some(len)
    }

    /// Encode into a freshly allocated buffer.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = [0u8; MAX_MESSAGE_LEN];
        let len = self.encode_into(&mut buf).unwrap_or(0);
        buf[..len].to_vec()
    }

    /// Decode exactly one message from `bytes`.
    ///
    /// Pure and total: any input yields either a complete message or a
    /// [`DecodeError`], never a partial value.
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let (&first, payload) = bytes.split_first().ok_or(DecodeError::Empty)?;

        for (signature, decoder) in DECODERS {
            if first == signature {
                return decoder(payload);
            }
        }

        Err(DecodeError::UnknownSignature(first))
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Meterage(m) => write!(f, "Meterage(timestamp={}, value={})", m.timestamp, m.value),
            Self::Command(delta) => write!(f, "Command({delta})"),
            Self::Error(kind) => write!(f, "Error({kind})"),
        }
    }
}

impl From<Meterage> for Message {
    fn from(m: Meterage) -> Self {
        Self::Meterage(m)
    }
}

impl From<ErrorKind> for Message {
    fn from(kind: ErrorKind) -> Self {
        Self::Error(kind)
    }
}

// ── Payload decoders ──────────────────────────────────────────

/// Take exactly `N` payload bytes.
fn fixed<const N: usize>(signature: u8, payload: &[u8]) -> Result<[u8; N], DecodeError> {
    if payload.len() < N {
        return Err(DecodeError::Truncated {
            signature,
            expected: N,
            actual: payload.len(),
        });
    }
    if payload.len() > N {
        return Err(DecodeError::TrailingBytes {
            signature,
            extra: payload.len() - N,
        });
    }

    let mut out = [0u8; N];
    out.copy_from_slice(payload);
    Ok(out)
}

fn decode_meterage(payload: &[u8]) -> Result<Message, DecodeError> {
    let raw: [u8; METERAGE_PAYLOAD] = fixed(METERAGE_SIGNATURE, payload)?;
    let mut ts = [0u8; 8];
    ts.copy_from_slice(&raw[..8]);
    Ok(Message::Meterage(Meterage::new(u64::from_be_bytes(ts), raw[8])))
}

fn decode_command(payload: &[u8]) -> Result<Message, DecodeError> {
    let raw: [u8; COMMAND_PAYLOAD] = fixed(COMMAND_SIGNATURE, payload)?;
    Ok(Message::Command(i8::from_be_bytes(raw)))
}

fn decode_error(payload: &[u8]) -> Result<Message, DecodeError> {
    let [code]: [u8; ERROR_PAYLOAD] = fixed(ERROR_SIGNATURE, payload)?;
    ErrorKind::from_code(code)
        .map(Message::Error)
        .ok_or(DecodeError::InvalidErrorCode(code))
}
