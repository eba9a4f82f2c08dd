//! Unified error types for the monitoring server.
//!
//! A single [`Error`] enum that every subsystem converts into, keeping the
//! server loop and the replay tool uniform.  Engine outcomes such as
//! `Obsolete` are *not* errors here: they are wire values
//! ([`ErrorKind`](crate::protocol::message::ErrorKind)) sent back to devices.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation outside the engine funnels into this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A payload could not be decoded into a message.
    Decode(DecodeError),
    /// The obfuscation layer rejected an operation.
    Encoder(EncoderError),
    /// Configuration is invalid or could not be parsed.
    Config(ConfigError),
    /// The transport failed to deliver a reply.
    Transport(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Decode(e) => write!(f, "decode: {e}"),
            Self::Encoder(e) => write!(f, "encoder: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Transport(msg) => write!(f, "transport: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Message decoding
// ---------------------------------------------------------------------------

/// Why a byte buffer did not yield a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// Zero-length buffer.
    Empty,
    /// First byte matches no known signature.
    UnknownSignature(u8),
    /// Signature recognised but the payload is shorter than its fixed width.
    Truncated {
        signature: u8,
        expected: usize,
        actual: usize,
    },
    /// Error message carrying an unknown error code.
    InvalidErrorCode(u8),
    /// Bytes left over after a complete message.
    TrailingBytes { signature: u8, extra: usize },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty buffer"),
            Self::UnknownSignature(b) => write!(f, "unknown signature {b:#04x}"),
            Self::Truncated {
                signature,
                expected,
                actual,
            } => write!(
                f,
                "truncated '{}' payload: expected {expected} bytes, got {actual}",
                *signature as char
            ),
            Self::InvalidErrorCode(b) => write!(f, "invalid error code {b:#04x}"),
            Self::TrailingBytes { signature, extra } => {
                write!(f, "{extra} trailing bytes after '{}' message", *signature as char)
            }
        }
    }
}

impl std::error::Error for DecodeError {}

impl From<DecodeError> for Error {
    fn from(e: DecodeError) -> Self {
        Self::Decode(e)
    }
}

// ---------------------------------------------------------------------------
// Obfuscation layer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncoderError {
    /// No cipher registered under this name.
    UnknownCipher(String),
    /// An operation needed a selected cipher and none is selected.
    NoCipherSelected,
    /// Ciphertext is not a valid output of the cipher.
    Malformed(&'static str),
}

impl fmt::Display for EncoderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownCipher(name) => write!(f, "unknown cipher '{name}'"),
            Self::NoCipherSelected => write!(f, "no cipher selected"),
            Self::Malformed(why) => write!(f, "malformed ciphertext: {why}"),
        }
    }
}

impl std::error::Error for EncoderError {}

impl From<EncoderError> for Error {
    fn from(e: EncoderError) -> Self {
        Self::Encoder(e)
    }
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A field failed validation.  The message names the field.
    ValidationFailed(&'static str),
    /// The document could not be parsed.
    Parse(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ValidationFailed(msg) => write!(f, "validation failed: {msg}"),
            Self::Parse(msg) => write!(f, "parse error: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
