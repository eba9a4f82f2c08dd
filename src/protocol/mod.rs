//! Wire protocol: message model plus the obfuscation layer.
//!
//! ```text
//!  device bytes ──▶ MessageEncoder::decode ──▶ Message::decode ──▶ engine
//!  engine reply ──▶ Message::to_bytes ──▶ MessageEncoder::encode ──▶ device
//! ```
//!
//! The two layers are orthogonal: [`message`] knows nothing about ciphers
//! and [`encoder`] treats every payload as opaque bytes.

pub mod cipher;
pub mod encoder;
pub mod message;

pub use encoder::MessageEncoder;
pub use message::{ErrorKind, Message, Meterage};
