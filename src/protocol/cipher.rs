//! Reversible byte-level obfuscation transforms.
//!
//! These sit between the message codec and the transport.  None of them is
//! a security boundary: they only make the wire bytes unreadable at a
//! glance and let both ends agree on a representation.
//!
//! | Name         | Expansion | Transform                                   |
//! |--------------|-----------|---------------------------------------------|
//! | `Dummy`      | 1×        | identity                                    |
//! | `ROT3`       | 1×        | `b + 3 (mod 256)`                           |
//! | `Multiply41` | 2×        | `b × 41` as big-endian u16                  |
//! | `Mirror`     | 3×        | `[digit count, reversed decimal as BE u16]` |

use crate::error::EncoderError;

/// A named, reversible byte transform.
pub trait Cipher: Send {
    /// Registry key.
    fn name(&self) -> &str;

    fn encode(&self, plain: &[u8]) -> Vec<u8>;

    /// Invert [`encode`](Cipher::encode).  Input that `encode` could not
    /// have produced is rejected.
    fn decode(&self, encoded: &[u8]) -> Result<Vec<u8>, EncoderError>;
}

pub const DUMMY: &str = "Dummy";
pub const ROT3: &str = "ROT3";
pub const MULTIPLY41: &str = "Multiply41";
pub const MIRROR: &str = "Mirror";

/// Names accepted by [`builtin`].
pub const BUILTIN_NAMES: [&str; 4] = [DUMMY, ROT3, MULTIPLY41, MIRROR];

/// Construct one of the bundled ciphers by name.
pub fn builtin(name: &str) -> Option<Box<dyn Cipher>> {
    match name {
        DUMMY => Some(Box::new(Dummy)),
        ROT3 => Some(Box::new(Rot3)),
        MULTIPLY41 => Some(Box::new(Multiply41)),
        MIRROR => Some(Box::new(Mirror)),
        _ => None,
    }
}

// ── Dummy ─────────────────────────────────────────────────────

/// Identity transform.
#[derive(Debug, Clone, Copy, Default)]
pub struct Dummy;

impl Cipher for Dummy {
    fn name(&self) -> &str {
        DUMMY
    }

    fn encode(&self, plain: &[u8]) -> Vec<u8> {
        plain.to_vec()
    }

    fn decode(&self, encoded: &[u8]) -> Result<Vec<u8>, EncoderError> {
        Ok(encoded.to_vec())
    }
}

// ── ROT3 ──────────────────────────────────────────────────────

const ROT3_SHIFT: u8 = 3;

#[derive(Debug, Clone, Copy, Default)]
pub struct Rot3;

impl Cipher for Rot3 {
    fn name(&self) -> &str {
        ROT3
    }

    fn encode(&self, plain: &[u8]) -> Vec<u8> {
        plain.iter().map(|b| b.wrapping_add(ROT3_SHIFT)).collect()
    }

    fn decode(&self, encoded: &[u8]) -> Result<Vec<u8>, EncoderError> {
        Ok(encoded.iter().map(|b| b.wrapping_sub(ROT3_SHIFT)).collect())
    }
}

// ── Multiply41 ────────────────────────────────────────────────

const FACTOR: u16 = 41;

#[derive(Debug, Clone, Copy, Default)]
pub struct Multiply41;

impl Cipher for Multiply41 {
    fn name(&self) -> &str {
        MULTIPLY41
    }

    fn encode(&self, plain: &[u8]) -> Vec<u8> {
        plain
            .iter()
            .flat_map(|&b| (u16::from(b) * FACTOR).to_be_bytes())
            .collect()
    }

    fn decode(&self, encoded: &[u8]) -> Result<Vec<u8>, EncoderError> {
        if encoded.len() % 2 != 0 {
            return Err(EncoderError::Malformed("odd length"));
        }

        encoded
            .chunks_exact(2)
            .map(|pair| {
                let v = u16::from_be_bytes([pair[0], pair[1]]);
                if v % FACTOR != 0 {
                    return Err(EncoderError::Malformed("not a multiple of 41"));
                }
                u8::try_from(v / FACTOR).map_err(|_| EncoderError::Malformed("value above 255"))
            })
            .collect()
    }
}

// ── Mirror ────────────────────────────────────────────────────

/// Writes each byte's decimal digits backwards.
///
/// `159` has three digits and reads `951` mirrored, so it encodes as
/// `[3, 0x03, 0xB7]`.  The digit count restores trailing zeros that the
/// mirrored number loses (`100` → `[3, 0, 1]`).
#[derive(Debug, Clone, Copy, Default)]
pub struct Mirror;

fn digit_count(mut v: u16) -> u8 {
    let mut n = 0;
    while v > 0 {
        n += 1;
        v /= 10;
    }
    n
}

/// Reverse the lowest `digits` decimal digits of `v`.
fn reverse_digits(mut v: u16, digits: u8) -> u16 {
    let mut out = 0;
    for _ in 0..digits {
        out = out * 10 + v % 10;
        v /= 10;
    }
    out
}

impl Cipher for Mirror {
    fn name(&self) -> &str {
        MIRROR
    }

    fn encode(&self, plain: &[u8]) -> Vec<u8> {
        plain
            .iter()
            .flat_map(|&b| {
                let digits = digit_count(u16::from(b));
                let [hi, lo] = reverse_digits(u16::from(b), digits).to_be_bytes();
                [digits, hi, lo]
            })
            .collect()
    }

    fn decode(&self, encoded: &[u8]) -> Result<Vec<u8>, EncoderError> {
        if encoded.len() % 3 != 0 {
            return Err(EncoderError::Malformed("length not a multiple of 3"));
        }

        encoded
            .chunks_exact(3)
            .map(|triple| {
                let digits = triple[0];
                let mirrored = u16::from_be_bytes([triple[1], triple[2]]);
                if digits > 3 || u32::from(mirrored) >= 10u32.pow(u32::from(digits)) {
                    return Err(EncoderError::Malformed("digit count mismatch"));
                }
                let value = reverse_digits(mirrored, digits);
                // A leading zero in the plain value would have been dropped
                // by digit_count, so it cannot appear here either.
                if digit_count(value) != digits {
                    return Err(EncoderError::Malformed("digit count mismatch"));
                }
                u8::try_from(value).map_err(|_| EncoderError::Malformed("value above 255"))
            })
            .collect()
    }
}
