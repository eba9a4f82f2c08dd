//! Named cipher registry with a single active selection.
//!
//! The encoder fails closed: until a cipher is selected, both directions
//! produce empty output, so an unconfigured endpoint can never leak
//! plaintext onto the wire.

use log::{info, warn};

use crate::error::EncoderError;

use super::cipher::{Cipher, Mirror, Multiply41, Rot3};

pub struct MessageEncoder {
    ciphers: Vec<Box<dyn Cipher>>,
    /// Resolved by name on every call, so re-registering a name swaps the
    /// active implementation.
    selected: Option<String>,
}

impl MessageEncoder {
    /// Registry pre-loaded with `ROT3`, `Mirror` and `Multiply41`.
    /// Nothing is selected.
    pub fn new() -> Self {
        let mut encoder = Self::empty();
        encoder.add_cipher(Box::new(Rot3));
        encoder.add_cipher(Box::new(Mirror));
        encoder.add_cipher(Box::new(Multiply41));
        encoder
    }

    /// Registry with no ciphers at all.
    pub fn empty() -> Self {
        Self {
            ciphers: Vec::new(),
            selected: None,
        }
    }

    /// Register `cipher`, replacing any cipher with the same name.
    pub fn add_cipher(&mut self, cipher: Box<dyn Cipher>) {
        match self.ciphers.iter_mut().find(|c| c.name() == cipher.name()) {
            Some(slot) => *slot = cipher,
            None => self.ciphers.push(cipher),
        }
    }

    /// Make `name` the active cipher.  An unknown name leaves the current
    /// selection untouched.
    pub fn select(&mut self, name: &str) -> Result<(), EncoderError> {
        if !self.contains(name) {
            warn!("Encoder: unknown cipher '{}'", name);
            return Err(EncoderError::UnknownCipher(name.to_owned()));
        }
        info!("Encoder: selected '{}'", name);
        self.selected = Some(name.to_owned());
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.ciphers.iter().any(|c| c.name() == name)
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Registered names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.ciphers.iter().map(|c| c.name())
    }

    /// Obfuscate `plain` with the active cipher.  Empty if none is selected.
    pub fn encode(&self, plain: &[u8]) -> Vec<u8> {
        match self.active() {
            Ok(cipher) => cipher.encode(plain),
            Err(_) => Vec::new(),
        }
    }

    /// Reverse [`encode`](Self::encode).  Empty if none is selected or the
    /// input is not valid ciphertext.
    pub fn decode(&self, encoded: &[u8]) -> Vec<u8> {
        match self.try_decode(encoded) {
            Ok(plain) => plain,
            Err(e) => {
                warn!("Encoder: decode failed: {}", e);
                Vec::new()
            }
        }
    }

    /// Like [`decode`](Self::decode) but reports why nothing came out.
    pub fn try_decode(&self, encoded: &[u8]) -> Result<Vec<u8>, EncoderError> {
        self.active()?.decode(encoded)
    }

    fn active(&self) -> Result<&dyn Cipher, EncoderError> {
        let name = self.selected.as_deref().ok_or(EncoderError::NoCipherSelected)?;
        self.ciphers
            .iter()
            .find(|c| c.name() == name)
            .map(|c| &**c)
            .ok_or_else(|| EncoderError::UnknownCipher(name.to_owned()))
    }
}

impl Default for MessageEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for MessageEncoder {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MessageEncoder")
            .field("ciphers", &self.names().collect::<Vec<_>>())
            .field("selected", &self.selected)
            .finish()
    }
}
