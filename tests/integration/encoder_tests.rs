//! Obfuscation registry behaviour seen from outside the crate.

use devmon::error::EncoderError;
use devmon::protocol::MessageEncoder;
use devmon::protocol::cipher::{Cipher, DUMMY, Dummy, MIRROR, MULTIPLY41, ROT3};

fn every_byte() -> Vec<u8> {
    (0..=u8::MAX).collect()
}

/// Ignores its input; used to see which registration is live.
struct Canned(&'static [u8]);

impl Cipher for Canned {
    fn name(&self) -> &str {
        "Test"
    }
    fn encode(&self, _plain: &[u8]) -> Vec<u8> {
        self.0.to_vec()
    }
    fn decode(&self, _encoded: &[u8]) -> Result<Vec<u8>, EncoderError> {
        Ok(self.0.to_vec())
    }
}

#[test]
fn fresh_encoder_outputs_nothing() {
    let encoder = MessageEncoder::new();
    assert!(encoder.encode(b"123").is_empty());
    assert!(encoder.decode(b"123").is_empty());
}

#[test]
fn dummy_must_be_registered_before_use() {
    let mut encoder = MessageEncoder::new();
    assert_eq!(
        encoder.select(DUMMY),
        Err(EncoderError::UnknownCipher(DUMMY.into()))
    );
    encoder.add_cipher(Box::new(Dummy));
    encoder.select(DUMMY).unwrap();

    let message = every_byte();
    assert_eq!(encoder.encode(&message), message);
    assert_eq!(encoder.decode(&message), message);
}

#[test]
fn failed_select_keeps_encoder_closed() {
    let mut encoder = MessageEncoder::new();
    assert!(encoder.select("123").is_err());
    assert!(encoder.selected().is_none());
    assert!(encoder.encode(b"123").is_empty());
}

#[test]
fn adding_another_cipher_keeps_the_selection() {
    let mut encoder = MessageEncoder::new();
    encoder.add_cipher(Box::new(Canned(b"123")));
    encoder.select("Test").unwrap();
    encoder.add_cipher(Box::new(Dummy));
    assert_eq!(encoder.encode(b"test"), b"123");
    assert_eq!(encoder.decode(b"test"), b"123");
}

#[test]
fn re_adding_a_name_swaps_the_live_cipher() {
    let mut encoder = MessageEncoder::new();
    encoder.add_cipher(Box::new(Canned(b"123")));
    encoder.select("Test").unwrap();
    assert_eq!(encoder.encode(b"test"), b"123");
    encoder.add_cipher(Box::new(Canned(b"456")));
    assert_eq!(encoder.encode(b"test"), b"456");
    assert_eq!(encoder.decode(b"test"), b"456");
}

#[test]
fn rot3_over_every_byte() {
    let mut encoder = MessageEncoder::new();
    encoder.select(ROT3).unwrap();
    let message = every_byte();
    let encoded = encoder.encode(&message);
    assert_eq!(encoded.len(), message.len());
    for (plain, enc) in message.iter().zip(&encoded) {
        assert_eq!(*enc, plain.wrapping_add(3));
    }
    assert_eq!(encoder.decode(&encoded), message);
}

#[test]
fn mirror_over_every_byte() {
    let mut encoder = MessageEncoder::new();
    encoder.select(MIRROR).unwrap();
    let message = every_byte();
    let encoded = encoder.encode(&message);
    assert_eq!(encoded.len(), message.len() * 3);

    let picked: Vec<u8> = [0usize, 9, 90, 91, 100, 132, 159, 255]
        .iter()
        .flat_map(|&b| encoded[3 * b..3 * b + 3].to_vec())
        .collect();
    assert_eq!(
        picked,
        [0u8, 0, 0, 1, 0, 9, 2, 0, 9, 2, 0, 19, 3, 0, 1, 3, 0, 231, 3, 3, 183, 3, 2, 40]
    );
    assert_eq!(encoder.decode(&encoded), message);
}

#[test]
fn multiply41_over_every_byte() {
    let mut encoder = MessageEncoder::new();
    encoder.select(MULTIPLY41).unwrap();
    let message = every_byte();
    let encoded = encoder.encode(&message);
    assert_eq!(encoded.len(), message.len() * 2);

    let picked: Vec<u8> = [0usize, 1, 6, 7, 255]
        .iter()
        .flat_map(|&b| encoded[2 * b..2 * b + 2].to_vec())
        .collect();
    assert_eq!(picked, [0u8, 0, 0, 41, 0, 246, 1, 31, 40, 215]);
    assert_eq!(encoder.decode(&encoded), message);
}

#[test]
fn malformed_ciphertext_decodes_to_nothing() {
    let mut encoder = MessageEncoder::new();
    encoder.select(MULTIPLY41).unwrap();
    assert!(encoder.decode(&[0, 41, 0]).is_empty());
    assert!(encoder.try_decode(&[0, 42]).is_err());
}
