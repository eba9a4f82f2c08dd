//! Fuzz target: cipher decoding followed by message decoding
//!
//! Runs the server's inbound path over every built-in cipher.  Neither
//! stage may panic, and any ciphertext a cipher accepts must re-encode to
//! the same bytes.
//!
//! cargo fuzz run fuzz_cipher_decode

#![no_main]

use devmon::protocol::Message;
use devmon::protocol::cipher::{self, BUILTIN_NAMES, Cipher};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    for name in BUILTIN_NAMES {
        let Some(cipher) = cipher::builtin(name) else {
            continue;
        };
        if let Ok(plain) = cipher.decode(data) {
            assert_eq!(cipher.encode(&plain), data, "{name}: decode is not canonical");
            let _ = Message::decode(&plain);
        }
    }
});
