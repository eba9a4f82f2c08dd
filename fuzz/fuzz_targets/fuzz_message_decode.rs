//! Fuzz target: `Message::decode`
//!
//! Arbitrary bytes must never panic the decoder, and anything it accepts
//! must re-encode to exactly the input.
//!
//! cargo fuzz run fuzz_message_decode

#![no_main]

use devmon::protocol::Message;
use devmon::protocol::message::MAX_MESSAGE_LEN;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(message) = Message::decode(data) {
        assert!(data.len() <= MAX_MESSAGE_LEN, "accepted oversized input");
        assert_eq!(message.to_bytes(), data, "decode is not canonical");
    }
});
