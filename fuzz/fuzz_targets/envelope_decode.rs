//! Fuzz target for Envelope::decode
//!
//! Feeds arbitrary text frames to the decoder. Decoding must never panic,
//! and anything that decodes must survive an encode/decode cycle unchanged.

#![no_main]

use libfuzzer_sys::fuzz_target;
use talkie_proto::Envelope;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(envelope) = Envelope::decode(text) else {
        return;
    };

    let encoded = envelope.encode().expect("decoded envelope must encode");
    assert_eq!(Envelope::decode(&encoded).ok(), Some(envelope));
});
