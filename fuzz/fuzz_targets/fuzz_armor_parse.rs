//! Fuzz target for the armored block parser.
//!
//! Arbitrary text must either parse cleanly or be rejected with a typed
//! error; it must never panic.

#![no_main]

use libfuzzer_sys::fuzz_target;
use reop_core::armor::{self, BlockKind};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    for kind in [BlockKind::PublicKey, BlockKind::SecretKey, BlockKind::Signature] {
        if let Ok((ident, payload)) = armor::parse_block(text, kind) {
            // Anything that parsed must re-encode and re-parse to the same
            // payload bytes
            let encoded = armor::encode_block(kind, &ident, &payload);
            let (ident2, payload2) = armor::parse_block(&encoded, kind).unwrap();
            assert_eq!(ident.as_str(), ident2.as_str());
            assert_eq!(payload, payload2);
        }
    }

    let _ = armor::parse_encrypted(text);
});
