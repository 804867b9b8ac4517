//! Fuzz target for the binary file framing.

#![no_main]

use libfuzzer_sys::fuzz_target;
use reop_core::binary;

fuzz_target!(|data: &[u8]| {
    if let Ok((ident, header, ciphertext)) = binary::parse_binary(data) {
        // Accepted input must re-encode to the identical file
        let encoded = binary::encode_binary(&header, &ident, &ciphertext);
        assert_eq!(encoded, data);
    }
});
