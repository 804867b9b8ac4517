//! Fuzz target for envelope header dispatch.
//!
//! The parser dispatches on a 2-byte tag and enforces an exact size per
//! variant; arbitrary input must never panic, and anything accepted must
//! serialize back to the identical bytes.

#![no_main]

use libfuzzer_sys::fuzz_target;
use reop_core::EnvelopeHeader;

fuzz_target!(|data: &[u8]| {
    if let Ok(header) = EnvelopeHeader::from_bytes(data) {
        assert_eq!(header.to_bytes(), data);
        assert_eq!(header.size(), data.len());
    }
});
