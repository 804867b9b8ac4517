//! Fuzz target for embedded signed-message splitting.
//!
//! The splitter scans raw bytes for the last signature opener; hostile
//! message bodies full of decoy markers must never panic or misparse into
//! an out-of-bounds span.

#![no_main]

use libfuzzer_sys::fuzz_target;
use reop_core::armor;

fuzz_target!(|data: &[u8]| {
    if let Ok((span, _sig)) = armor::split_signed_message(data) {
        // The span always lies inside the input, after the opener
        assert!(span.len() <= data.len());
    }
});
