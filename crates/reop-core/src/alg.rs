//! Fixed 2-byte algorithm identifiers.
//!
//! These are file-format constants, not a negotiation surface: any value
//! other than the ones below is a hard rejection.

/// Ed25519 signatures.
pub const SIG_ED25519: [u8; 2] = *b"Ed";

/// Curve25519-XSalsa20-Poly1305 key material; also the legacy static-key
/// message envelope.
pub const ENC_CURVE25519: [u8; 2] = *b"CS";

/// Current ephemeral-key public-key message envelope.
pub const ENC_EPHEMERAL: [u8; 2] = *b"eC";

/// Legacy ephemeral-key message envelope (embedded plaintext ephemeral key).
pub const ENC_LEGACY_EPHEMERAL: [u8; 2] = *b"eS";

/// XSalsa20-Poly1305 symmetric message envelope.
pub const SYM_SALSA_POLY: [u8; 2] = *b"SP";

/// bcrypt-pbkdf key derivation.
pub const KDF_BCRYPT: [u8; 2] = *b"BK";

use crate::{Error, Result};

/// Require `found` to equal the expected identifier.
pub(crate) fn expect(found: [u8; 2], expected: [u8; 2]) -> Result<()> {
    if found == expected {
        Ok(())
    } else {
        Err(Error::UnsupportedAlgorithm { found })
    }
}
