//! # reop-crypto
//!
//! Cryptographic primitives for the reop toolkit.
//!
//! This crate is a thin, in-place façade over the fixed algorithm suite the
//! reop file formats commit to:
//!
//! - **Signatures**: Ed25519 detached signatures
//! - **Public-key encryption**: Curve25519-XSalsa20-Poly1305 (`crypto_box`)
//! - **Symmetric encryption**: XSalsa20-Poly1305 (`secretbox`)
//! - **Key derivation**: bcrypt-pbkdf for passphrase-protected keys
//!
//! All encrypt and decrypt operations work **in place** on a mutable buffer
//! and use detached 16-byte Poly1305 tags, so ciphertext length always equals
//! plaintext length. Encryption generates a fresh random 24-byte nonce and
//! returns it alongside the tag; decryption reports tag mismatch as a typed
//! authentication failure.
//!
//! ## Security
//!
//! Symmetric keys are zeroized on drop. Callers holding raw secret key bytes
//! are expected to wrap them in zeroizing containers; the higher-level key
//! types in `reop-core` do so.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod cryptobox;
pub mod error;
pub mod kdf;
pub mod secretbox;
pub mod sign;

#[cfg(test)]
mod proptests;

pub use cryptobox::{box_keypair, pub_decrypt, pub_encrypt};
pub use error::{CryptoError, Result};
pub use kdf::derive_key;
pub use secretbox::{sym_decrypt, sym_encrypt, SymKey};
pub use sign::{sign_detached, sign_keypair, verify_detached};

use rand::rngs::OsRng;
use rand::RngCore;

/// Fill a buffer with cryptographically secure random bytes.
pub fn random_bytes(buf: &mut [u8]) {
    OsRng.fill_bytes(buf);
}
