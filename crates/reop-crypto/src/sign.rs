//! Ed25519 detached signatures.
//!
//! Secret keys use the 64-byte seed-then-public layout that the reop secret
//! key format stores on disk, so a parsed key feeds straight into signing.
//! Loading a keypair re-checks that the public half matches the seed, which
//! catches corrupted or spliced secret keys before any signature is made.

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;

use crate::{CryptoError, Result};

/// Size of an Ed25519 public key in bytes.
pub const PUBLIC_KEY_SIZE: usize = 32;

/// Size of an Ed25519 secret key in bytes (seed followed by public key).
pub const SECRET_KEY_SIZE: usize = 64;

/// Size of an Ed25519 signature in bytes.
pub const SIGNATURE_SIZE: usize = 64;

/// Generate a fresh Ed25519 keypair as `(public, secret)` raw bytes.
pub fn sign_keypair() -> ([u8; PUBLIC_KEY_SIZE], [u8; SECRET_KEY_SIZE]) {
    let signing = SigningKey::generate(&mut OsRng);
    (signing.verifying_key().to_bytes(), signing.to_keypair_bytes())
}

/// Produce a detached signature over `msg`.
///
/// # Errors
///
/// Returns [`CryptoError::MalformedKeypair`] if the two halves of the
/// 64-byte secret key do not correspond.
pub fn sign_detached(seckey: &[u8; SECRET_KEY_SIZE], msg: &[u8]) -> Result<[u8; SIGNATURE_SIZE]> {
    let signing =
        SigningKey::from_keypair_bytes(seckey).map_err(|_| CryptoError::MalformedKeypair)?;
    Ok(signing.sign(msg).to_bytes())
}

/// Verify a detached signature over `msg`.
///
/// # Errors
///
/// Returns [`CryptoError::BadSignature`] if the public key is not a valid
/// curve point or the signature does not verify.
pub fn verify_detached(
    pubkey: &[u8; PUBLIC_KEY_SIZE],
    msg: &[u8],
    sig: &[u8; SIGNATURE_SIZE],
) -> Result<()> {
    let verifying = VerifyingKey::from_bytes(pubkey).map_err(|_| CryptoError::BadSignature)?;
    let signature = Signature::from_bytes(sig);
    verifying
        .verify(msg, &signature)
        .map_err(|_| CryptoError::BadSignature)
}
