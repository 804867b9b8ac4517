//! Curve25519-XSalsa20-Poly1305 authenticated public-key encryption.
//!
//! This is the classic `crypto_box` construction: a Curve25519 key agreement
//! between the sender's secret key and the recipient's public key feeds an
//! XSalsa20-Poly1305 box. Encryption operates in place with a detached tag,
//! so ciphertext length equals plaintext length.
//!
//! Key material crosses this interface as raw 32-byte arrays because the
//! reop file formats store them that way; owning types are responsible for
//! zeroizing them.

use crypto_box::aead::{AeadInPlace, Tag};
use crypto_box::{Nonce, PublicKey, SalsaBox, SecretKey};
use rand::rngs::OsRng;
use rand::RngCore;

use crate::{CryptoError, Result};

/// Size of a Curve25519 public key in bytes.
pub const PUBLIC_KEY_SIZE: usize = 32;

/// Size of a Curve25519 secret key in bytes.
pub const SECRET_KEY_SIZE: usize = 32;

/// Size of a box nonce in bytes.
pub const NONCE_SIZE: usize = 24;

/// Size of a Poly1305 authentication tag in bytes.
pub const TAG_SIZE: usize = 16;

/// Generate a fresh Curve25519 keypair as `(public, secret)` raw bytes.
pub fn box_keypair() -> ([u8; PUBLIC_KEY_SIZE], [u8; SECRET_KEY_SIZE]) {
    let secret = SecretKey::generate(&mut OsRng);
    let public = secret.public_key();
    (public.to_bytes(), secret.to_bytes())
}

/// Encrypt a buffer in place for `recipient_pub`, authenticated by
/// `sender_sec`.
///
/// Generates a random nonce, overwrites `buf` with the ciphertext, and
/// returns `(nonce, tag)`.
pub fn pub_encrypt(
    buf: &mut [u8],
    recipient_pub: &[u8; PUBLIC_KEY_SIZE],
    sender_sec: &[u8; SECRET_KEY_SIZE],
) -> Result<([u8; NONCE_SIZE], [u8; TAG_SIZE])> {
    let sbox = SalsaBox::new(&PublicKey::from(*recipient_pub), &SecretKey::from(*sender_sec));

    let mut nonce = [0u8; NONCE_SIZE];
    OsRng.fill_bytes(&mut nonce);

    let tag = sbox
        .encrypt_in_place_detached(&Nonce::from(nonce), b"", buf)
        .map_err(|_| CryptoError::Encrypt("crypto_box encryption failed".into()))?;

    let mut tag_out = [0u8; TAG_SIZE];
    tag_out.copy_from_slice(&tag);
    Ok((nonce, tag_out))
}

/// Decrypt a buffer in place that was boxed from `sender_pub` to
/// `recipient_sec`.
///
/// The tag is verified before the buffer is touched; on mismatch the
/// ciphertext is left intact and [`CryptoError::Auth`] is returned.
pub fn pub_decrypt(
    buf: &mut [u8],
    nonce: &[u8; NONCE_SIZE],
    tag: &[u8; TAG_SIZE],
    sender_pub: &[u8; PUBLIC_KEY_SIZE],
    recipient_sec: &[u8; SECRET_KEY_SIZE],
) -> Result<()> {
    let sbox = SalsaBox::new(&PublicKey::from(*sender_pub), &SecretKey::from(*recipient_sec));
    sbox.decrypt_in_place_detached(
        &Nonce::from(*nonce),
        b"",
        buf,
        &Tag::<SalsaBox>::from(*tag),
    )
    .map_err(|_| CryptoError::Auth)
}
