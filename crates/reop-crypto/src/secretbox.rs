//! XSalsa20-Poly1305 symmetric encryption with detached tags.
//!
//! The secretbox construction encrypts in place: the plaintext buffer is
//! overwritten with ciphertext of the same length, and the 16-byte Poly1305
//! tag is returned separately.
//!
//! ## Security Notes
//!
//! - Keys are zeroized on drop
//! - Nonces are randomly generated using OsRng; 24-byte nonces are safe to
//!   generate randomly
//! - Decryption verifies the tag before releasing any plaintext

use crypto_secretbox::aead::{AeadInPlace, KeyInit, Tag};
use crypto_secretbox::{Key, Nonce, XSalsa20Poly1305};
use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::{CryptoError, Result};

/// Size of a symmetric key in bytes (256 bits).
pub const KEY_SIZE: usize = 32;

/// Size of a secretbox nonce in bytes (192 bits).
pub const NONCE_SIZE: usize = 24;

/// Size of a Poly1305 authentication tag in bytes.
pub const TAG_SIZE: usize = 16;

/// A 256-bit symmetric key for XSalsa20-Poly1305.
///
/// The key is zeroized when dropped.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SymKey {
    bytes: [u8; KEY_SIZE],
}

impl SymKey {
    /// Generate a new random symmetric key.
    pub fn generate() -> Self {
        let mut bytes = [0u8; KEY_SIZE];
        OsRng.fill_bytes(&mut bytes);
        Self { bytes }
    }

    /// The all-zero key used by the no-passphrase secret-key mode.
    pub const fn zero() -> Self {
        Self {
            bytes: [0u8; KEY_SIZE],
        }
    }

    /// Create a key from raw bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not exactly 32 bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != KEY_SIZE {
            return Err(CryptoError::InvalidLength {
                what: "symmetric key",
                expected: KEY_SIZE,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; KEY_SIZE];
        arr.copy_from_slice(bytes);
        Ok(Self { bytes: arr })
    }

    pub(crate) const fn from_array(bytes: [u8; KEY_SIZE]) -> Self {
        Self { bytes }
    }

    /// Get the key as a byte slice.
    ///
    /// # Security
    ///
    /// Avoid logging or persisting the returned bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.bytes
    }
}

impl std::fmt::Debug for SymKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SymKey([REDACTED])")
    }
}

/// Encrypt a buffer in place with XSalsa20-Poly1305.
///
/// Generates a random nonce, overwrites `buf` with the ciphertext, and
/// returns `(nonce, tag)`.
///
/// # Errors
///
/// Returns an error only if the underlying cipher rejects the input
/// (e.g. a buffer beyond the XSalsa20 length limit).
pub fn sym_encrypt(buf: &mut [u8], key: &SymKey) -> Result<([u8; NONCE_SIZE], [u8; TAG_SIZE])> {
    let cipher = XSalsa20Poly1305::new(Key::from_slice(key.as_bytes()));

    let mut nonce = [0u8; NONCE_SIZE];
    OsRng.fill_bytes(&mut nonce);

    let tag = cipher
        .encrypt_in_place_detached(&Nonce::from(nonce), b"", buf)
        .map_err(|_| CryptoError::Encrypt("secretbox encryption failed".into()))?;

    let mut tag_out = [0u8; TAG_SIZE];
    tag_out.copy_from_slice(&tag);
    Ok((nonce, tag_out))
}

/// Decrypt a buffer in place with XSalsa20-Poly1305.
///
/// The tag is verified before the buffer is touched; on mismatch the
/// ciphertext is left intact and [`CryptoError::Auth`] is returned.
pub fn sym_decrypt(
    buf: &mut [u8],
    nonce: &[u8; NONCE_SIZE],
    tag: &[u8; TAG_SIZE],
    key: &SymKey,
) -> Result<()> {
    let cipher = XSalsa20Poly1305::new(Key::from_slice(key.as_bytes()));
    cipher
        .decrypt_in_place_detached(
            &Nonce::from(*nonce),
            b"",
            buf,
            &Tag::<XSalsa20Poly1305>::from(*tag),
        )
        .map_err(|_| CryptoError::Auth)
}
