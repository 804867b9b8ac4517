//! Passphrase key derivation with bcrypt-pbkdf.
//!
//! Derives the 32-byte symmetric key that wraps secret keys and protects
//! passphrase-encrypted messages. An iteration count of zero is the
//! no-passphrase sentinel: the derived key is all zeros and bcrypt is never
//! invoked, but the caller still runs the authenticated box over the data so
//! the wrapped format is uniform with the protected one.

use bcrypt_pbkdf::bcrypt_pbkdf;
use zeroize::Zeroize;

use crate::secretbox::{SymKey, KEY_SIZE};
use crate::{CryptoError, Result};

/// Size of the KDF salt in bytes.
pub const SALT_SIZE: usize = 16;

/// Default bcrypt-pbkdf iteration count for newly wrapped secret keys.
pub const DEFAULT_ROUNDS: u32 = 42;

/// Derive a symmetric key from a passphrase, salt, and iteration count.
///
/// Zero rounds means the data was wrapped without a passphrase: the key is
/// all zeros, and supplying a passphrase anyway is reported as an
/// authentication failure rather than silently ignored. An empty passphrase
/// against a nonzero round count derives the all-zero key, which cannot
/// match a passphrase-wrapped box and fails its tag check downstream.
pub fn derive_key(passphrase: &str, salt: &[u8; SALT_SIZE], rounds: u32) -> Result<SymKey> {
    if rounds == 0 {
        if !passphrase.is_empty() {
            return Err(CryptoError::Auth);
        }
        return Ok(SymKey::zero());
    }

    if passphrase.is_empty() {
        return Ok(SymKey::zero());
    }

    let mut bytes = [0u8; KEY_SIZE];
    if let Err(e) = bcrypt_pbkdf(passphrase, salt, rounds, &mut bytes) {
        bytes.zeroize();
        return Err(CryptoError::Kdf(e.to_string()));
    }
    let key = SymKey::from_array(bytes);
    bytes.zeroize();
    Ok(key)
}
