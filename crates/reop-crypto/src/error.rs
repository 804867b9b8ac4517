//! Error types for cryptographic operations.

use thiserror::Error;

/// Errors that can occur during cryptographic operations.
#[derive(Error, Debug)]
pub enum CryptoError {
    /// Authenticated decryption failed: wrong key, wrong passphrase, or
    /// tampered ciphertext.
    #[error("decryption failed: authentication tag mismatch")]
    Auth,

    /// Signature verification failed.
    #[error("signature verification failed")]
    BadSignature,

    /// Encryption failed.
    #[error("encryption failed: {0}")]
    Encrypt(String),

    /// A fixed-width key, nonce, or tag field had the wrong length.
    #[error("invalid {what} length: expected {expected}, got {actual}")]
    InvalidLength {
        /// Name of the field being checked.
        what: &'static str,
        /// Expected length in bytes.
        expected: usize,
        /// Actual length in bytes.
        actual: usize,
    },

    /// The secret half of a signing keypair is inconsistent with the public
    /// half stored alongside it.
    #[error("signing keypair bytes are inconsistent")]
    MalformedKeypair,

    /// Passphrase key derivation failed.
    #[error("bcrypt-pbkdf failed: {0}")]
    Kdf(String),
}

/// Result type for cryptographic operations.
pub type Result<T> = std::result::Result<T, CryptoError>;
