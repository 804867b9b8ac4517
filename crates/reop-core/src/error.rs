//! Error types for format and envelope operations.

use reop_crypto::CryptoError;
use thiserror::Error;

/// Errors that can occur while reading, writing, or opening reop files.
#[derive(Error, Debug)]
pub enum Error {
    /// File could not be read or written.
    #[error("{path}: {source}")]
    Io {
        /// The offending path (`-` for stdio).
        path: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Refusing to operate on a symlink or a directory.
    #[error("{path}: not a regular file")]
    NotRegularFile {
        /// The offending path.
        path: String,
    },

    /// Input exceeded the maximum accepted size.
    #[error("{path}: larger than the {limit} byte limit")]
    TooLarge {
        /// The offending path.
        path: String,
        /// The size cap that was exceeded.
        limit: u64,
    },

    /// Armored or binary framing is missing, malformed, or does not decode
    /// to the expected structure size.
    #[error("invalid {0}")]
    Format(String),

    /// A 2-byte algorithm identifier does not name a supported algorithm.
    #[error("unsupported algorithm {}", render_alg(.found))]
    UnsupportedAlgorithm {
        /// The identifier found in the input.
        found: [u8; 2],
    },

    /// The key ids in an envelope or signature do not bind to the keys
    /// supplied. Distinct from [`Error::Auth`]: the crypto was never tried.
    #[error("key mismatch: wrong key for this file")]
    Mismatch,

    /// Tag or signature verification failed: wrong key, wrong passphrase,
    /// or tampered data.
    #[error("authentication failed")]
    Auth,

    /// No key could be located.
    #[error("no key found: {0}")]
    NoKey(String),

    /// Passphrase acquisition failed or the passphrase was unusable.
    #[error("passphrase: {0}")]
    Passphrase(String),

    /// An unexpected failure in the underlying cryptography.
    #[error(transparent)]
    Crypto(CryptoError),
}

impl From<CryptoError> for Error {
    fn from(e: CryptoError) -> Self {
        match e {
            CryptoError::Auth | CryptoError::BadSignature => Error::Auth,
            other => Error::Crypto(other),
        }
    }
}

fn render_alg(found: &[u8; 2]) -> String {
    match std::str::from_utf8(found) {
        Ok(s) if s.chars().all(|c| c.is_ascii_graphic()) => format!("\"{s}\""),
        _ => format!("{found:02x?}"),
    }
}

/// Result type for format and envelope operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crypto_auth_maps_to_auth() {
        let err: Error = CryptoError::Auth.into();
        assert!(matches!(err, Error::Auth));

        let err: Error = CryptoError::BadSignature.into();
        assert!(matches!(err, Error::Auth));
    }

    #[test]
    fn test_other_crypto_errors_stay_typed() {
        let err: Error = CryptoError::MalformedKeypair.into();
        assert!(matches!(err, Error::Crypto(_)));
    }

    #[test]
    fn test_unsupported_algorithm_renders_ascii() {
        let err = Error::UnsupportedAlgorithm { found: *b"XX" };
        assert!(err.to_string().contains("\"XX\""));
    }

    #[test]
    fn test_unsupported_algorithm_renders_binary() {
        let err = Error::UnsupportedAlgorithm { found: [0x00, 0xff] };
        let msg = err.to_string();
        assert!(msg.contains("00"));
        assert!(msg.contains("ff"));
    }
}
