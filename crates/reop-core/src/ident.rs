//! Identity strings attached to keys, signatures, and envelopes.

use std::fmt;

use crate::{Error, Result};

/// Maximum identity length in bytes of content.
pub const IDENT_MAX: usize = 63;

/// A key owner's identity: a short label like `alice` or `alice@example`.
///
/// Identities ride next to the serialized structures, never inside them: the
/// armored framing carries them on an `ident:` line and the binary framing
/// length-prefixes them. At most [`IDENT_MAX`] bytes of UTF-8, no newlines.
#[derive(Clone, PartialEq, Eq)]
pub struct Ident(String);

impl Ident {
    /// Validate and wrap an identity string.
    ///
    /// # Errors
    ///
    /// Returns a format error if the string exceeds [`IDENT_MAX`] bytes or
    /// contains a newline.
    pub fn new(s: &str) -> Result<Self> {
        if s.len() > IDENT_MAX {
            return Err(Error::Format(format!(
                "identity: longer than {IDENT_MAX} bytes"
            )));
        }
        if s.contains('\n') || s.contains('\r') {
            return Err(Error::Format("identity: contains a line break".into()));
        }
        Ok(Self(s.to_owned()))
    }

    /// Validate an identity read as raw bytes from the binary framing.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let s = std::str::from_utf8(bytes)
            .map_err(|_| Error::Format("identity: not valid UTF-8".into()))?;
        Self::new(s)
    }

    /// The identity as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ident({:?})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_ident() {
        let ident = Ident::new("alice").unwrap();
        assert_eq!(ident.as_str(), "alice");
        assert_eq!(ident.to_string(), "alice");
    }

    #[test]
    fn test_max_length_accepted() {
        let s = "a".repeat(IDENT_MAX);
        assert!(Ident::new(&s).is_ok());
    }

    #[test]
    fn test_too_long_rejected() {
        let s = "a".repeat(IDENT_MAX + 1);
        assert!(matches!(Ident::new(&s), Err(Error::Format(_))));
    }

    #[test]
    fn test_newline_rejected() {
        assert!(Ident::new("ali\nce").is_err());
        assert!(Ident::new("ali\rce").is_err());
    }

    #[test]
    fn test_from_bytes_requires_utf8() {
        assert!(Ident::from_bytes(&[0xff, 0xfe]).is_err());
        assert!(Ident::from_bytes(b"bob").is_ok());
    }

    #[test]
    fn test_empty_ident_allowed() {
        // The symmetric envelope writes a placeholder ident; empty content
        // is structurally fine
        assert!(Ident::new("").is_ok());
    }
}
