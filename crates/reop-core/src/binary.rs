//! The binary file framing for encrypted messages.
//!
//! Layout: a 4-byte magic, the fixed envelope header (its size fixed by its
//! algorithm tag), a big-endian u32 identity length, the identity bytes
//! (no terminator), and the raw ciphertext running to end of file.
//!
//! All four header variants are accepted on read; the writers in this
//! toolkit only emit the current `SP` and `eC` shapes, plus `CS` when
//! explicitly producing 1.x-compatible output.

use crate::envelope::EnvelopeHeader;
use crate::ident::{Ident, IDENT_MAX};
use crate::{Error, Result};

/// Magic bytes marking a binary-framed encrypted file.
pub const MAGIC: [u8; 4] = *b"RBF\0";

/// Does this input look like a binary-framed encrypted file?
pub fn is_binary(data: &[u8]) -> bool {
    data.len() >= MAGIC.len() + 2 && data[..MAGIC.len()] == MAGIC
}

/// Assemble a binary-framed encrypted file.
pub fn encode_binary(header: &EnvelopeHeader, ident: &Ident, ciphertext: &[u8]) -> Vec<u8> {
    let header_bytes = header.to_bytes();
    let ident_bytes = ident.as_str().as_bytes();

    let mut out =
        Vec::with_capacity(MAGIC.len() + header_bytes.len() + 4 + ident_bytes.len() + ciphertext.len());
    out.extend_from_slice(&MAGIC);
    out.extend_from_slice(&header_bytes);
    out.extend_from_slice(&(ident_bytes.len() as u32).to_be_bytes());
    out.extend_from_slice(ident_bytes);
    out.extend_from_slice(ciphertext);
    out
}

/// Parse a binary-framed encrypted file into `(ident, header, ciphertext)`.
pub fn parse_binary(data: &[u8]) -> Result<(Ident, EnvelopeHeader, Vec<u8>)> {
    if !is_binary(data) {
        return Err(Error::Format("encrypted file: bad magic".into()));
    }
    let rest = &data[MAGIC.len()..];

    // The tag fixes the header size; parse exactly that many bytes.
    let header_size = header_size_for(&rest[..2])?;
    if rest.len() < header_size {
        return Err(Error::Format("encrypted file: truncated header".into()));
    }
    let header = EnvelopeHeader::from_bytes(&rest[..header_size])?;
    let rest = &rest[header_size..];

    if rest.len() < 4 {
        return Err(Error::Format("encrypted file: truncated identity length".into()));
    }
    let ident_len = u32::from_be_bytes([rest[0], rest[1], rest[2], rest[3]]) as usize;
    if ident_len > IDENT_MAX {
        return Err(Error::Format(format!(
            "encrypted file: identity longer than {IDENT_MAX} bytes"
        )));
    }
    let rest = &rest[4..];
    if rest.len() < ident_len {
        return Err(Error::Format("encrypted file: truncated identity".into()));
    }
    let ident = Ident::from_bytes(&rest[..ident_len])?;
    let ciphertext = rest[ident_len..].to_vec();

    Ok((ident, header, ciphertext))
}

/// Header size declared by a 2-byte algorithm tag.
fn header_size_for(tag: &[u8]) -> Result<usize> {
    use crate::envelope::{
        LEGACY_EPHEMERAL_HEADER_BYTES, LEGACY_STATIC_HEADER_BYTES, PUB_HEADER_BYTES,
        SYM_HEADER_BYTES,
    };
    use crate::alg;

    match [tag[0], tag[1]] {
        alg::SYM_SALSA_POLY => Ok(SYM_HEADER_BYTES),
        alg::ENC_EPHEMERAL => Ok(PUB_HEADER_BYTES),
        alg::ENC_CURVE25519 => Ok(LEGACY_STATIC_HEADER_BYTES),
        alg::ENC_LEGACY_EPHEMERAL => Ok(LEGACY_EPHEMERAL_HEADER_BYTES),
        found => Err(Error::UnsupportedAlgorithm { found }),
    }
}
