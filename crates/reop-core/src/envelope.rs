//! Encrypted-message envelope headers.
//!
//! Four header variants exist, discriminated by their leading 2-byte
//! algorithm tag. The current formats are `SP` (passphrase-symmetric) and
//! `eC` (ephemeral public-key); `CS` and `eS` are legacy shapes that are
//! still accepted on read. A header only parses if its byte length is
//! exactly the size declared for its tag.

use reop_crypto::kdf::SALT_SIZE;

use crate::keys::RANDOM_ID_SIZE;
use crate::wire::{Reader, Writer};
use crate::{alg, Error, Result};

/// Serialized size of a symmetric (`SP`) header.
pub const SYM_HEADER_BYTES: usize = 64;

/// Serialized size of a current public-key (`eC`) header.
pub const PUB_HEADER_BYTES: usize = 130;

/// Serialized size of a legacy static-key (`CS`) header.
pub const LEGACY_STATIC_HEADER_BYTES: usize = 58;

/// Serialized size of a legacy ephemeral-key (`eS`) header.
pub const LEGACY_EPHEMERAL_HEADER_BYTES: usize = 82;

/// Header of a passphrase-encrypted message.
#[derive(Clone, Debug)]
pub struct SymHeader {
    pub(crate) symalg: [u8; 2],
    pub(crate) kdfalg: [u8; 2],
    pub(crate) kdfrounds: u32,
    pub(crate) salt: [u8; SALT_SIZE],
    pub(crate) nonce: [u8; 24],
    pub(crate) tag: [u8; 16],
}

/// Header of a current public-key encrypted message.
///
/// `ephpubkey` is stored encrypted: it is boxed from the sender's static key
/// to the recipient, which is what binds the sender's identity to the
/// message.
#[derive(Clone, Debug)]
pub struct PubHeader {
    pub(crate) encalg: [u8; 2],
    pub(crate) secrandomid: [u8; RANDOM_ID_SIZE],
    pub(crate) pubrandomid: [u8; RANDOM_ID_SIZE],
    pub(crate) ephpubkey: [u8; 32],
    pub(crate) ephnonce: [u8; 24],
    pub(crate) ephtag: [u8; 16],
    pub(crate) nonce: [u8; 24],
    pub(crate) tag: [u8; 16],
}

/// Header of a legacy message boxed directly between two static keys.
#[derive(Clone, Debug)]
pub struct LegacyStaticHeader {
    pub(crate) encalg: [u8; 2],
    pub(crate) secrandomid: [u8; RANDOM_ID_SIZE],
    pub(crate) pubrandomid: [u8; RANDOM_ID_SIZE],
    pub(crate) nonce: [u8; 24],
    pub(crate) tag: [u8; 16],
}

/// Header of a legacy message with a plaintext embedded ephemeral key.
#[derive(Clone, Debug)]
pub struct LegacyEphemeralHeader {
    pub(crate) ekcalg: [u8; 2],
    pub(crate) pubrandomid: [u8; RANDOM_ID_SIZE],
    pub(crate) pubkey: [u8; 32],
    pub(crate) nonce: [u8; 24],
    pub(crate) tag: [u8; 16],
}

/// An envelope header of any supported variant.
#[derive(Clone, Debug)]
pub enum EnvelopeHeader {
    /// Passphrase-symmetric (`SP`).
    Symmetric(SymHeader),
    /// Current ephemeral public-key (`eC`).
    PublicKey(PubHeader),
    /// Legacy static-key (`CS`).
    LegacyStatic(LegacyStaticHeader),
    /// Legacy ephemeral-key (`eS`).
    LegacyEphemeral(LegacyEphemeralHeader),
}

impl EnvelopeHeader {
    /// Parse a header, dispatching on its leading algorithm tag.
    ///
    /// # Errors
    ///
    /// - [`Error::UnsupportedAlgorithm`] for an unknown tag
    /// - [`Error::Format`] when the length does not equal the size declared
    ///   for the tag
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < 2 {
            return Err(Error::Format("encrypted message header: truncated".into()));
        }
        let tag = [bytes[0], bytes[1]];
        match tag {
            alg::SYM_SALSA_POLY => {
                let mut r = sized_reader(bytes, SYM_HEADER_BYTES, "symmetric header")?;
                Ok(Self::Symmetric(SymHeader {
                    symalg: r.take::<2>(),
                    kdfalg: r.take::<2>(),
                    kdfrounds: r.take_u32(),
                    salt: r.take::<SALT_SIZE>(),
                    nonce: r.take::<24>(),
                    tag: r.take::<16>(),
                }))
            }
            alg::ENC_EPHEMERAL => {
                let mut r = sized_reader(bytes, PUB_HEADER_BYTES, "public-key header")?;
                Ok(Self::PublicKey(PubHeader {
                    encalg: r.take::<2>(),
                    secrandomid: r.take::<RANDOM_ID_SIZE>(),
                    pubrandomid: r.take::<RANDOM_ID_SIZE>(),
                    ephpubkey: r.take::<32>(),
                    ephnonce: r.take::<24>(),
                    ephtag: r.take::<16>(),
                    nonce: r.take::<24>(),
                    tag: r.take::<16>(),
                }))
            }
            alg::ENC_CURVE25519 => {
                let mut r =
                    sized_reader(bytes, LEGACY_STATIC_HEADER_BYTES, "legacy static header")?;
                Ok(Self::LegacyStatic(LegacyStaticHeader {
                    encalg: r.take::<2>(),
                    secrandomid: r.take::<RANDOM_ID_SIZE>(),
                    pubrandomid: r.take::<RANDOM_ID_SIZE>(),
                    nonce: r.take::<24>(),
                    tag: r.take::<16>(),
                }))
            }
            alg::ENC_LEGACY_EPHEMERAL => {
                let mut r = sized_reader(
                    bytes,
                    LEGACY_EPHEMERAL_HEADER_BYTES,
                    "legacy ephemeral header",
                )?;
                Ok(Self::LegacyEphemeral(LegacyEphemeralHeader {
                    ekcalg: r.take::<2>(),
                    pubrandomid: r.take::<RANDOM_ID_SIZE>(),
                    pubkey: r.take::<32>(),
                    nonce: r.take::<24>(),
                    tag: r.take::<16>(),
                }))
            }
            found => Err(Error::UnsupportedAlgorithm { found }),
        }
    }

    /// Serialize the header to its fixed layout.
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Self::Symmetric(h) => {
                let mut w = Writer::with_capacity(SYM_HEADER_BYTES);
                w.put(&h.symalg)
                    .put(&h.kdfalg)
                    .put_u32(h.kdfrounds)
                    .put(&h.salt)
                    .put(&h.nonce)
                    .put(&h.tag);
                w.finish()
            }
            Self::PublicKey(h) => {
                let mut w = Writer::with_capacity(PUB_HEADER_BYTES);
                w.put(&h.encalg)
                    .put(&h.secrandomid)
                    .put(&h.pubrandomid)
                    .put(&h.ephpubkey)
                    .put(&h.ephnonce)
                    .put(&h.ephtag)
                    .put(&h.nonce)
                    .put(&h.tag);
                w.finish()
            }
            Self::LegacyStatic(h) => {
                let mut w = Writer::with_capacity(LEGACY_STATIC_HEADER_BYTES);
                w.put(&h.encalg)
                    .put(&h.secrandomid)
                    .put(&h.pubrandomid)
                    .put(&h.nonce)
                    .put(&h.tag);
                w.finish()
            }
            Self::LegacyEphemeral(h) => {
                let mut w = Writer::with_capacity(LEGACY_EPHEMERAL_HEADER_BYTES);
                w.put(&h.ekcalg)
                    .put(&h.pubrandomid)
                    .put(&h.pubkey)
                    .put(&h.nonce)
                    .put(&h.tag);
                w.finish()
            }
        }
    }

    /// The header's 2-byte algorithm tag.
    pub fn alg(&self) -> [u8; 2] {
        match self {
            Self::Symmetric(h) => h.symalg,
            Self::PublicKey(h) => h.encalg,
            Self::LegacyStatic(h) => h.encalg,
            Self::LegacyEphemeral(h) => h.ekcalg,
        }
    }

    /// Expected serialized size for this variant.
    pub fn size(&self) -> usize {
        match self {
            Self::Symmetric(_) => SYM_HEADER_BYTES,
            Self::PublicKey(_) => PUB_HEADER_BYTES,
            Self::LegacyStatic(_) => LEGACY_STATIC_HEADER_BYTES,
            Self::LegacyEphemeral(_) => LEGACY_EPHEMERAL_HEADER_BYTES,
        }
    }
}

fn sized_reader<'a>(bytes: &'a [u8], expected: usize, what: &str) -> Result<Reader<'a>> {
    if bytes.len() != expected {
        return Err(Error::Format(format!(
            "{what}: expected {expected} bytes, got {}",
            bytes.len()
        )));
    }
    Ok(Reader::new(bytes))
}
