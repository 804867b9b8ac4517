//! Detached signatures and their verification.

use subtle::ConstantTimeEq;

use reop_crypto::{sign_detached, verify_detached};

use crate::armor::{self, BlockKind};
use crate::ident::Ident;
use crate::keys::{PublicKey, SecretKey, RANDOM_ID_SIZE};
use crate::wire::{Reader, Writer};
use crate::{alg, Error, Result};

/// Serialized size of a signature, excluding the out-of-band identity.
pub const SIGNATURE_BYTES: usize = 74;

/// A detached Ed25519 signature.
///
/// Carries the random id of the issuing secret key so verification can
/// detect a wrong-key attempt before touching the curve, and the signer's
/// identity for key-ring lookup.
#[derive(Clone)]
pub struct Signature {
    pub(crate) sigalg: [u8; 2],
    pub(crate) randomid: [u8; RANDOM_ID_SIZE],
    pub(crate) sig: [u8; 64],
    pub(crate) ident: Ident,
}

impl Signature {
    /// The identity of the signer, as recorded at signing time.
    pub fn ident(&self) -> &Ident {
        &self.ident
    }

    /// Serialize to the fixed 74-byte wire layout.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut w = Writer::with_capacity(SIGNATURE_BYTES);
        w.put(&self.sigalg).put(&self.randomid).put(&self.sig);
        w.finish()
    }

    /// Parse the fixed wire layout.
    pub fn from_bytes(bytes: &[u8], ident: Ident) -> Result<Self> {
        if bytes.len() != SIGNATURE_BYTES {
            return Err(Error::Format(format!(
                "signature: expected {SIGNATURE_BYTES} bytes, got {}",
                bytes.len()
            )));
        }
        let mut r = Reader::new(bytes);
        let sigalg = r.take::<2>();
        alg::expect(sigalg, alg::SIG_ED25519)?;
        Ok(Self {
            sigalg,
            randomid: r.take::<RANDOM_ID_SIZE>(),
            sig: r.take::<64>(),
            ident,
        })
    }

    /// Encode as an armored `SIGNATURE` block.
    pub fn to_armored(&self) -> String {
        armor::encode_block(BlockKind::Signature, &self.ident, &self.to_bytes())
    }

    /// Parse an armored `SIGNATURE` block.
    pub fn from_armored(text: &str) -> Result<Self> {
        let (ident, bytes) = armor::parse_block(text, BlockKind::Signature)?;
        Self::from_bytes(&bytes, ident)
    }
}

impl PartialEq for Signature {
    fn eq(&self, other: &Self) -> bool {
        self.sigalg == other.sigalg
            && self.randomid == other.randomid
            && bool::from(self.sig.ct_eq(&other.sig))
    }
}

impl Eq for Signature {}

impl std::fmt::Debug for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signature")
            .field("ident", &self.ident)
            .field("randomid", &hex::encode(self.randomid))
            .field("sig", &format!("{}...", hex::encode(&self.sig[..8])))
            .finish()
    }
}

/// Sign a message with a secret key, producing a detached signature.
pub fn sign(seckey: &SecretKey, msg: &[u8]) -> Result<Signature> {
    let sig = sign_detached(&seckey.sigkey, msg)?;
    Ok(Signature {
        sigalg: alg::SIG_ED25519,
        randomid: seckey.randomid,
        sig,
        ident: seckey.ident.clone(),
    })
}

/// Verify a detached signature against a public key.
///
/// # Errors
///
/// - [`Error::Mismatch`] when the signature was issued by a different
///   keypair than `pubkey` (random ids disagree); the curve is never
///   consulted
/// - [`Error::Auth`] when the cryptographic verification fails
pub fn verify(pubkey: &PublicKey, msg: &[u8], sig: &Signature) -> Result<()> {
    if pubkey.randomid != sig.randomid {
        return Err(Error::Mismatch);
    }
    verify_detached(&pubkey.sigkey, msg, &sig.sig)?;
    Ok(())
}
