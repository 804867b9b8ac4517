//! Message encryption and decryption flows.
//!
//! Two ways to protect a message:
//!
//! - **Symmetric**: a passphrase is stretched with bcrypt-pbkdf and the
//!   message is sealed in an XSalsa20-Poly1305 box (`SP` header).
//! - **Public-key**: a fresh ephemeral Curve25519 key encrypts the message
//!   to the recipient; the ephemeral public key is itself boxed from the
//!   sender's static key to the recipient, which authenticates the sender
//!   (`eC` header). The ephemeral secret is discarded after use.
//!
//! Decryption additionally understands two retired envelope shapes: `CS`
//! (message boxed directly between two static keys, no forward secrecy) and
//! `eS` (ephemeral key embedded in the clear, no sender authentication).
//! The `CS` shape can still be produced for interoperability with 1.x
//! consumers.
//!
//! All flows mutate the message buffer in place; ciphertext and plaintext
//! are always the same length. Random-id binding is checked before any
//! curve arithmetic, and a failed binding is reported as a mismatch, which
//! is deliberately distinct from an authentication failure.

use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::Zeroizing;

use reop_crypto::kdf::{DEFAULT_ROUNDS, SALT_SIZE};
use reop_crypto::{box_keypair, derive_key, pub_decrypt, pub_encrypt, sym_decrypt, sym_encrypt};

use crate::envelope::{LegacyEphemeralHeader, LegacyStaticHeader, PubHeader, SymHeader};
use crate::keys::{PublicKey, SecretKey};
use crate::passphrase::{resolve, PassphraseSource};
use crate::{alg, Error, Result};

/// Encrypt a message in place with a passphrase.
///
/// With no explicit passphrase the source is consulted in confirm mode. An
/// explicit empty passphrase is refused: unlike secret-key wrapping, an
/// unprotected encrypted message is never useful.
pub fn encrypt_symmetric(
    msg: &mut [u8],
    passphrase: Option<&str>,
    source: &dyn PassphraseSource,
) -> Result<SymHeader> {
    if passphrase == Some("") {
        return Err(Error::Passphrase("an empty passphrase is not allowed".into()));
    }
    let pass = resolve(passphrase, source, "passphrase: ", true)?;

    let mut salt = [0u8; SALT_SIZE];
    OsRng.fill_bytes(&mut salt);
    let key = derive_key(&pass, &salt, DEFAULT_ROUNDS)?;

    let (nonce, tag) = sym_encrypt(msg, &key)?;
    Ok(SymHeader {
        symalg: alg::SYM_SALSA_POLY,
        kdfalg: alg::KDF_BCRYPT,
        kdfrounds: DEFAULT_ROUNDS,
        salt,
        nonce,
        tag,
    })
}

/// Decrypt a passphrase-encrypted message in place.
pub fn decrypt_symmetric(
    header: &SymHeader,
    msg: &mut [u8],
    passphrase: Option<&str>,
    source: &dyn PassphraseSource,
) -> Result<()> {
    alg::expect(header.kdfalg, alg::KDF_BCRYPT)?;

    let pass: Zeroizing<String> = if header.kdfrounds == 0 {
        Zeroizing::new(passphrase.unwrap_or("").to_owned())
    } else {
        resolve(passphrase, source, "passphrase: ", false)?
    };
    let key = derive_key(&pass, &header.salt, header.kdfrounds)?;

    sym_decrypt(msg, &header.nonce, &header.tag, &key)?;
    Ok(())
}

/// Encrypt a message in place for `pubkey`, authenticated as `seckey`.
///
/// A fresh ephemeral keypair encrypts the message body, giving the message
/// forward secrecy with respect to the sender's long-term key; the
/// ephemeral public key is then boxed from the sender's static key so the
/// recipient can prove who sent it.
pub fn encrypt(pubkey: &PublicKey, seckey: &SecretKey, msg: &mut [u8]) -> Result<PubHeader> {
    alg::expect(pubkey.encalg, alg::ENC_CURVE25519)?;
    alg::expect(seckey.encalg, alg::ENC_CURVE25519)?;

    let (eph_public, eph_secret) = box_keypair();
    let eph_secret = Zeroizing::new(eph_secret);

    let (nonce, tag) = pub_encrypt(msg, &pubkey.enckey, &eph_secret)?;

    let mut ephpubkey = eph_public;
    let (ephnonce, ephtag) = pub_encrypt(&mut ephpubkey, &pubkey.enckey, &seckey.enckey)?;

    Ok(PubHeader {
        encalg: alg::ENC_EPHEMERAL,
        secrandomid: seckey.randomid,
        pubrandomid: pubkey.randomid,
        ephpubkey,
        ephnonce,
        ephtag,
        nonce,
        tag,
    })
}

/// Decrypt a public-key encrypted message in place.
///
/// `pubkey` is the sender's public key and `seckey` the recipient's secret
/// key. The envelope must bind to both: its recipient id must match
/// `seckey` and its sender id must match `pubkey`.
pub fn decrypt(
    header: &PubHeader,
    pubkey: &PublicKey,
    seckey: &SecretKey,
    msg: &mut [u8],
) -> Result<()> {
    if header.pubrandomid != seckey.randomid || header.secrandomid != pubkey.randomid {
        return Err(Error::Mismatch);
    }
    alg::expect(pubkey.encalg, alg::ENC_CURVE25519)?;
    alg::expect(seckey.encalg, alg::ENC_CURVE25519)?;

    // Recover the ephemeral key from the sender-authenticated box; only
    // then can the body be opened.
    let mut ephemeral = Zeroizing::new(header.ephpubkey);
    pub_decrypt(
        &mut ephemeral[..],
        &header.ephnonce,
        &header.ephtag,
        &pubkey.enckey,
        &seckey.enckey,
    )?;

    pub_decrypt(msg, &header.nonce, &header.tag, &ephemeral, &seckey.enckey)?;
    Ok(())
}

/// Encrypt a message in place in the legacy 1.x static-key format.
///
/// No ephemeral key: the body is boxed directly between the two static
/// keys. Kept for writing files old consumers can read.
pub fn encrypt_legacy(
    pubkey: &PublicKey,
    seckey: &SecretKey,
    msg: &mut [u8],
) -> Result<LegacyStaticHeader> {
    alg::expect(pubkey.encalg, alg::ENC_CURVE25519)?;
    alg::expect(seckey.encalg, alg::ENC_CURVE25519)?;

    let (nonce, tag) = pub_encrypt(msg, &pubkey.enckey, &seckey.enckey)?;
    Ok(LegacyStaticHeader {
        encalg: alg::ENC_CURVE25519,
        secrandomid: seckey.randomid,
        pubrandomid: pubkey.randomid,
        nonce,
        tag,
    })
}

/// Decrypt a legacy static-key message in place.
///
/// The box opens with either pairing of the two keys, so both orientations
/// of the id binding are accepted: the recipient decrypting with the
/// sender's public key, or the sender decrypting their own output with the
/// recipient's public key. Both ids must bind; a header that matches on one
/// id only is a mismatch.
pub fn decrypt_legacy(
    header: &LegacyStaticHeader,
    pubkey: &PublicKey,
    seckey: &SecretKey,
    msg: &mut [u8],
) -> Result<()> {
    let as_recipient =
        header.pubrandomid == seckey.randomid && header.secrandomid == pubkey.randomid;
    let as_sender =
        header.pubrandomid == pubkey.randomid && header.secrandomid == seckey.randomid;
    if !as_recipient && !as_sender {
        return Err(Error::Mismatch);
    }
    alg::expect(pubkey.encalg, alg::ENC_CURVE25519)?;
    alg::expect(seckey.encalg, alg::ENC_CURVE25519)?;

    pub_decrypt(msg, &header.nonce, &header.tag, &pubkey.enckey, &seckey.enckey)?;
    Ok(())
}

/// Decrypt a legacy ephemeral-key message in place.
///
/// Only the recipient's secret key is needed; the ephemeral public key is
/// embedded in the header in the clear, so nothing authenticates the
/// sender.
pub fn decrypt_legacy_ephemeral(
    header: &LegacyEphemeralHeader,
    seckey: &SecretKey,
    msg: &mut [u8],
) -> Result<()> {
    if header.pubrandomid != seckey.randomid {
        return Err(Error::Mismatch);
    }

    pub_decrypt(msg, &header.nonce, &header.tag, &header.pubkey, &seckey.enckey)?;
    Ok(())
}
