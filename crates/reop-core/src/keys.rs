//! Key generation, KDF wrapping, and serialization.
//!
//! A keypair is really two keypairs sharing one identity: an Ed25519 pair
//! for signatures and a Curve25519 pair for encryption, bound together by an
//! 8-byte random id carried on both halves. The id lets every consumer
//! detect a wrong-key operation cheaply, before any curve arithmetic.
//!
//! Secret keys never touch disk in the clear. The 96-byte window holding
//! `sigkey || enckey` is encrypted with a key derived from a passphrase
//! (bcrypt-pbkdf, 42 rounds) before serialization, and decrypted on load.
//! The empty passphrase selects a zero-round wrapping with the all-zero key;
//! the authenticated box is still applied and still verified, so protected
//! and unprotected keys are byte-layout identical.

use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::{Zeroizing, ZeroizeOnDrop};

use reop_crypto::kdf::{DEFAULT_ROUNDS, SALT_SIZE};
use reop_crypto::{box_keypair, derive_key, sign_keypair, sym_decrypt, sym_encrypt};

use crate::armor::{self, BlockKind};
use crate::ident::Ident;
use crate::passphrase::{resolve, PassphraseSource};
use crate::wire::{Reader, Writer};
use crate::{alg, Error, Result};

/// Size of the random key identifier in bytes.
pub const RANDOM_ID_SIZE: usize = 8;

/// Serialized size of a public key, excluding the out-of-band identity.
pub const PUBLIC_KEY_BYTES: usize = 76;

/// Serialized size of a secret key, excluding the out-of-band identity.
pub const SECRET_KEY_BYTES: usize = 172;

/// Size of the encrypted `sigkey || enckey` window in a secret key.
const SECRET_MATERIAL: usize = 96;

/// Offset of the secret material window within the serialized secret key.
const SECRET_MATERIAL_OFFSET: usize = 76;

/// A public key: verification and encryption halves plus an identity.
#[derive(Clone)]
pub struct PublicKey {
    pub(crate) sigalg: [u8; 2],
    pub(crate) encalg: [u8; 2],
    pub(crate) randomid: [u8; RANDOM_ID_SIZE],
    pub(crate) sigkey: [u8; 32],
    pub(crate) enckey: [u8; 32],
    pub(crate) ident: Ident,
}

impl PublicKey {
    /// The identity this key belongs to.
    pub fn ident(&self) -> &Ident {
        &self.ident
    }

    /// The 8-byte random id pairing this key with its secret half.
    pub fn randomid(&self) -> &[u8; RANDOM_ID_SIZE] {
        &self.randomid
    }

    /// Serialize to the fixed 76-byte wire layout.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut w = Writer::with_capacity(PUBLIC_KEY_BYTES);
        w.put(&self.sigalg)
            .put(&self.encalg)
            .put(&self.randomid)
            .put(&self.sigkey)
            .put(&self.enckey);
        w.finish()
    }

    /// Parse the fixed wire layout.
    ///
    /// # Errors
    ///
    /// Rejects any length other than exactly 76 bytes, and any algorithm
    /// identifier other than the fixed constants.
    pub fn from_bytes(bytes: &[u8], ident: Ident) -> Result<Self> {
        if bytes.len() != PUBLIC_KEY_BYTES {
            return Err(Error::Format(format!(
                "public key: expected {PUBLIC_KEY_BYTES} bytes, got {}",
                bytes.len()
            )));
        }
        let mut r = Reader::new(bytes);
        let sigalg = r.take::<2>();
        let encalg = r.take::<2>();
        alg::expect(sigalg, alg::SIG_ED25519)?;
        alg::expect(encalg, alg::ENC_CURVE25519)?;
        Ok(Self {
            sigalg,
            encalg,
            randomid: r.take::<RANDOM_ID_SIZE>(),
            sigkey: r.take::<32>(),
            enckey: r.take::<32>(),
            ident,
        })
    }

    /// Encode as an armored `PUBLIC KEY` block.
    pub fn to_armored(&self) -> String {
        armor::encode_block(BlockKind::PublicKey, &self.ident, &self.to_bytes())
    }

    /// Parse an armored `PUBLIC KEY` block.
    pub fn from_armored(text: &str) -> Result<Self> {
        let (ident, bytes) = armor::parse_block(text, BlockKind::PublicKey)?;
        Self::from_bytes(&bytes, ident)
    }
}

impl std::fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PublicKey")
            .field("ident", &self.ident)
            .field("randomid", &hex::encode(self.randomid))
            .finish()
    }
}

/// A secret key, held in memory only in decrypted form.
///
/// The signing and encryption halves are zeroized on drop.
#[derive(ZeroizeOnDrop)]
pub struct SecretKey {
    #[zeroize(skip)]
    pub(crate) sigalg: [u8; 2],
    #[zeroize(skip)]
    pub(crate) encalg: [u8; 2],
    #[zeroize(skip)]
    pub(crate) symalg: [u8; 2],
    #[zeroize(skip)]
    pub(crate) kdfalg: [u8; 2],
    #[zeroize(skip)]
    pub(crate) randomid: [u8; RANDOM_ID_SIZE],
    pub(crate) sigkey: [u8; 64],
    pub(crate) enckey: [u8; 32],
    #[zeroize(skip)]
    pub(crate) ident: Ident,
}

impl SecretKey {
    /// The identity this key belongs to.
    pub fn ident(&self) -> &Ident {
        &self.ident
    }

    /// The 8-byte random id pairing this key with its public half.
    pub fn randomid(&self) -> &[u8; RANDOM_ID_SIZE] {
        &self.randomid
    }

    /// Encode as an armored `SECRET KEY` block, wrapping the secret material
    /// first.
    ///
    /// An explicit empty passphrase selects the zero-round no-passphrase
    /// wrapping. With no explicit passphrase the source is consulted, in
    /// confirm mode.
    pub fn to_armored(
        &self,
        passphrase: Option<&str>,
        source: &dyn PassphraseSource,
    ) -> Result<String> {
        let wire = self.seal(passphrase, source)?;
        Ok(armor::encode_block(BlockKind::SecretKey, &self.ident, &wire))
    }

    /// Parse an armored `SECRET KEY` block and decrypt the secret material.
    pub fn from_armored(
        text: &str,
        passphrase: Option<&str>,
        source: &dyn PassphraseSource,
    ) -> Result<Self> {
        let (ident, bytes) = armor::parse_block(text, BlockKind::SecretKey)?;
        Self::from_wire(&bytes, ident, passphrase, source)
    }

    /// Produce the serialized, KDF-wrapped wire form.
    fn seal(&self, passphrase: Option<&str>, source: &dyn PassphraseSource) -> Result<Vec<u8>> {
        let (rounds, pass) = match passphrase {
            Some("") => (0u32, Zeroizing::new(String::new())),
            Some(p) => (DEFAULT_ROUNDS, Zeroizing::new(p.to_owned())),
            None => (
                DEFAULT_ROUNDS,
                resolve(None, source, "passphrase: ", true)?,
            ),
        };

        let mut salt = [0u8; SALT_SIZE];
        OsRng.fill_bytes(&mut salt);
        let key = derive_key(&pass, &salt, rounds)?;

        let mut material = Zeroizing::new([0u8; SECRET_MATERIAL]);
        material[..64].copy_from_slice(&self.sigkey);
        material[64..].copy_from_slice(&self.enckey);
        let (nonce, tag) = sym_encrypt(&mut material[..], &key)?;

        let mut w = Writer::with_capacity(SECRET_KEY_BYTES);
        w.put(&self.sigalg)
            .put(&self.encalg)
            .put(&self.symalg)
            .put(&self.kdfalg)
            .put(&self.randomid)
            .put_u32(rounds)
            .put(&salt)
            .put(&nonce)
            .put(&tag)
            .put(&material[..]);
        Ok(w.finish())
    }

    /// Parse the wire form and decrypt the secret material in place.
    pub(crate) fn from_wire(
        bytes: &[u8],
        ident: Ident,
        passphrase: Option<&str>,
        source: &dyn PassphraseSource,
    ) -> Result<Self> {
        if bytes.len() != SECRET_KEY_BYTES {
            return Err(Error::Format(format!(
                "secret key: expected {SECRET_KEY_BYTES} bytes, got {}",
                bytes.len()
            )));
        }
        let mut r = Reader::new(bytes);
        let sigalg = r.take::<2>();
        let encalg = r.take::<2>();
        let symalg = r.take::<2>();
        let kdfalg = r.take::<2>();
        alg::expect(sigalg, alg::SIG_ED25519)?;
        alg::expect(encalg, alg::ENC_CURVE25519)?;
        alg::expect(symalg, alg::SYM_SALSA_POLY)?;
        alg::expect(kdfalg, alg::KDF_BCRYPT)?;
        let randomid = r.take::<RANDOM_ID_SIZE>();
        let rounds = r.take_u32();
        let salt = r.take::<SALT_SIZE>();
        let nonce = r.take::<24>();
        let tag = r.take::<16>();

        // A zero-round key must not trigger a prompt; otherwise an explicit
        // passphrase is taken verbatim and only the absence of one consults
        // the source.
        let pass: Zeroizing<String> = if rounds == 0 {
            Zeroizing::new(passphrase.unwrap_or("").to_owned())
        } else {
            resolve(passphrase, source, "passphrase: ", false)?
        };
        let key = derive_key(&pass, &salt, rounds)?;

        let mut material = Zeroizing::new([0u8; SECRET_MATERIAL]);
        material.copy_from_slice(&bytes[SECRET_MATERIAL_OFFSET..]);
        sym_decrypt(&mut material[..], &nonce, &tag, &key)?;

        let mut sigkey = [0u8; 64];
        let mut enckey = [0u8; 32];
        sigkey.copy_from_slice(&material[..64]);
        enckey.copy_from_slice(&material[64..]);

        Ok(Self {
            sigalg,
            encalg,
            symalg,
            kdfalg,
            randomid,
            sigkey,
            enckey,
            ident,
        })
    }
}

impl std::fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretKey")
            .field("ident", &self.ident)
            .field("randomid", &hex::encode(self.randomid))
            .field("sigkey", &"[REDACTED]")
            .field("enckey", &"[REDACTED]")
            .finish()
    }
}

/// A freshly generated public/secret pair.
pub struct Keypair {
    /// The shareable half.
    pub public: PublicKey,
    /// The secret half, still unwrapped; wrap it via
    /// [`SecretKey::to_armored`] before persisting.
    pub secret: SecretKey,
}

/// Generate a complete keypair: fresh Ed25519 and Curve25519 keys under one
/// random id and identity.
pub fn generate(ident: &Ident) -> Keypair {
    let (sig_public, sig_secret) = sign_keypair();
    let (enc_public, enc_secret) = box_keypair();

    let mut randomid = [0u8; RANDOM_ID_SIZE];
    OsRng.fill_bytes(&mut randomid);

    let public = PublicKey {
        sigalg: alg::SIG_ED25519,
        encalg: alg::ENC_CURVE25519,
        randomid,
        sigkey: sig_public,
        enckey: enc_public,
        ident: ident.clone(),
    };
    let secret = SecretKey {
        sigalg: alg::SIG_ED25519,
        encalg: alg::ENC_CURVE25519,
        symalg: alg::SYM_SALSA_POLY,
        kdfalg: alg::KDF_BCRYPT,
        randomid,
        sigkey: sig_secret,
        enckey: enc_secret,
        ident: ident.clone(),
    };
    Keypair { public, secret }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::passphrase::{FixedPassphrase, NoPassphrase};

    fn alice() -> Keypair {
        generate(&Ident::new("alice").unwrap())
    }

    #[test]
    fn test_generate_binds_halves() {
        let kp = alice();
        assert_eq!(kp.public.randomid, kp.secret.randomid);
        assert_eq!(kp.public.sigalg, kp.secret.sigalg);
        assert_eq!(kp.public.encalg, kp.secret.encalg);
        assert_eq!(kp.public.ident.as_str(), "alice");
        assert_eq!(kp.secret.ident.as_str(), "alice");

        // Ed25519 secret keys carry their public half
        assert_eq!(&kp.secret.sigkey[32..], &kp.public.sigkey[..]);
    }

    #[test]
    fn test_generate_is_fresh() {
        let a = alice();
        let b = alice();
        assert_ne!(a.public.randomid, b.public.randomid);
        assert_ne!(a.public.sigkey, b.public.sigkey);
        assert_ne!(a.public.enckey, b.public.enckey);
    }

    #[test]
    fn test_pubkey_armored_roundtrip() {
        let kp = alice();
        let armored = kp.public.to_armored();
        let parsed = PublicKey::from_armored(&armored).unwrap();

        assert_eq!(parsed.randomid, kp.public.randomid);
        assert_eq!(parsed.sigkey, kp.public.sigkey);
        assert_eq!(parsed.enckey, kp.public.enckey);
        assert_eq!(parsed.ident.as_str(), "alice");
    }

    #[test]
    fn test_pubkey_wrong_length_rejected() {
        let ident = Ident::new("x").unwrap();
        assert!(PublicKey::from_bytes(&[0u8; 75], ident.clone()).is_err());
        assert!(PublicKey::from_bytes(&[0u8; 77], ident).is_err());
    }

    #[test]
    fn test_pubkey_bad_alg_rejected() {
        let kp = alice();
        let mut bytes = kp.public.to_bytes();
        bytes[0] = b'X';
        let result = PublicKey::from_bytes(&bytes, Ident::new("alice").unwrap());
        assert!(matches!(result, Err(Error::UnsupportedAlgorithm { .. })));
    }

    #[test]
    fn test_seckey_roundtrip_with_passphrase() {
        let kp = alice();
        let armored = kp.secret.to_armored(Some("pw"), &NoPassphrase).unwrap();
        let restored = SecretKey::from_armored(&armored, Some("pw"), &NoPassphrase).unwrap();

        assert_eq!(restored.sigkey, kp.secret.sigkey);
        assert_eq!(restored.enckey, kp.secret.enckey);
        assert_eq!(restored.randomid, kp.secret.randomid);
        assert_eq!(restored.ident.as_str(), "alice");
    }

    #[test]
    fn test_seckey_wrong_passphrase_fails_auth() {
        let kp = alice();
        let armored = kp.secret.to_armored(Some("pw"), &NoPassphrase).unwrap();
        let result = SecretKey::from_armored(&armored, Some("pw2"), &NoPassphrase);
        assert!(matches!(result, Err(Error::Auth)));
    }

    #[test]
    fn test_seckey_empty_passphrase_fails_against_protected() {
        let kp = alice();
        let armored = kp.secret.to_armored(Some("pw"), &NoPassphrase).unwrap();
        let result = SecretKey::from_armored(&armored, Some(""), &NoPassphrase);
        assert!(matches!(result, Err(Error::Auth)));
    }

    #[test]
    fn test_seckey_zero_round_sentinel() {
        let kp = alice();
        let armored = kp.secret.to_armored(Some(""), &NoPassphrase).unwrap();

        // Decodes with the empty passphrase, and without consulting any
        // source at all
        let restored = SecretKey::from_armored(&armored, Some(""), &NoPassphrase).unwrap();
        assert_eq!(restored.sigkey, kp.secret.sigkey);
        let restored = SecretKey::from_armored(&armored, None, &NoPassphrase).unwrap();
        assert_eq!(restored.enckey, kp.secret.enckey);

        // Fails with auth under any non-empty passphrase
        let result = SecretKey::from_armored(&armored, Some("pw"), &NoPassphrase);
        assert!(matches!(result, Err(Error::Auth)));
    }

    #[test]
    fn test_seckey_prompts_source_when_no_passphrase_given() {
        let kp = alice();
        let source = FixedPassphrase("hunter2".into());
        let armored = kp.secret.to_armored(None, &source).unwrap();

        let restored = SecretKey::from_armored(&armored, None, &source).unwrap();
        assert_eq!(restored.sigkey, kp.secret.sigkey);

        // Explicit wrong passphrase still loses to the tag check
        let result = SecretKey::from_armored(&armored, Some("hunter3"), &source);
        assert!(matches!(result, Err(Error::Auth)));
    }

    #[test]
    fn test_seckey_wire_is_encrypted() {
        let kp = alice();
        let armored = kp.secret.to_armored(Some("pw"), &NoPassphrase).unwrap();
        let (_, wire) = armor::parse_block(&armored, BlockKind::SecretKey).unwrap();

        // The secret material window must not appear in the clear
        let window = &wire[SECRET_MATERIAL_OFFSET..SECRET_MATERIAL_OFFSET + 64];
        assert_ne!(window, &kp.secret.sigkey[..]);
    }

    #[test]
    fn test_seckey_tampered_ciphertext_fails() {
        let kp = alice();
        let armored = kp.secret.to_armored(Some("pw"), &NoPassphrase).unwrap();
        let (ident, mut wire) = armor::parse_block(&armored, BlockKind::SecretKey).unwrap();
        wire[SECRET_MATERIAL_OFFSET] ^= 0x01;

        let result = SecretKey::from_wire(&wire, ident, Some("pw"), &NoPassphrase);
        assert!(matches!(result, Err(Error::Auth)));
    }

    #[test]
    fn test_seckey_bad_kdfalg_rejected() {
        let kp = alice();
        let armored = kp.secret.to_armored(Some("pw"), &NoPassphrase).unwrap();
        let (ident, mut wire) = armor::parse_block(&armored, BlockKind::SecretKey).unwrap();
        wire[6] = b'Z'; // kdfalg

        let result = SecretKey::from_wire(&wire, ident, Some("pw"), &NoPassphrase);
        assert!(matches!(result, Err(Error::UnsupportedAlgorithm { .. })));
    }

    #[test]
    fn test_debug_output_redacted() {
        let kp = alice();
        let debug = format!("{:?}", kp.secret);
        assert!(debug.contains("REDACTED"));
        assert!(!debug.contains(&hex::encode(kp.secret.sigkey)));
    }
}
