//! Property-based tests for the format and envelope layers.
//!
//! These verify the toolkit's core laws over arbitrary inputs:
//!
//! - Sign/verify and encrypt/decrypt roundtrips always hold
//! - Armoring and binary framing never alter payload bytes
//! - Secret-key wrapping is idempotent under the same passphrase

use proptest::prelude::*;

use crate::armor::{self, BlockKind, WRAP_COLUMNS};
use crate::binary::{encode_binary, parse_binary};
use crate::envelope::EnvelopeHeader;
use crate::ident::Ident;
use crate::keys::{generate, SecretKey};
use crate::passphrase::NoPassphrase;
use crate::seal::{decrypt, decrypt_symmetric, encrypt, encrypt_symmetric};
use crate::sig::{sign, verify};

fn ident(name: &str) -> Ident {
    Ident::new(name).unwrap()
}

// ==================== Signing ====================

proptest! {
    // Generating keypairs is slow enough that the default case count would
    // drag; the laws are exercised across 16 fresh keypairs each.
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn sign_verify_roundtrip(msg in any::<Vec<u8>>()) {
        let kp = generate(&ident("prop"));
        let sig = sign(&kp.secret, &msg).unwrap();
        prop_assert!(verify(&kp.public, &msg, &sig).is_ok());
    }

    #[test]
    fn signature_survives_armoring(msg in any::<Vec<u8>>()) {
        let kp = generate(&ident("prop"));
        let sig = sign(&kp.secret, &msg).unwrap();
        let parsed = crate::sig::Signature::from_armored(&sig.to_armored()).unwrap();
        prop_assert_eq!(&parsed, &sig);
        prop_assert!(verify(&kp.public, &msg, &parsed).is_ok());
    }

    #[test]
    fn embedded_signed_message_roundtrip(msg in any::<Vec<u8>>()) {
        let kp = generate(&ident("prop"));
        let sig = sign(&kp.secret, &msg).unwrap();
        let file = armor::encode_signed_message(&msg, &sig);

        let (span, parsed) = armor::split_signed_message(&file).unwrap();
        prop_assert_eq!(span, &msg[..]);
        prop_assert!(verify(&kp.public, span, &parsed).is_ok());
    }
}

// ==================== Encryption ====================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn public_key_encrypt_decrypt_roundtrip(msg in any::<Vec<u8>>()) {
        let alice = generate(&ident("alice"));
        let bob = generate(&ident("bob"));

        let mut buf = msg.clone();
        let header = encrypt(&bob.public, &alice.secret, &mut buf).unwrap();
        decrypt(&header, &alice.public, &bob.secret, &mut buf).unwrap();
        prop_assert_eq!(buf, msg);
    }

    #[test]
    fn envelope_header_bytes_roundtrip(msg in any::<Vec<u8>>()) {
        let alice = generate(&ident("alice"));
        let bob = generate(&ident("bob"));

        let mut buf = msg;
        let header = encrypt(&bob.public, &alice.secret, &mut buf).unwrap();
        let wrapped = EnvelopeHeader::PublicKey(header);
        let bytes = wrapped.to_bytes();
        let reparsed = EnvelopeHeader::from_bytes(&bytes).unwrap();
        prop_assert_eq!(reparsed.to_bytes(), bytes);
    }
}

// Symmetric encryption pays for 42 bcrypt rounds per case; keep the case
// count low and the passphrase alphabet broad.
proptest! {
    #![proptest_config(ProptestConfig::with_cases(8))]

    #[test]
    fn symmetric_encrypt_decrypt_roundtrip(
        msg in any::<Vec<u8>>(),
        pass in "[a-zA-Z0-9 ]{1,24}",
    ) {
        let mut buf = msg.clone();
        let header = encrypt_symmetric(&mut buf, Some(&pass), &NoPassphrase).unwrap();
        decrypt_symmetric(&header, &mut buf, Some(&pass), &NoPassphrase).unwrap();
        prop_assert_eq!(buf, msg);
    }

    #[test]
    fn secret_key_wrap_is_idempotent(pass in "[a-zA-Z0-9]{1,24}") {
        let kp = generate(&ident("prop"));
        let armored = kp.secret.to_armored(Some(&pass), &NoPassphrase).unwrap();
        let restored = SecretKey::from_armored(&armored, Some(&pass), &NoPassphrase).unwrap();
        prop_assert_eq!(restored.sigkey, kp.secret.sigkey);
        prop_assert_eq!(restored.enckey, kp.secret.enckey);
        prop_assert_eq!(restored.randomid, kp.secret.randomid);
    }
}

// ==================== Framings ====================

proptest! {
    #[test]
    fn armored_block_preserves_payload(payload in any::<Vec<u8>>()) {
        let armored = armor::encode_block(BlockKind::Signature, &ident("prop"), &payload);
        let (_, parsed) = armor::parse_block(&armored, BlockKind::Signature).unwrap();
        prop_assert_eq!(parsed, payload);
    }

    #[test]
    fn armored_lines_never_exceed_wrap_width(payload in any::<Vec<u8>>()) {
        let armored = armor::encode_block(BlockKind::Signature, &ident("prop"), &payload);
        for line in armored.lines() {
            prop_assert!(line.len() <= WRAP_COLUMNS);
        }
    }

    #[test]
    fn binary_framing_preserves_ciphertext(
        ciphertext in any::<Vec<u8>>(),
        name in "[a-z]{1,16}",
    ) {
        let header = EnvelopeHeader::from_bytes(&sym_header_bytes()).unwrap();
        let data = encode_binary(&header, &ident(&name), &ciphertext);
        let (parsed_ident, parsed_header, parsed_ct) = parse_binary(&data).unwrap();
        prop_assert_eq!(parsed_ident.as_str(), name);
        prop_assert_eq!(parsed_header.to_bytes(), header.to_bytes());
        prop_assert_eq!(parsed_ct, ciphertext);
    }
}

fn sym_header_bytes() -> Vec<u8> {
    use crate::envelope::SymHeader;
    EnvelopeHeader::Symmetric(SymHeader {
        symalg: crate::alg::SYM_SALSA_POLY,
        kdfalg: crate::alg::KDF_BCRYPT,
        kdfrounds: 42,
        salt: [1; 16],
        nonce: [2; 24],
        tag: [3; 16],
    })
    .to_bytes()
}
