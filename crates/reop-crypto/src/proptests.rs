//! Property-based tests for the primitive wrappers.
//!
//! The in-place contract is the load-bearing property here: every encrypt
//! leaves the buffer the same length, and every decrypt restores the exact
//! original bytes or fails closed.

use proptest::prelude::*;

use crate::kdf::SALT_SIZE;
use crate::{
    box_keypair, derive_key, pub_decrypt, pub_encrypt, sign_detached, sign_keypair, sym_decrypt,
    sym_encrypt, verify_detached, SymKey,
};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn secretbox_roundtrip(msg in any::<Vec<u8>>()) {
        let key = SymKey::generate();
        let mut buf = msg.clone();

        let (nonce, tag) = sym_encrypt(&mut buf, &key).unwrap();
        prop_assert_eq!(buf.len(), msg.len());

        sym_decrypt(&mut buf, &nonce, &tag, &key).unwrap();
        prop_assert_eq!(buf, msg);
    }

    #[test]
    fn secretbox_rejects_any_flipped_tag_bit(msg in any::<Vec<u8>>(), bit in 0usize..128) {
        let key = SymKey::generate();
        let mut buf = msg;

        let (nonce, mut tag) = sym_encrypt(&mut buf, &key).unwrap();
        tag[bit / 8] ^= 1 << (bit % 8);

        prop_assert!(sym_decrypt(&mut buf, &nonce, &tag, &key).is_err());
    }

    #[test]
    fn cryptobox_roundtrip(msg in any::<Vec<u8>>()) {
        let (alice_pub, alice_sec) = box_keypair();
        let (bob_pub, bob_sec) = box_keypair();
        let mut buf = msg.clone();

        let (nonce, tag) = pub_encrypt(&mut buf, &bob_pub, &alice_sec).unwrap();
        prop_assert_eq!(buf.len(), msg.len());

        pub_decrypt(&mut buf, &nonce, &tag, &alice_pub, &bob_sec).unwrap();
        prop_assert_eq!(buf, msg);
    }

    #[test]
    fn signatures_verify_and_bind_to_message(msg in any::<Vec<u8>>(), extra in any::<u8>()) {
        let (pubkey, seckey) = sign_keypair();
        let sig = sign_detached(&seckey, &msg).unwrap();

        prop_assert!(verify_detached(&pubkey, &msg, &sig).is_ok());

        let mut other = msg.clone();
        other.push(extra);
        prop_assert!(verify_detached(&pubkey, &other, &sig).is_err());
    }
}

proptest! {
    // bcrypt is deliberately slow; a handful of cases with small round
    // counts is plenty to pin the derivation laws
    #![proptest_config(ProptestConfig::with_cases(8))]

    #[test]
    fn kdf_depends_on_every_input(
        pass in "[ -~]{1,16}",
        salt_a in any::<[u8; SALT_SIZE]>(),
        salt_b in any::<[u8; SALT_SIZE]>(),
    ) {
        let a = derive_key(&pass, &salt_a, 2).unwrap();
        let b = derive_key(&pass, &salt_b, 2).unwrap();
        if salt_a == salt_b {
            prop_assert_eq!(a.as_bytes(), b.as_bytes());
        } else {
            prop_assert_ne!(a.as_bytes(), b.as_bytes());
        }
    }
}
