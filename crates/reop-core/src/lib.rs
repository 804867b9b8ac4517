//! # reop-core
//!
//! File formats and cryptographic envelopes for the reop toolkit.
//!
//! This crate owns everything between raw primitives and the command line:
//!
//! - The key, signature, and envelope **data model** with its exact
//!   serialized byte layouts
//! - The **KDF wrapping** that protects secret keys with a passphrase
//! - The **armored** (`-----BEGIN REOP …-----`) and **binary** (`RBF`)
//!   framings, including the legacy envelope variants still accepted on read
//! - The **signing** and **encryption** flows
//! - The key-ring, passphrase-source, and file-I/O collaborators
//!
//! ## Security
//!
//! Decrypted secret keys, derived symmetric keys, and ephemeral secrets are
//! zeroized on drop. Decryption never exposes partial plaintext: tags are
//! verified before any plaintext leaves this crate.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod alg;
pub mod armor;
pub mod binary;
pub mod envelope;
pub mod error;
pub mod fileio;
pub mod ident;
pub mod keyring;
pub mod keys;
pub mod limits;
pub mod passphrase;
pub mod seal;
pub mod sig;
mod wire;

#[cfg(test)]
mod proptests;

pub use envelope::EnvelopeHeader;
pub use error::{Error, Result};
pub use ident::Ident;
pub use keyring::{find_in_keyring, Keyring, PublicKeyLookup};
pub use keys::{generate, Keypair, PublicKey, SecretKey};
pub use passphrase::{FixedPassphrase, NoPassphrase, PassphraseSource};
pub use sig::{sign, verify, Signature};
