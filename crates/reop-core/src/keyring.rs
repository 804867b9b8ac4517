//! Public-key lookup in a local key ring.
//!
//! The key ring is a plain file of concatenated armored `PUBLIC KEY`
//! blocks. Blank lines are permitted between blocks but not inside one.

use std::path::{Path, PathBuf};

use crate::armor::{self, BlockKind};
use crate::fileio;
use crate::keys::PublicKey;
use crate::{Error, Result};

/// Looks up public keys by identity.
pub trait PublicKeyLookup {
    /// Find the key for `ident`, or `None` when the ring has no entry.
    fn find(&self, ident: &str) -> Result<Option<PublicKey>>;
}

/// A file-backed key ring.
pub struct Keyring {
    path: PathBuf,
}

impl Keyring {
    /// A key ring at the given path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The backing path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PublicKeyLookup for Keyring {
    fn find(&self, ident: &str) -> Result<Option<PublicKey>> {
        let data = fileio::read_all(&self.path.to_string_lossy())?;
        let text = std::str::from_utf8(&data)
            .map_err(|_| Error::Format("key ring: not valid text".into()))?;
        find_in_keyring(text, ident)
    }
}

/// Search key-ring text for the key belonging to `ident`.
///
/// Every block in the ring must parse; a malformed ring is reported even
/// when the sought identity appears before the damage, so that corruption
/// does not hide behind a lucky lookup order.
pub fn find_in_keyring(text: &str, ident: &str) -> Result<Option<PublicKey>> {
    let mut found = None;
    let mut lines = text.lines().peekable();

    while lines.peek().is_some() {
        // Blank lines between blocks
        while matches!(lines.peek(), Some(l) if l.is_empty()) {
            lines.next();
        }
        if lines.peek().is_none() {
            break;
        }

        // Collect one block verbatim, through its END line
        let mut block = String::new();
        let mut closed = false;
        for line in lines.by_ref() {
            block.push_str(line);
            block.push('\n');
            if line.starts_with("-----END REOP ") {
                closed = true;
                break;
            }
        }
        if !closed {
            return Err(Error::Format("key ring: truncated block".into()));
        }

        let (block_ident, bytes) = armor::parse_block(&block, BlockKind::PublicKey)?;
        if found.is_none() && block_ident.as_str() == ident {
            found = Some(PublicKey::from_bytes(&bytes, block_ident)?);
        }
    }

    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ident::Ident;
    use crate::keys::generate;
    use std::io::Write;

    fn ring_of(names: &[&str]) -> (String, Vec<crate::keys::Keypair>) {
        let mut text = String::new();
        let mut keys = Vec::new();
        for name in names {
            let kp = generate(&Ident::new(name).unwrap());
            text.push_str(&kp.public.to_armored());
            text.push('\n'); // blank line between blocks
            keys.push(kp);
        }
        (text, keys)
    }

    #[test]
    fn test_find_each_ident() {
        let (text, keys) = ring_of(&["alice", "bob", "carol"]);

        for kp in &keys {
            let found = find_in_keyring(&text, kp.public.ident().as_str())
                .unwrap()
                .unwrap();
            assert_eq!(found.randomid(), kp.public.randomid());
        }
    }

    #[test]
    fn test_missing_ident_is_none() {
        let (text, _) = ring_of(&["alice", "bob"]);
        assert!(find_in_keyring(&text, "mallory").unwrap().is_none());
    }

    #[test]
    fn test_no_blank_lines_needed() {
        let alice = generate(&Ident::new("alice").unwrap());
        let bob = generate(&Ident::new("bob").unwrap());
        let text = format!("{}{}", alice.public.to_armored(), bob.public.to_armored());

        let found = find_in_keyring(&text, "bob").unwrap().unwrap();
        assert_eq!(found.randomid(), bob.public.randomid());
    }

    #[test]
    fn test_blank_line_inside_block_rejected() {
        let alice = generate(&Ident::new("alice").unwrap());
        let armored = alice.public.to_armored();
        // Inject a blank line into the middle of the payload
        let mut lines: Vec<&str> = armored.lines().collect();
        lines.insert(3, "");
        let corrupted = lines.join("\n") + "\n";

        assert!(find_in_keyring(&corrupted, "alice").is_err());
    }

    #[test]
    fn test_corrupt_ring_reported_even_after_match() {
        let (mut text, _) = ring_of(&["alice"]);
        text.push_str("-----BEGIN REOP PUBLIC KEY-----\nident:x\ngarbage!\n-----END REOP PUBLIC KEY-----\n");

        assert!(find_in_keyring(&text, "alice").is_err());
    }

    #[test]
    fn test_empty_ring() {
        assert!(find_in_keyring("", "alice").unwrap().is_none());
        assert!(find_in_keyring("\n\n", "alice").unwrap().is_none());
    }

    #[test]
    fn test_file_backed_lookup() {
        let (text, keys) = ring_of(&["alice", "bob"]);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pubkeyring");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(text.as_bytes()).unwrap();

        let ring = Keyring::new(&path);
        let found = ring.find("bob").unwrap().unwrap();
        assert_eq!(found.randomid(), keys[1].public.randomid());
        assert!(ring.find("mallory").unwrap().is_none());
    }
}
