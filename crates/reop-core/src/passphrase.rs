//! Passphrase acquisition.
//!
//! The core never reads a TTY or the environment itself. Anything that needs
//! a passphrase takes an optional explicit passphrase plus a
//! [`PassphraseSource`]; the source is consulted only when no explicit
//! passphrase was given. The CLI wires in an implementation that checks
//! `REOP_PASSPHRASE` and then prompts.

use zeroize::Zeroizing;

use crate::{Error, Result};

/// Supplies a passphrase on demand.
pub trait PassphraseSource {
    /// Obtain a passphrase.
    ///
    /// With `confirm` set, interactive implementations should prompt twice
    /// and require the entries to match.
    fn read_passphrase(&self, prompt: &str, confirm: bool) -> Result<Zeroizing<String>>;
}

/// A source that always fails: for contexts where prompting is impossible.
pub struct NoPassphrase;

impl PassphraseSource for NoPassphrase {
    fn read_passphrase(&self, _prompt: &str, _confirm: bool) -> Result<Zeroizing<String>> {
        Err(Error::Passphrase("no passphrase available".into()))
    }
}

/// A source that returns a fixed passphrase: for tests and fixtures.
pub struct FixedPassphrase(pub String);

impl PassphraseSource for FixedPassphrase {
    fn read_passphrase(&self, _prompt: &str, _confirm: bool) -> Result<Zeroizing<String>> {
        Ok(Zeroizing::new(self.0.clone()))
    }
}

/// Resolve a passphrase: explicit value first, source second.
///
/// An explicit passphrase is used verbatim, even when empty (the empty
/// passphrase is how callers select the no-passphrase key mode). A prompted
/// passphrase must be non-empty.
pub(crate) fn resolve(
    passphrase: Option<&str>,
    source: &dyn PassphraseSource,
    prompt: &str,
    confirm: bool,
) -> Result<Zeroizing<String>> {
    match passphrase {
        Some(p) => Ok(Zeroizing::new(p.to_owned())),
        None => {
            let entered = source.read_passphrase(prompt, confirm)?;
            if entered.is_empty() {
                return Err(Error::Passphrase("an empty passphrase is not allowed".into()));
            }
            Ok(entered)
        }
    }
}
