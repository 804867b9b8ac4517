//! The armored text framing.
//!
//! Every reop artifact can travel as ASCII armor:
//!
//! ```text
//! -----BEGIN REOP <KIND>-----
//! ident:<identity>
//! <base64 payload, wrapped at 76 columns>
//! -----END REOP <KIND>-----
//! ```
//!
//! Encrypted messages carry two payloads (header, then ciphertext) separated
//! by a `BEGIN REOP ENCRYPTED MESSAGE DATA` marker. Signed messages embed
//! the raw plaintext between a `SIGNED MESSAGE` opener and a `SIGNATURE`
//! block; because the plaintext may itself contain a line that looks like
//! the signature opener, the message span ends at the **last** occurrence of
//! the opener in the file.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

use crate::ident::Ident;
use crate::sig::Signature;
use crate::{Error, Result};

/// Column at which base64 payload lines wrap.
pub const WRAP_COLUMNS: usize = 76;

const BEGIN_PREFIX: &str = "-----BEGIN REOP ";
const END_PREFIX: &str = "-----END REOP ";
const MARKER_SUFFIX: &str = "-----";
const IDENT_PREFIX: &str = "ident:";

/// Opener line of an embedded signed message, including its newline.
pub const SIGNED_MESSAGE_BEGIN: &str = "-----BEGIN REOP SIGNED MESSAGE-----\n";
/// Opener line of the signature block inside a signed message.
pub const SIGNATURE_BEGIN: &str = "-----BEGIN REOP SIGNATURE-----\n";
/// Closer line of an embedded signed message.
pub const SIGNED_MESSAGE_END: &str = "-----END REOP SIGNED MESSAGE-----\n";

const ENCRYPTED_BEGIN: &str = "-----BEGIN REOP ENCRYPTED MESSAGE-----";
const ENCRYPTED_DATA_BEGIN: &str = "-----BEGIN REOP ENCRYPTED MESSAGE DATA-----";
const ENCRYPTED_END: &str = "-----END REOP ENCRYPTED MESSAGE-----";

/// The kinds of single-payload armored blocks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockKind {
    /// A public key.
    PublicKey,
    /// A wrapped secret key.
    SecretKey,
    /// A detached signature.
    Signature,
}

impl BlockKind {
    fn label(self) -> &'static str {
        match self {
            BlockKind::PublicKey => "PUBLIC KEY",
            BlockKind::SecretKey => "SECRET KEY",
            BlockKind::Signature => "SIGNATURE",
        }
    }
}

/// Base64-encode and wrap so no line exceeds [`WRAP_COLUMNS`] characters.
fn encode_wrapped(payload: &[u8]) -> String {
    let b64 = BASE64.encode(payload);
    let mut out = String::with_capacity(b64.len() + b64.len() / WRAP_COLUMNS + 1);
    for chunk in b64.as_bytes().chunks(WRAP_COLUMNS) {
        // chunks of an ASCII string are ASCII
        out.push_str(std::str::from_utf8(chunk).unwrap_or_default());
        out.push('\n');
    }
    out
}

/// Encode a single-payload armored block.
pub fn encode_block(kind: BlockKind, ident: &Ident, payload: &[u8]) -> String {
    let label = kind.label();
    format!(
        "{BEGIN_PREFIX}{label}{MARKER_SUFFIX}\n{IDENT_PREFIX}{ident}\n{}{END_PREFIX}{label}{MARKER_SUFFIX}\n",
        encode_wrapped(payload)
    )
}

/// Line-by-line state shared by the block parsers.
struct Lines<'a> {
    inner: std::str::Lines<'a>,
    what: &'static str,
}

impl<'a> Lines<'a> {
    fn next(&mut self) -> Result<&'a str> {
        self.inner
            .next()
            .ok_or_else(|| Error::Format(format!("{}: truncated", self.what)))
    }

    fn expect(&mut self, line: &str) -> Result<()> {
        let got = self.next()?;
        if got != line {
            return Err(Error::Format(format!("{}: missing {line:?}", self.what)));
        }
        Ok(())
    }

    fn ident(&mut self) -> Result<Ident> {
        let line = self.next()?;
        let raw = line
            .strip_prefix(IDENT_PREFIX)
            .ok_or_else(|| Error::Format(format!("{}: missing ident line", self.what)))?;
        Ident::new(raw)
    }

    /// Accumulate base64 lines until one satisfying `stop`, then decode.
    fn base64_until(&mut self, stop: impl Fn(&str) -> bool) -> Result<Vec<u8>> {
        let mut b64 = String::new();
        loop {
            let line = self.next()?;
            if stop(line) {
                break;
            }
            if line.is_empty() {
                return Err(Error::Format(format!("{}: blank line in payload", self.what)));
            }
            b64.push_str(line);
        }
        BASE64
            .decode(&b64)
            .map_err(|_| Error::Format(format!("{}: bad base64 encoding", self.what)))
    }
}

/// Parse a single-payload armored block of the given kind.
///
/// The closing line only needs to be *an* `END REOP` marker: the signature
/// block inside a signed message is closed by `END REOP SIGNED MESSAGE`, and
/// this parser accepts that the same way the original file consumers do.
pub fn parse_block(text: &str, kind: BlockKind) -> Result<(Ident, Vec<u8>)> {
    let label = kind.label();
    let mut lines = Lines {
        inner: text.lines(),
        what: label_what(kind),
    };
    lines.expect(&format!("{BEGIN_PREFIX}{label}{MARKER_SUFFIX}"))?;
    let ident = lines.ident()?;
    let payload = lines.base64_until(|l| l.starts_with(END_PREFIX))?;
    Ok((ident, payload))
}

fn label_what(kind: BlockKind) -> &'static str {
    match kind {
        BlockKind::PublicKey => "public key",
        BlockKind::SecretKey => "secret key",
        BlockKind::Signature => "signature",
    }
}

/// Encode an armored encrypted message: header block, then ciphertext block.
pub fn encode_encrypted(ident: &Ident, header: &[u8], ciphertext: &[u8]) -> String {
    format!(
        "{ENCRYPTED_BEGIN}\n{IDENT_PREFIX}{ident}\n{}{ENCRYPTED_DATA_BEGIN}\n{}{ENCRYPTED_END}\n",
        encode_wrapped(header),
        encode_wrapped(ciphertext)
    )
}

/// Parse an armored encrypted message into `(ident, header, ciphertext)`.
///
/// The header bytes are returned undispatched; the envelope layer decides
/// which variant they are from their leading algorithm tag and length.
pub fn parse_encrypted(text: &str) -> Result<(Ident, Vec<u8>, Vec<u8>)> {
    let mut lines = Lines {
        inner: text.lines(),
        what: "encrypted message",
    };
    lines.expect(ENCRYPTED_BEGIN)?;
    let ident = lines.ident()?;
    let header = lines.base64_until(|l| l == ENCRYPTED_DATA_BEGIN)?;
    let ciphertext = lines.base64_until(|l| l == ENCRYPTED_END)?;
    Ok((ident, header, ciphertext))
}

/// Assemble an embedded signed message.
///
/// The plaintext is written verbatim, newlines and all, so the output is
/// bytes rather than a string.
pub fn encode_signed_message(msg: &[u8], sig: &Signature) -> Vec<u8> {
    let tail = format!(
        "{SIGNATURE_BEGIN}{IDENT_PREFIX}{}\n{}{SIGNED_MESSAGE_END}",
        sig.ident(),
        encode_wrapped(&sig.to_bytes())
    );
    let mut out = Vec::with_capacity(SIGNED_MESSAGE_BEGIN.len() + msg.len() + tail.len());
    out.extend_from_slice(SIGNED_MESSAGE_BEGIN.as_bytes());
    out.extend_from_slice(msg);
    out.extend_from_slice(tail.as_bytes());
    out
}

/// Split an embedded signed message into the message span and its signature.
///
/// The message span runs from the end of the opener to the **last**
/// occurrence of the signature opener; message content containing a decoy
/// opener line therefore verifies correctly.
pub fn split_signed_message(data: &[u8]) -> Result<(&[u8], Signature)> {
    if !data.starts_with(SIGNED_MESSAGE_BEGIN.as_bytes()) {
        return Err(Error::Format("signed message: missing opener".into()));
    }
    let body = &data[SIGNED_MESSAGE_BEGIN.len()..];

    let sig_at = rfind(body, SIGNATURE_BEGIN.as_bytes())
        .ok_or_else(|| Error::Format("signed message: missing signature block".into()))?;
    let msg = &body[..sig_at];

    let sig_text = std::str::from_utf8(&body[sig_at..])
        .map_err(|_| Error::Format("signature: not valid text".into()))?;
    let sig = Signature::from_armored(sig_text)?;
    Ok((msg, sig))
}

/// Last occurrence of `needle` in `haystack`.
fn rfind(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    (0..=haystack.len() - needle.len()).rev().find(|&i| &haystack[i..i + needle.len()] == needle)
}
