//! The reop command line: generate, sign, verify, encrypt, decrypt.
//!
//! This binary is thin glue. Everything interesting lives in `reop-core`;
//! here we parse arguments, resolve default paths under `~/.reop`, read a
//! passphrase from `REOP_PASSPHRASE` or the terminal, and shuttle bytes
//! between files and the core flows.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;
use zeroize::Zeroizing;

use reop_core::armor;
use reop_core::binary;
use reop_core::fileio::{self, WriteMode};
use reop_core::seal;
use reop_core::{
    EnvelopeHeader, Error, Ident, Keyring, PassphraseSource, PublicKey, PublicKeyLookup,
    SecretKey, Signature,
};

/// Create and open signed, authenticated, and encrypted files.
#[derive(Parser, Debug)]
#[command(name = "reop", version, about, long_about = None)]
struct Cli {
    /// Suppress informational output.
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a new keypair.
    Generate {
        /// Identity to label the keys with (defaults to $USER).
        #[arg(short, long)]
        ident: Option<String>,

        /// Where to write the public key (defaults to ~/.reop/pubkey).
        #[arg(short, long, requires = "seckey")]
        pubkey: Option<String>,

        /// Where to write the secret key (defaults to ~/.reop/seckey).
        #[arg(short, long, requires = "pubkey")]
        seckey: Option<String>,

        /// Do not protect the secret key with a passphrase.
        #[arg(short = 'n', long)]
        no_passphrase: bool,
    },

    /// Sign a message with a secret key.
    Sign {
        /// Secret key file (defaults to ~/.reop/seckey).
        #[arg(short, long)]
        seckey: Option<String>,

        /// The message file to sign (`-` for stdin).
        #[arg(short, long)]
        msgfile: String,

        /// Where to write the signature (defaults to <msgfile>.sig).
        #[arg(short = 'x', long)]
        sigfile: Option<String>,

        /// Write message and signature together into one file.
        #[arg(short, long)]
        embedded: bool,
    },

    /// Verify a signature.
    Verify {
        /// Public key file; omitted, the signer's identity is looked up in
        /// the key ring.
        #[arg(short, long)]
        pubkey: Option<String>,

        /// The message file; omit it to verify an embedded signed message.
        #[arg(short, long)]
        msgfile: Option<String>,

        /// The signature file (defaults to <msgfile>.sig).
        #[arg(short = 'x', long)]
        sigfile: Option<String>,
    },

    /// Encrypt a message, to a public key or with a passphrase.
    Encrypt {
        /// Recipient's public key file.
        #[arg(short, long)]
        pubkey: Option<String>,

        /// Recipient's identity, looked up in the key ring.
        #[arg(short, long)]
        ident: Option<String>,

        /// Sender's secret key file (defaults to ~/.reop/seckey).
        #[arg(short, long)]
        seckey: Option<String>,

        /// The message file to encrypt (`-` for stdin).
        #[arg(short, long)]
        msgfile: String,

        /// Where to write the ciphertext (defaults to <msgfile>.enc).
        #[arg(short = 'x', long)]
        encfile: Option<String>,

        /// Write the binary framing instead of armor.
        #[arg(short, long)]
        binary: bool,

        /// Write the legacy 1.x envelope for old consumers.
        #[arg(short = '1', long)]
        v1_compat: bool,
    },

    /// Decrypt a message.
    Decrypt {
        /// Sender's public key file.
        #[arg(short, long)]
        pubkey: Option<String>,

        /// Recipient's secret key file (defaults to ~/.reop/seckey).
        #[arg(short, long)]
        seckey: Option<String>,

        /// Where to write the plaintext (`-` for stdout).
        #[arg(short, long)]
        msgfile: String,

        /// The encrypted input (defaults to <msgfile>.enc).
        #[arg(short = 'x', long)]
        encfile: Option<String>,
    },
}

/// Passphrase source for interactive use: environment first, terminal
/// second.
struct EnvPassphrase;

impl PassphraseSource for EnvPassphrase {
    fn read_passphrase(&self, prompt: &str, confirm: bool) -> reop_core::Result<Zeroizing<String>> {
        if let Ok(pass) = std::env::var("REOP_PASSPHRASE") {
            debug!("passphrase taken from REOP_PASSPHRASE");
            return Ok(Zeroizing::new(pass));
        }

        let entered = Zeroizing::new(
            rpassword::prompt_password(prompt)
                .map_err(|e| Error::Passphrase(format!("unable to read passphrase: {e}")))?,
        );
        if confirm {
            let again = Zeroizing::new(
                rpassword::prompt_password("confirm passphrase: ")
                    .map_err(|e| Error::Passphrase(format!("unable to read passphrase: {e}")))?,
            );
            if *entered != *again {
                return Err(Error::Passphrase("passphrases do not match".into()));
            }
        }
        Ok(entered)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("REOP_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Generate {
            ident,
            pubkey,
            seckey,
            no_passphrase,
        } => generate(ident, pubkey, seckey, no_passphrase),
        Command::Sign {
            seckey,
            msgfile,
            sigfile,
            embedded,
        } => sign(seckey, &msgfile, sigfile, embedded),
        Command::Verify {
            pubkey,
            msgfile,
            sigfile,
        } => verify(pubkey, msgfile, sigfile, cli.quiet),
        Command::Encrypt {
            pubkey,
            ident,
            seckey,
            msgfile,
            encfile,
            binary,
            v1_compat,
        } => encrypt(pubkey, ident, seckey, &msgfile, encfile, binary, v1_compat),
        Command::Decrypt {
            pubkey,
            seckey,
            msgfile,
            encfile,
        } => decrypt(pubkey, seckey, &msgfile, encfile),
    }
}

// ==================== Default paths ====================

fn home_reop_dir() -> Option<PathBuf> {
    let home = std::env::var_os("HOME")?;
    Some(Path::new(&home).join(".reop"))
}

/// Path to a file under `~/.reop`, but only when the directory exists.
fn default_key_file(name: &str) -> Option<String> {
    let dir = home_reop_dir()?;
    if !dir.is_dir() {
        return None;
    }
    Some(dir.join(name).to_string_lossy().into_owned())
}

/// Derive `<msgfile>.<ext>` for default signature and ciphertext names.
fn derived_path(msgfile: &str, ext: &str) -> Result<String> {
    if msgfile == fileio::STDIO {
        bail!("an explicit output file is required when the message is -");
    }
    Ok(format!("{msgfile}.{ext}"))
}

// ==================== Key loading ====================

/// Load a public key: explicit file, key-ring lookup by identity, or the
/// default key file, in that order of preference.
fn load_pubkey(path: Option<&str>, ident: Option<&str>) -> Result<PublicKey> {
    if path.is_none() {
        if let Some(ident) = ident {
            let ring_path = default_key_file("pubkeyring")
                .ok_or_else(|| Error::NoKey(format!("{ident} (no key ring)")))?;
            debug!(ring = %ring_path, ident, "searching key ring");
            let ring = Keyring::new(&ring_path);
            return Ok(ring
                .find(ident)?
                .ok_or_else(|| Error::NoKey(ident.to_owned()))?);
        }
    }

    let path = match path.map(str::to_owned).or_else(|| default_key_file("pubkey")) {
        Some(p) => p,
        None => bail!(Error::NoKey("no public key file".into())),
    };
    debug!(path = %path, "loading public key");
    let data = fileio::read_all(&path)?;
    let text = std::str::from_utf8(&data)
        .map_err(|_| Error::Format("public key: not valid text".into()))?;
    PublicKey::from_armored(text).with_context(|| format!("in {path}"))
}

/// Load and unwrap a secret key from an explicit or default path.
fn load_seckey(path: Option<&str>) -> Result<SecretKey> {
    let path = match path.map(str::to_owned).or_else(|| default_key_file("seckey")) {
        Some(p) => p,
        None => bail!(Error::NoKey("no secret key file".into())),
    };
    debug!(path = %path, "loading secret key");
    let data = fileio::read_all(&path)?;
    let text = std::str::from_utf8(&data)
        .map_err(|_| Error::Format("secret key: not valid text".into()))?;
    SecretKey::from_armored(text, None, &EnvPassphrase).with_context(|| format!("in {path}"))
}

// ==================== Commands ====================

fn generate(
    ident: Option<String>,
    pubkeyfile: Option<String>,
    seckeyfile: Option<String>,
    no_passphrase: bool,
) -> Result<()> {
    let ident = match ident.or_else(|| std::env::var("USER").ok()) {
        Some(name) => Ident::new(&name)?,
        None => Ident::new("unknown")?,
    };

    // Without explicit paths the keys live in ~/.reop; make sure it exists
    // (secret keys inside, so owner-only).
    if pubkeyfile.is_none() && seckeyfile.is_none() {
        let dir = home_reop_dir().context("HOME is not set")?;
        if !dir.is_dir() {
            make_private_dir(&dir).with_context(|| format!("creating {}", dir.display()))?;
        }
    }
    let seckeyfile = match seckeyfile.or_else(|| default_key_file("seckey")) {
        Some(p) => p,
        None => bail!("no secret key path"),
    };
    let pubkeyfile = match pubkeyfile.or_else(|| default_key_file("pubkey")) {
        Some(p) => p,
        None => bail!("no public key path"),
    };

    let keypair = reop_core::generate(&ident);
    let passphrase = if no_passphrase { Some("") } else { None };

    let sec_armored = keypair.secret.to_armored(passphrase, &EnvPassphrase)?;
    fileio::write_all(&seckeyfile, sec_armored.as_bytes(), WriteMode::Secret)
        .with_context(|| format!("writing {seckeyfile}"))?;
    debug!(path = %seckeyfile, "wrote secret key");

    let pub_armored = keypair.public.to_armored();
    fileio::write_all(&pubkeyfile, pub_armored.as_bytes(), WriteMode::PublicExclusive)
        .with_context(|| format!("writing {pubkeyfile}"))?;
    debug!(path = %pubkeyfile, "wrote public key");

    Ok(())
}

fn make_private_dir(dir: &Path) -> std::io::Result<()> {
    let mut builder = std::fs::DirBuilder::new();
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o700);
    }
    builder.create(dir)
}

fn sign(
    seckeyfile: Option<String>,
    msgfile: &str,
    sigfile: Option<String>,
    embedded: bool,
) -> Result<()> {
    let sigfile = match sigfile {
        Some(p) => p,
        None => derived_path(msgfile, "sig")?,
    };

    let msg = fileio::read_all(msgfile)?;
    let seckey = load_seckey(seckeyfile.as_deref())?;
    let sig = reop_core::sign(&seckey, &msg)?;

    if embedded {
        let file = armor::encode_signed_message(&msg, &sig);
        fileio::write_all(&sigfile, &file, WriteMode::Truncate)?;
    } else {
        fileio::write_all(&sigfile, sig.to_armored().as_bytes(), WriteMode::Truncate)?;
    }
    Ok(())
}

fn verify(
    pubkeyfile: Option<String>,
    msgfile: Option<String>,
    sigfile: Option<String>,
    quiet: bool,
) -> Result<()> {
    match msgfile {
        Some(msgfile) => {
            // Detached: separate message and signature files
            let sigfile = match sigfile {
                Some(p) => p,
                None => derived_path(&msgfile, "sig")?,
            };
            let msg = fileio::read_all(&msgfile)?;
            let sigdata = fileio::read_all(&sigfile)?;
            let sigtext = std::str::from_utf8(&sigdata)
                .map_err(|_| Error::Format("signature: not valid text".into()))?;
            let sig = Signature::from_armored(sigtext)?;

            let pubkey = load_pubkey(pubkeyfile.as_deref(), Some(sig.ident().as_str()))?;
            reop_core::verify(&pubkey, &msg, &sig)?;
        }
        None => {
            // Embedded: one file holding message and signature
            let sigfile = sigfile.context("must specify a message or signature file")?;
            let data = fileio::read_all(&sigfile)?;
            let (span, sig) = armor::split_signed_message(&data)?;

            let pubkey = load_pubkey(pubkeyfile.as_deref(), Some(sig.ident().as_str()))?;
            reop_core::verify(&pubkey, span, &sig)?;
        }
    }

    if !quiet {
        println!("Signature Verified");
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn encrypt(
    pubkeyfile: Option<String>,
    ident: Option<String>,
    seckeyfile: Option<String>,
    msgfile: &str,
    encfile: Option<String>,
    binary_out: bool,
    v1_compat: bool,
) -> Result<()> {
    let encfile = match encfile {
        Some(p) => p,
        None => derived_path(msgfile, "enc")?,
    };

    let mut msg = Zeroizing::new(fileio::read_all(msgfile)?);

    let (header, written_ident) = if pubkeyfile.is_some() || ident.is_some() {
        let pubkey = load_pubkey(pubkeyfile.as_deref(), ident.as_deref())?;
        let seckey = load_seckey(seckeyfile.as_deref())?;
        let header = if v1_compat {
            EnvelopeHeader::LegacyStatic(seal::encrypt_legacy(&pubkey, &seckey, &mut msg)?)
        } else {
            EnvelopeHeader::PublicKey(seal::encrypt(&pubkey, &seckey, &mut msg)?)
        };
        (header, seckey.ident().clone())
    } else {
        if seckeyfile.is_some() {
            bail!("specify a recipient public key or identity");
        }
        let header = seal::encrypt_symmetric(&mut msg, None, &EnvPassphrase)?;
        (EnvelopeHeader::Symmetric(header), Ident::new("<symmetric>")?)
    };

    let out = if binary_out {
        binary::encode_binary(&header, &written_ident, &msg)
    } else {
        armor::encode_encrypted(&written_ident, &header.to_bytes(), &msg).into_bytes()
    };
    fileio::write_all(&encfile, &out, WriteMode::Truncate)?;
    Ok(())
}

fn decrypt(
    pubkeyfile: Option<String>,
    seckeyfile: Option<String>,
    msgfile: &str,
    encfile: Option<String>,
) -> Result<()> {
    let encfile = match encfile {
        Some(p) => p,
        None => derived_path(msgfile, "enc")?,
    };

    let encdata = fileio::read_all(&encfile)?;
    let (ident, header, ciphertext) = if binary::is_binary(&encdata) {
        binary::parse_binary(&encdata)?
    } else {
        let text = std::str::from_utf8(&encdata)
            .map_err(|_| Error::Format("encrypted message: not valid text".into()))?;
        let (ident, header_bytes, ciphertext) = armor::parse_encrypted(text)?;
        (ident, EnvelopeHeader::from_bytes(&header_bytes)?, ciphertext)
    };
    let mut msg = Zeroizing::new(ciphertext);
    debug!(alg = ?header.alg(), ident = %ident, "decrypting");

    match &header {
        EnvelopeHeader::Symmetric(h) => {
            seal::decrypt_symmetric(h, &mut msg, None, &EnvPassphrase)?;
        }
        EnvelopeHeader::PublicKey(h) => {
            let pubkey = load_pubkey(pubkeyfile.as_deref(), Some(ident.as_str()))?;
            let seckey = load_seckey(seckeyfile.as_deref())?;
            seal::decrypt(h, &pubkey, &seckey, &mut msg)?;
        }
        EnvelopeHeader::LegacyStatic(h) => {
            let pubkey = load_pubkey(pubkeyfile.as_deref(), Some(ident.as_str()))?;
            let seckey = load_seckey(seckeyfile.as_deref())?;
            seal::decrypt_legacy(h, &pubkey, &seckey, &mut msg)?;
        }
        EnvelopeHeader::LegacyEphemeral(h) => {
            let seckey = load_seckey(seckeyfile.as_deref())?;
            seal::decrypt_legacy_ephemeral(h, &seckey, &mut msg)?;
        }
    }

    // Only reached after the tag verified: never write partial plaintext
    fileio::write_all(msgfile, &msg, WriteMode::Truncate)?;
    Ok(())
}
