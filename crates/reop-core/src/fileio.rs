//! File reading and writing with the toolkit's safety rules.
//!
//! - `-` names standard input or standard output
//! - Symlinks and directories are refused
//! - Reads are capped at [`MAX_INPUT_SIZE`]
//! - Key files are created exclusively: generation never overwrites

use std::fs::OpenOptions;
use std::io::{Read, Write};

use crate::limits::MAX_INPUT_SIZE;
use crate::{Error, Result};

/// The path sentinel naming standard input or output.
pub const STDIO: &str = "-";

/// How an output file is created.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WriteMode {
    /// Owner read/write only, exclusive creation. For secret keys.
    Secret,
    /// World-readable, exclusive creation. For public keys.
    PublicExclusive,
    /// World-readable, truncating. For signatures, ciphertext, plaintext.
    Truncate,
}

fn io_err(path: &str, source: std::io::Error) -> Error {
    Error::Io {
        path: path.to_owned(),
        source,
    }
}

/// Read a whole file (or stdin for `-`), enforcing the size cap.
pub fn read_all(path: &str) -> Result<Vec<u8>> {
    if path == STDIO {
        return read_capped(std::io::stdin().lock(), path);
    }

    let meta = std::fs::symlink_metadata(path).map_err(|e| io_err(path, e))?;
    if meta.file_type().is_symlink() || meta.is_dir() {
        return Err(Error::NotRegularFile {
            path: path.to_owned(),
        });
    }
    if meta.len() > MAX_INPUT_SIZE {
        return Err(Error::TooLarge {
            path: path.to_owned(),
            limit: MAX_INPUT_SIZE,
        });
    }

    let file = std::fs::File::open(path).map_err(|e| io_err(path, e))?;
    read_capped(file, path)
}

fn read_capped(reader: impl Read, path: &str) -> Result<Vec<u8>> {
    let mut data = Vec::new();
    let mut limited = reader.take(MAX_INPUT_SIZE + 1);
    limited
        .read_to_end(&mut data)
        .map_err(|e| io_err(path, e))?;
    if data.len() as u64 > MAX_INPUT_SIZE {
        return Err(Error::TooLarge {
            path: path.to_owned(),
            limit: MAX_INPUT_SIZE,
        });
    }
    Ok(data)
}

/// Write a whole file (or stdout for `-`) under the given creation mode.
pub fn write_all(path: &str, data: &[u8], mode: WriteMode) -> Result<()> {
    if path == STDIO {
        let mut out = std::io::stdout().lock();
        out.write_all(data).map_err(|e| io_err(path, e))?;
        out.flush().map_err(|e| io_err(path, e))?;
        return Ok(());
    }

    // Refuse to follow an existing symlink even in truncate mode
    if let Ok(meta) = std::fs::symlink_metadata(path) {
        if meta.file_type().is_symlink() || meta.is_dir() {
            return Err(Error::NotRegularFile {
                path: path.to_owned(),
            });
        }
    }

    let mut options = OpenOptions::new();
    options.write(true);
    match mode {
        WriteMode::Secret | WriteMode::PublicExclusive => {
            options.create_new(true);
        }
        WriteMode::Truncate => {
            options.create(true).truncate(true);
        }
    }
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(match mode {
            WriteMode::Secret => 0o600,
            WriteMode::PublicExclusive | WriteMode::Truncate => 0o644,
        });
    }

    let mut file = options.open(path).map_err(|e| io_err(path, e))?;
    file.write_all(data).map_err(|e| io_err(path, e))?;
    Ok(())
}
