//! Streaming a payload to disk

use std::fs;
use std::io::{BufWriter, Read, Write};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use tempfile::NamedTempFile;

use super::error::{RemoteError, RemoteResult};

/// Chunk size for copying payloads
const CHUNK_SIZE: usize = 8192;

/// Stream `reader` into `dest`, returning the number of bytes written.
///
/// Parent directories are created as needed. Each call writes into its own
/// temporary file next to `dest`, which is persisted over `dest` only once
/// complete, so an interrupted or short transfer never replaces `dest`.
/// When `expected` is known, a payload of any other length is rejected.
pub fn write_stream<R: Read>(
    mut reader: R,
    dest: &Path,
    expected: Option<u64>,
    cancel: &AtomicBool,
) -> RemoteResult<u64> {
    let parent = match dest.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    // Removed on drop unless persisted
    let mut tmp = NamedTempFile::new_in(parent)?;
    let written = copy_to(&mut reader, &mut tmp, cancel)?;

    if let Some(expected) = expected {
        if expected != written {
            return Err(RemoteError::Truncated { expected, written });
        }
    }

    tmp.as_file().sync_all()?;
    tmp.persist(dest).map_err(|e| RemoteError::Io(e.error))?;
    Ok(written)
}

fn copy_to<R: Read, W: Write>(reader: &mut R, out: W, cancel: &AtomicBool) -> RemoteResult<u64> {
    let mut writer = BufWriter::new(out);
    let mut buffer = [0u8; CHUNK_SIZE];
    let mut written = 0u64;

    loop {
        if cancel.load(Ordering::Relaxed) {
            return Err(RemoteError::Cancelled);
        }

        let n = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(RemoteError::Request(e.to_string())),
        };

        writer.write_all(&buffer[..n])?;
        written += n as u64;
    }

    writer.flush()?;
    Ok(written)
}
