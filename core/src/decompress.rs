//! Exposes a sequential byte reader over a bzip2 stream. The Wikipedia
//! multistream format concatenates many independent bzip2 blocks into one
//! file; [`bzip2::read::MultiBzDecoder`] already decodes a concatenation of
//! streams transparently (as opposed to `BzDecoder`, which stops after the
//! first member), so a single reader handles the whole file without any
//! bespoke block-splitting logic.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use bzip2::read::MultiBzDecoder;

use crate::error::{Error, Result};

/// Buffer size used when wrapping the decompressor, chosen to amortize
/// syscall overhead over the multi-gigabyte dumps this reads.
const READ_BUFFER: usize = 256 * 1024;

/// Opens `path` and returns a buffered, sequential byte reader over its
/// decompressed contents.
///
/// Errors from the underlying bzip2 stream (corrupt blocks) surface lazily
/// as `std::io::Error` from the returned reader's `read`/`read_line` calls;
/// callers should map those to [`Error::Decompression`] with `path`
/// attached, since the reader itself has no path to report.
pub fn open(path: impl AsRef<Path>) -> Result<impl BufRead> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| Error::Decompression {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(BufReader::with_capacity(
        READ_BUFFER,
        MultiBzDecoder::new(BufReader::new(file)),
    ))
}

/// Wraps an I/O error encountered while reading from a decompression
/// source, attaching the path for diagnostics.
pub fn wrap_io_error(path: &Path, source: std::io::Error) -> Error {
    Error::Decompression {
        path: path.to_path_buf(),
        source,
    }
}
