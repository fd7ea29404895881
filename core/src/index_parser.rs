//! Turns lines of the form `<seek>:<article_id>:<title>` into
//! [`IndexEntry`] pairs. The title is not retained (the core has no need
//! for it; only the store's `title` column, populated from the article
//! XML, is authoritative).

use std::cell::RefCell;
use std::io::BufRead;
use std::rc::Rc;

use crate::model::IndexEntry;

/// Handle shared between an [`IndexParser`] and its caller, carrying a
/// fatal I/O error (a corrupt or truncated decompression stream) if the
/// underlying reader failed mid-sequence. Malformed *lines* never populate
/// this — only a genuine read failure does.
pub type IoErrorHandle = Rc<RefCell<Option<std::io::Error>>>;

/// A lazy, finite sequence of index entries parsed from a line stream.
///
/// Malformed lines (fewer than two `:` delimiters, or a non-numeric seek or
/// article id) are skipped with a `tracing::warn!` diagnostic; they are not
/// fatal to the sequence. `std::io::BufRead::lines()` grows its internal
/// buffer as needed, so lines well beyond the typical 8 KiB default buffer
/// still parse correctly.
///
/// An I/O error from the underlying reader (as opposed to a malformed line)
/// is a different matter: it means the decompression stream itself failed,
/// which SPEC_FULL §7 treats as fatal to the enclosing ingestion operation,
/// not a line to skip. The sequence still ends cleanly at that point (no
/// more entries are produced), but the error is recorded in
/// [`IndexParser::io_error`] so the caller can propagate it as
/// `Error::Decompression` instead of mistaking a truncated stream for a
/// clean end-of-file.
pub struct IndexParser<R> {
    lines: std::io::Lines<R>,
    line_no: usize,
    error: IoErrorHandle,
}

impl<R: BufRead> IndexParser<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_no: 0,
            error: Rc::new(RefCell::new(None)),
        }
    }

    /// A handle to the fatal I/O error slot, clonable before the parser is
    /// moved into iterator adapters (`.take()`, `.filter()`, …) so the
    /// caller can still inspect it once the sequence is exhausted.
    pub fn io_error_handle(&self) -> IoErrorHandle {
        self.error.clone()
    }
}

impl<R: BufRead> Iterator for IndexParser<R> {
    type Item = IndexEntry;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next() {
                Some(Ok(line)) => line,
                Some(Err(err)) => {
                    tracing::warn!("index line {}: I/O error, stopping: {err}", self.line_no + 1);
                    *self.error.borrow_mut() = Some(err);
                    return None;
                }
                None => return None,
            };
            self.line_no += 1;

            match parse_line(&line) {
                Some(entry) => return Some(entry),
                None => {
                    tracing::warn!("index line {}: malformed, skipping", self.line_no);
                    continue;
                }
            }
        }
    }
}

fn parse_line(line: &str) -> Option<IndexEntry> {
    let mut parts = line.splitn(3, ':');
    let seek = parts.next()?;
    let article_id = parts.next()?;
    // The title (third field) may itself contain colons; it is discarded
    // without needing to be present.
    parts.next()?;

    let seek: i64 = seek.parse().ok()?;
    let article_id: i64 = article_id.parse().ok()?;
    Some(IndexEntry { seek, article_id })
}
