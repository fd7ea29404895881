//! Configuration for locating the dump directory and its two input files.
//!
//! Default config location: none — this engine is configured entirely
//! through environment variables, per the external interfaces the spec
//! enumerates (`DUMP_PATH`, `INDEX_FILE`, `ARTICLES_FILE`).

use std::path::PathBuf;

use crate::error::{Error, Result};

fn default_index_file() -> &'static str {
    "articles-multistream-index.txt.bz2"
}

fn default_articles_file() -> &'static str {
    "articles-multistream.xml.bz2"
}

/// Resolved configuration for a single dump directory.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the dump files and the `wikipedia.db` store.
    pub dump_path: PathBuf,
    /// Index filename, relative to `dump_path`.
    pub index_file: String,
    /// Articles filename, relative to `dump_path`.
    pub articles_file: String,
}

impl Config {
    /// Load configuration from the environment. `DUMP_PATH` is required;
    /// `INDEX_FILE` and `ARTICLES_FILE` fall back to the documented
    /// defaults.
    pub fn from_env() -> Result<Self> {
        let dump_path = std::env::var("DUMP_PATH")
            .map_err(|_| Error::Configuration("DUMP_PATH is required".into()))?;
        Self::new(
            dump_path,
            std::env::var("INDEX_FILE").ok(),
            std::env::var("ARTICLES_FILE").ok(),
        )
    }

    /// Build a configuration directly, applying defaults for any missing
    /// filename override.
    pub fn new(
        dump_path: impl Into<PathBuf>,
        index_file: Option<String>,
        articles_file: Option<String>,
    ) -> Result<Self> {
        let dump_path = dump_path.into();
        if dump_path.as_os_str().is_empty() {
            return Err(Error::Configuration("DUMP_PATH is required".into()));
        }
        Ok(Self {
            dump_path,
            index_file: index_file.unwrap_or_else(|| default_index_file().to_string()),
            articles_file: articles_file.unwrap_or_else(|| default_articles_file().to_string()),
        })
    }

    pub fn index_path(&self) -> PathBuf {
        self.dump_path.join(&self.index_file)
    }

    pub fn articles_path(&self) -> PathBuf {
        self.dump_path.join(&self.articles_file)
    }

    pub fn store_path(&self) -> PathBuf {
        self.dump_path.join("wikipedia.db")
    }

    /// Fail fast if the dump directory does not exist or is not a
    /// directory, surfacing a single diagnostic per the error design.
    pub fn validate(&self) -> Result<()> {
        if !self.dump_path.is_dir() {
            return Err(Error::Configuration(format!(
                "dump path {} is not a directory",
                self.dump_path.display()
            )));
        }
        Ok(())
    }
}

/// Upper bound on a stored article's `content`, per the data model's
/// truncation rule.
pub(crate) const MAX_CONTENT_BYTES: usize = 10 * 1024 * 1024;

/// Truncates a byte buffer to at most `max_bytes`, walking backward from
/// the cut point to the start of a UTF-8 scalar so the result is always
/// valid UTF-8.
pub(crate) fn truncate_utf8_boundary(bytes: &[u8], max_bytes: usize) -> &[u8] {
    if bytes.len() <= max_bytes {
        return bytes;
    }
    let mut end = max_bytes;
    // UTF-8 continuation bytes have the high bits `10`; walk back to a
    // byte that is not a continuation byte.
    while end > 0 && (bytes[end] & 0b1100_0000) == 0b1000_0000 {
        end -= 1;
    }
    &bytes[..end]
}

/// Truncates article body text to [`MAX_CONTENT_BYTES`], borrowing when no
/// truncation is needed. The cut always lands on a UTF-8 scalar boundary of
/// the (already valid) input, so the owned branch never panics.
pub(crate) fn truncate_content(text: &str) -> std::borrow::Cow<'_, str> {
    let bytes = text.as_bytes();
    if bytes.len() <= MAX_CONTENT_BYTES {
        return std::borrow::Cow::Borrowed(text);
    }
    let truncated = truncate_utf8_boundary(bytes, MAX_CONTENT_BYTES);
    std::borrow::Cow::Owned(std::str::from_utf8(truncated).unwrap().to_string())
}
