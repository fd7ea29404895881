use std::path::PathBuf;

/// The error taxonomy for the ingestion and retrieval engine.
///
/// Each variant corresponds to one of the categories in the error handling
/// design: configuration, decompression, decode, store, capability,
/// not-found, and invalid-input errors.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required setting was missing, or a configured path could not be
    /// used. Fatal.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The bzip2 stream was malformed. Fatal to the enclosing operation;
    /// batches committed before the failure remain persisted.
    #[error("decompression failed reading {path}: {source}")]
    Decompression {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A single record (index line or XML page) could not be decoded.
    /// Recoverable: the caller logs and skips it.
    #[error("decode error: {0}")]
    Decode(String),

    /// The store could not be opened, migrated, or committed to.
    #[error("store error: {0}")]
    Store(String),

    /// Neither FTS5 nor FTS4 could be installed. Not fatal: the engine
    /// demotes to substring search.
    #[error("full-text capability unavailable: {0}")]
    Capability(String),

    /// A query by title or id found nothing.
    #[error("not found: {0}")]
    NotFound(String),

    /// A caller-supplied argument was missing or unparseable.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Store(err.to_string())
    }
}

impl From<r2d2::Error> for Error {
    fn from(err: r2d2::Error) -> Self {
        Error::Store(format!("connection pool exhausted: {err}"))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
