//! Ingestion and retrieval engine for compressed Wikipedia multistream
//! dumps: decompresses the two dump files, replays them into a SQLite
//! store with full-text indexing, and serves title and id lookups plus
//! full-text search over the result.
//!
//! The crate is a library; [`cli`](../cli) drives the ingestion passes
//! and [`server`](../server) exposes the read side over HTTP. The engine
//! itself has no async runtime dependency — every operation here runs to
//! completion on the calling thread, and concurrency is the caller's
//! concern (the store's connection pool is what makes concurrent callers
//! safe).

pub mod config;
pub mod decompress;
pub mod error;
pub mod index_parser;
pub mod ingest;
pub mod model;
pub mod query;
pub mod store;
pub mod xml_decoder;

use config::Config;
use error::Result;
use ingest::CancelToken;
use model::Article;
use store::Store;

/// A handle bundling the resolved configuration, the open store, and a
/// cancellation token shared by any ingestion call made through it.
pub struct Engine {
    config: Config,
    store: Store,
    cancel: CancelToken,
}

impl Engine {
    /// Validates the configured dump directory, opens (or creates) the
    /// store at `<dump_path>/wikipedia.db`, and runs the full-text
    /// capability probe.
    pub fn open(config: Config) -> Result<Self> {
        config.validate()?;
        let store = Store::open(config.store_path())?;
        Ok(Self {
            config,
            store,
            cancel: ingest::new_cancel_token(),
        })
    }

    /// Signals any ingestion call currently in progress to stop at the
    /// next batch boundary. Subsequent calls on this engine are
    /// unaffected — the token is not reset automatically.
    pub fn cancel(&self) {
        self.cancel
            .store(true, std::sync::atomic::Ordering::Relaxed);
    }

    pub fn reset_cancellation(&self) {
        self.cancel
            .store(false, std::sync::atomic::Ordering::Relaxed);
    }

    pub fn load_index(&self, limit: Option<usize>) -> Result<usize> {
        ingest::load_index(&self.config, &self.store, limit, &self.cancel)
    }

    pub fn process_articles(&self, limit: Option<usize>) -> Result<usize> {
        ingest::process_articles(&self.config, &self.store, limit, &self.cancel)
    }

    /// `limit` caps the returned title count; `None` or any non-positive
    /// value normalizes to the default of 20, per the external `search`
    /// interface's contract.
    pub fn search_titles(&self, query: &str, limit: Option<i64>) -> Result<Vec<String>> {
        query::search_titles(&self.store, query, limit)
    }

    pub fn get_article(&self, title: &str) -> Result<Article> {
        query::get_article(&self.store, title)
    }

    pub fn get_article_by_id(&self, id: i64) -> Result<Article> {
        query::get_article_by_id(&self.store, id)
    }

    pub fn fts_mode(&self) -> store::FtsMode {
        self.store.fts_mode()
    }
}
