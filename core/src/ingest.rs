//! Drives the two preprocessing passes the engine exposes: `load_index`,
//! which replays the seek index into `index_entries`, and
//! `process_articles`, which replays the article XML into `articles`,
//! keeping only pages whose id is present in the index and whose
//! namespace is the main namespace (0) or that are redirects.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::config::Config;
use crate::decompress;
use crate::error::Result;
use crate::index_parser::IndexParser;
use crate::store::Store;
use crate::xml_decoder::PageDecoder;

/// Index entries committed per transaction during `load_index`.
const LOAD_INDEX_BATCH_SIZE: usize = 10_000;

/// Articles committed per transaction during `process_articles`.
const PROCESS_ARTICLES_BATCH_SIZE: usize = 1_000;

/// A cooperative cancellation flag checked at batch boundaries. Ingestion
/// only stops between batches, never mid-batch, so a cancelled run never
/// leaves a half-written transaction committed.
pub type CancelToken = Arc<AtomicBool>;

pub fn new_cancel_token() -> CancelToken {
    Arc::new(AtomicBool::new(false))
}

/// Replays the seek index file into `index_entries`.
///
/// `limit` caps the number of entries consumed from the source, not the
/// number of rows written (duplicate `(seek, article_id)` pairs are
/// ignored by the store, not counted twice against the limit).
pub fn load_index(config: &Config, store: &Store, limit: Option<usize>, cancel: &CancelToken) -> Result<usize> {
    let reader = decompress::open(config.index_path())?;
    let parser = IndexParser::new(reader);
    let error_handle = parser.io_error_handle();

    let total = match limit {
        Some(limit) => run_batches(store, parser.take(limit), cancel, LOAD_INDEX_BATCH_SIZE, |batch, entry| {
            batch.insert_index_entry(entry.seek, entry.article_id)
        })?,
        None => run_batches(store, parser, cancel, LOAD_INDEX_BATCH_SIZE, |batch, entry| {
            batch.insert_index_entry(entry.seek, entry.article_id)
        })?,
    };

    if let Some(err) = error_handle.borrow_mut().take() {
        return Err(decompress::wrap_io_error(&config.index_path(), err));
    }

    tracing::info!("load_index: committed {total} index entries");
    Ok(total)
}

/// Replays the article XML into `articles`, keeping only pages in the main
/// namespace (`ns == 0`) whose id is present in the previously loaded
/// index; redirects are retained when they meet that same namespace/
/// membership test, not as a separate exception. `load_index` must run
/// first for the membership filter to have anything to check against.
pub fn process_articles(
    config: &Config,
    store: &Store,
    limit: Option<usize>,
    cancel: &CancelToken,
) -> Result<usize> {
    let indexed_ids = store.distinct_article_ids_from_index()?;
    let reader = decompress::open(config.articles_path())?;
    let decoder = PageDecoder::new(reader);
    let error_handle = decoder.error_handle();

    let relevant =
        decoder.filter(move |page| page.ns == 0 && indexed_ids.contains(&page.id));

    let write = |batch: &crate::store::Batch, page: crate::model::Page| {
        let content = crate::config::truncate_content(&page.text);
        batch.upsert_article(
            page.id,
            &page.title,
            page.ns,
            &content,
            page.redirect.as_deref(),
        )
    };
    let total = match limit {
        Some(limit) => run_batches(store, relevant.take(limit), cancel, PROCESS_ARTICLES_BATCH_SIZE, write)?,
        None => run_batches(store, relevant, cancel, PROCESS_ARTICLES_BATCH_SIZE, write)?,
    };

    if let Some(err) = error_handle.borrow_mut().take() {
        return Err(decompress::wrap_io_error(&config.articles_path(), err));
    }

    tracing::info!("process_articles: committed {total} articles");
    Ok(total)
}

/// Drains `items` into commits of at most `batch_size`, checking `cancel`
/// between batches and rolling back (via `Batch`'s `Drop`) the batch in
/// flight at the moment cancellation is observed.
fn run_batches<I, T>(
    store: &Store,
    items: I,
    cancel: &CancelToken,
    batch_size: usize,
    mut write: impl FnMut(&crate::store::Batch, T) -> Result<()>,
) -> Result<usize>
where
    I: IntoIterator<Item = T>,
{
    let mut total = 0usize;
    let mut iter = items.into_iter().peekable();

    while iter.peek().is_some() {
        if cancel.load(Ordering::Relaxed) {
            tracing::info!("ingestion cancelled after {total} rows");
            break;
        }

        let batch = store.begin_batch()?;
        let mut in_batch = 0usize;
        while in_batch < batch_size {
            let Some(item) = iter.next() else { break };
            write(&batch, item)?;
            in_batch += 1;
        }
        batch.commit()?;
        total += in_batch;
    }

    Ok(total)
}
