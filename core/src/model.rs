//! Data model shared across the store, the decoder, and the query façade.

use chrono::{DateTime, Utc};

/// A single article as persisted in the `articles` table.
#[derive(Debug, Clone, PartialEq)]
pub struct Article {
    pub id: i64,
    pub title: String,
    pub namespace: i32,
    pub content: String,
    /// Empty string denotes "not a redirect"; callers should treat that as
    /// `None` via [`Article::redirect_target`].
    pub redirect: String,
    pub created_at: DateTime<Utc>,
}

impl Article {
    pub fn redirect_target(&self) -> Option<&str> {
        if self.redirect.is_empty() {
            None
        } else {
            Some(self.redirect.as_str())
        }
    }
}

/// An `(seek, article_id)` pair from the index file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexEntry {
    pub seek: i64,
    pub article_id: i64,
}

/// A decoded `<page>` element from the article XML stream, before any
/// namespace or index-membership filtering is applied.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Page {
    pub title: String,
    pub ns: i32,
    pub id: i64,
    /// The first `<redirect title="…"/>` target seen, if any.
    pub redirect: Option<String>,
    /// Body text of the first `<revision><text>`.
    pub text: String,
}
