//! Base-table DDL for the store. The full-text virtual table and its
//! triggers are handled separately in [`super::fts`], since which
//! generation gets installed is determined at runtime.

use rusqlite::Connection;

use crate::error::Result;

pub(super) fn create_base_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS articles (
            id          INTEGER PRIMARY KEY,
            title       TEXT NOT NULL,
            namespace   INTEGER NOT NULL,
            content     TEXT NOT NULL,
            redirect    TEXT NOT NULL DEFAULT '',
            created_at  INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
        );
        CREATE INDEX IF NOT EXISTS idx_articles_title ON articles(title);
        CREATE INDEX IF NOT EXISTS idx_articles_namespace ON articles(namespace);
        CREATE INDEX IF NOT EXISTS idx_articles_redirect ON articles(redirect);

        CREATE TABLE IF NOT EXISTS index_entries (
            seek        INTEGER NOT NULL,
            article_id  INTEGER NOT NULL,
            PRIMARY KEY (seek, article_id)
        );
        CREATE INDEX IF NOT EXISTS idx_index_entries_seek ON index_entries(seek);
        "#,
    )?;
    Ok(())
}

/// Applies the store's required pragmas: WAL journaling, relaxed fsync,
/// and a bounded page cache (~10 MiB, expressed in KiB as a negative
/// `cache_size` so SQLite interprets it as a byte budget rather than a
/// page count).
pub(super) fn apply_pragmas(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         PRAGMA synchronous = NORMAL;
         PRAGMA cache_size = -10000;",
    )?;
    Ok(())
}
