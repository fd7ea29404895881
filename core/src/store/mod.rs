//! A pooled SQLite handle over `wikipedia.db`: a base `articles` table, an
//! `index_entries` table mirroring the multistream index file, and (per
//! [`fts`]) whichever full-text generation the running SQLite build
//! supports. Readers borrow pooled connections independently; writers go
//! through [`Store::begin_batch`], which holds one pooled connection for
//! the lifetime of the transaction.

mod fts;
mod schema;

use std::path::Path;

use parking_lot::RwLock;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::OptionalExtension;

use crate::error::{Error, Result};
use crate::model::Article;

pub use fts::FtsMode;

pub struct Store {
    pool: r2d2::Pool<SqliteConnectionManager>,
    mode: RwLock<FtsMode>,
}

impl Store {
    /// Opens (creating if necessary) the store at `path`, applies pragmas,
    /// creates the base tables, and runs the full-text capability probe.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let manager = SqliteConnectionManager::file(path.as_ref());
        let pool = r2d2::Pool::builder()
            .build(manager)
            .map_err(|err| Error::Store(format!("failed to build connection pool: {err}")))?;

        let conn = pool.get()?;
        schema::apply_pragmas(&conn)?;
        schema::create_base_tables(&conn)?;
        let mode = fts::ensure_installed(&conn);
        drop(conn);

        Ok(Self {
            pool,
            mode: RwLock::new(mode),
        })
    }

    pub fn fts_mode(&self) -> FtsMode {
        *self.mode.read()
    }

    /// Demotes the capability permanently for the life of this `Store`.
    /// Called by the query façade when a search against the current mode
    /// fails at runtime (e.g. a corrupted shadow table).
    pub(crate) fn demote(&self, to: FtsMode) {
        let mut guard = self.mode.write();
        tracing::warn!("demoting full-text capability from {:?} to {:?}", *guard, to);
        *guard = to;
    }

    /// Opens a write transaction. Dropping the returned [`Batch`] without
    /// calling [`Batch::commit`] rolls it back, so a cancelled or failed
    /// ingestion run leaves no partial batch behind.
    pub fn begin_batch(&self) -> Result<Batch> {
        let conn = self.pool.get()?;
        conn.execute_batch("BEGIN")?;
        Ok(Batch {
            conn,
            committed: false,
        })
    }

    pub fn distinct_article_ids_from_index(&self) -> Result<std::collections::HashSet<i64>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare("SELECT DISTINCT article_id FROM index_entries")?;
        let ids = stmt
            .query_map([], |row| row.get::<_, i64>(0))?
            .collect::<std::result::Result<_, _>>()?;
        Ok(ids)
    }

    pub fn find_article_by_title_exact(&self, title: &str) -> Result<Option<Article>> {
        let conn = self.pool.get()?;
        conn.query_row(
            "SELECT id, title, namespace, content, redirect, created_at \
             FROM articles WHERE title = ?1 LIMIT 1",
            [title],
            row_to_article,
        )
        .optional()
        .map_err(Error::from)
    }

    pub fn find_article_by_title_ci(&self, title: &str) -> Result<Option<Article>> {
        let conn = self.pool.get()?;
        conn.query_row(
            "SELECT id, title, namespace, content, redirect, created_at \
             FROM articles WHERE LOWER(title) = LOWER(?1) LIMIT 1",
            [title],
            row_to_article,
        )
        .optional()
        .map_err(Error::from)
    }

    pub fn find_article_by_id(&self, id: i64) -> Result<Option<Article>> {
        let conn = self.pool.get()?;
        conn.query_row(
            "SELECT id, title, namespace, content, redirect, created_at \
             FROM articles WHERE id = ?1",
            [id],
            row_to_article,
        )
        .optional()
        .map_err(Error::from)
    }

    /// Full-text search via whichever generation is currently active.
    /// Returns `Err(Error::Capability)` if the mode is [`FtsMode::None`];
    /// callers should fall back to [`Store::search_like`] in that case.
    pub fn search_fts(&self, query: &str, limit: i64) -> Result<Vec<String>> {
        match self.fts_mode() {
            FtsMode::Fts5 => self.search_fts5(query, limit),
            FtsMode::Fts4 => self.search_fts4(query, limit),
            FtsMode::None => Err(Error::Capability(
                "no full-text generation is installed".into(),
            )),
        }
    }

    fn search_fts5(&self, query: &str, limit: i64) -> Result<Vec<String>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT DISTINCT a.title FROM articles_fts f \
             JOIN articles a ON a.id = f.rowid \
             WHERE articles_fts MATCH ?1 ORDER BY f.rank LIMIT ?2",
        )?;
        let titles = stmt
            .query_map(rusqlite::params![query, limit], |row| {
                row.get::<_, String>(0)
            })?
            .collect::<std::result::Result<_, _>>()?;
        Ok(titles)
    }

    fn search_fts4(&self, query: &str, limit: i64) -> Result<Vec<String>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT DISTINCT a.title FROM articles_fts f \
             JOIN articles a ON a.id = f.docid \
             WHERE articles_fts MATCH ?1 LIMIT ?2",
        )?;
        let titles = stmt
            .query_map(rusqlite::params![query, limit], |row| {
                row.get::<_, String>(0)
            })?
            .collect::<std::result::Result<_, _>>()?;
        Ok(titles)
    }

    /// Substring fallback used when no full-text generation is installed.
    pub fn search_like(&self, query: &str, limit: i64) -> Result<Vec<String>> {
        let conn = self.pool.get()?;
        let pattern = format!("%{}%", query.replace('%', "\\%").replace('_', "\\_"));
        let mut stmt = conn.prepare(
            "SELECT DISTINCT title FROM articles \
             WHERE title LIKE ?1 ESCAPE '\\' ORDER BY title LIMIT ?2",
        )?;
        let titles = stmt
            .query_map(rusqlite::params![pattern, limit], |row| {
                row.get::<_, String>(0)
            })?
            .collect::<std::result::Result<_, _>>()?;
        Ok(titles)
    }
}

fn row_to_article(row: &rusqlite::Row) -> rusqlite::Result<Article> {
    let created_at_ts: i64 = row.get(5)?;
    Ok(Article {
        id: row.get(0)?,
        title: row.get(1)?,
        namespace: row.get(2)?,
        content: row.get(3)?,
        redirect: row.get(4)?,
        created_at: chrono::DateTime::from_timestamp(created_at_ts, 0)
            .expect("created_at is always written as a valid unix timestamp"),
    })
}

/// An open write transaction. Writes are flushed to the database on
/// [`Batch::commit`]; dropping without committing rolls the transaction
/// back, which is how a cancelled ingestion run discards its in-flight
/// batch.
pub struct Batch {
    conn: r2d2::PooledConnection<SqliteConnectionManager>,
    committed: bool,
}

impl Batch {
    pub fn upsert_article(
        &self,
        id: i64,
        title: &str,
        namespace: i32,
        content: &str,
        redirect: Option<&str>,
    ) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO articles (id, title, namespace, content, redirect) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![id, title, namespace, content, redirect.unwrap_or("")],
        )?;
        Ok(())
    }

    pub fn insert_index_entry(&self, seek: i64, article_id: i64) -> Result<()> {
        self.conn.execute(
            "INSERT OR IGNORE INTO index_entries (seek, article_id) VALUES (?1, ?2)",
            rusqlite::params![seek, article_id],
        )?;
        Ok(())
    }

    pub fn commit(mut self) -> Result<()> {
        self.conn.execute_batch("COMMIT")?;
        self.committed = true;
        Ok(())
    }
}

impl Drop for Batch {
    fn drop(&mut self) {
        if !self.committed {
            if let Err(err) = self.conn.execute_batch("ROLLBACK") {
                tracing::warn!("failed to roll back abandoned batch: {err}");
            }
        }
    }
}
