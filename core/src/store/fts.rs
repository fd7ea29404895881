//! Detects, at `open`, whether the full-text generation-5 module, the
//! older generation-4 module, or neither is available, installs the
//! matching virtual table and synchronization triggers, and exposes the
//! resulting mode so the query façade can build the right kind of query
//! (or skip straight to a substring scan).

use rusqlite::Connection;

/// Which full-text generation (if any) backs `articles_fts`.
///
/// Demotion from `Fts5`/`Fts4` to `None` at query time is modeled as a
/// plain assignment to the `RwLock<FtsMode>` the [`super::Store`] holds; it
/// is process-local and sticky for the remainder of the process, per the
/// mode-transition rule in the capability manager's contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FtsMode {
    Fts5,
    Fts4,
    None,
}

/// Runs once during `open`, after the base tables exist. Returns the
/// resulting mode; never fails the calling `open` — capability loss is not
/// fatal, it only narrows which query strategy is available.
pub(super) fn ensure_installed(conn: &Connection) -> FtsMode {
    if let Some(existing_sql) = existing_fts_ddl(conn) {
        return classify(&existing_sql);
    }

    if try_create_fts5(conn).is_ok() {
        tracing::info!("full-text index: installed generation 5 (fts5)");
        return FtsMode::Fts5;
    }
    tracing::warn!("full-text index: generation 5 (fts5) unavailable, trying generation 4");

    if try_create_fts4(conn).is_ok() {
        tracing::info!("full-text index: installed generation 4 (fts4)");
        return FtsMode::Fts4;
    }
    tracing::warn!("full-text index: generation 4 (fts4) unavailable, falling back to LIKE scans");

    FtsMode::None
}

fn existing_fts_ddl(conn: &Connection) -> Option<String> {
    conn.query_row(
        "SELECT sql FROM sqlite_master WHERE type = 'table' AND name = 'articles_fts'",
        [],
        |row| row.get::<_, String>(0),
    )
    .ok()
}

fn classify(ddl: &str) -> FtsMode {
    let lower = ddl.to_ascii_lowercase();
    if lower.contains("fts5") {
        FtsMode::Fts5
    } else if lower.contains("fts4") {
        FtsMode::Fts4
    } else {
        tracing::warn!("articles_fts exists but is not a recognized fts4/fts5 module, treating as absent");
        FtsMode::None
    }
}

fn try_create_fts5(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE VIRTUAL TABLE articles_fts USING fts5(
            title, content,
            content = 'articles',
            content_rowid = 'id'
        );

        CREATE TRIGGER articles_fts_ai AFTER INSERT ON articles BEGIN
            INSERT INTO articles_fts(rowid, title, content) VALUES (new.id, new.title, new.content);
        END;

        CREATE TRIGGER articles_fts_ad AFTER DELETE ON articles BEGIN
            INSERT INTO articles_fts(articles_fts, rowid, title, content)
                VALUES ('delete', old.id, old.title, old.content);
        END;

        CREATE TRIGGER articles_fts_au AFTER UPDATE ON articles BEGIN
            INSERT INTO articles_fts(articles_fts, rowid, title, content)
                VALUES ('delete', old.id, old.title, old.content);
            INSERT INTO articles_fts(rowid, title, content) VALUES (new.id, new.title, new.content);
        END;
        "#,
    )
}

fn try_create_fts4(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE VIRTUAL TABLE articles_fts USING fts4(title, content, content="articles");

        CREATE TRIGGER articles_fts_ai AFTER INSERT ON articles BEGIN
            INSERT INTO articles_fts(docid, title, content) VALUES (new.id, new.title, new.content);
        END;

        CREATE TRIGGER articles_fts_ad AFTER DELETE ON articles BEGIN
            DELETE FROM articles_fts WHERE docid = old.id;
        END;

        CREATE TRIGGER articles_fts_au AFTER UPDATE ON articles BEGIN
            DELETE FROM articles_fts WHERE docid = old.id;
            INSERT INTO articles_fts(docid, title, content) VALUES (new.id, new.title, new.content);
        END;
        "#,
    )
}
