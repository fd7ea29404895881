//! The read-side operations the engine exposes: `search_titles`,
//! `get_article`, and `get_article_by_id`. This is the one place that
//! knows about the full-text capability ladder; the store just executes
//! whichever query its current mode supports.

use crate::error::{Error, Result};
use crate::model::Article;
use crate::store::{FtsMode, Store};

/// Default and maximum result count applied when the caller omits a limit
/// or supplies one that is not positive.
const DEFAULT_SEARCH_LIMIT: i64 = 20;

/// Normalizes a caller-supplied limit: `None` or any value `<= 0` becomes
/// the default of 20, matching the external `search` interface's contract.
fn normalize_limit(limit: Option<i64>) -> i64 {
    match limit {
        Some(n) if n > 0 => n,
        _ => DEFAULT_SEARCH_LIMIT,
    }
}

/// Searches article titles and content for `query`, preferring full text
/// search and falling back to a substring scan when no full-text
/// generation is installed, or when the installed generation errors at
/// query time (a shadow table desync, for instance) — in which case the
/// capability is demoted for the remainder of the process.
///
/// An empty or all-whitespace query is not an error here: rejecting it is
/// the external interface's job, so the core simply reports a well-defined
/// empty result.
pub fn search_titles(store: &Store, query: &str, limit: Option<i64>) -> Result<Vec<String>> {
    if query.trim().is_empty() {
        return Ok(Vec::new());
    }
    let limit = normalize_limit(limit);

    if store.fts_mode() == FtsMode::None {
        return store.search_like(query, limit);
    }

    let expr = prefix_expand(query);
    match store.search_fts(&expr, limit) {
        Ok(titles) => Ok(titles),
        Err(err) => {
            tracing::warn!("full-text search failed, demoting to substring scan: {err}");
            store.demote(FtsMode::None);
            store.search_like(query, limit)
        }
    }
}

/// Builds an FTS match expression from user input: embedded `"` and `'` are
/// doubled, and the whole query is wrapped as a quoted phrase with a
/// trailing `*` so the last term prefix-matches (`anarch` finds
/// `anarchism`).
fn prefix_expand(query: &str) -> String {
    let escaped = query.replace('"', "\"\"").replace('\'', "''");
    format!("\"{escaped}\"*")
}

/// Looks up an article by title, retrying case-insensitively (and then
/// with the title's first letter uppercased, matching MediaWiki's
/// convention that article titles are stored with an initial capital) if
/// the exact lookup misses.
pub fn get_article(store: &Store, title: &str) -> Result<Article> {
    if title.trim().is_empty() {
        return Err(Error::InvalidInput("title must not be empty".into()));
    }

    if let Some(article) = store.find_article_by_title_exact(title)? {
        return Ok(article);
    }

    let title_case = capitalize_first(title);
    if title_case != title {
        if let Some(article) = store.find_article_by_title_exact(&title_case)? {
            return Ok(article);
        }
    }

    if let Some(article) = store.find_article_by_title_ci(title)? {
        return Ok(article);
    }

    Err(Error::NotFound(format!("no article titled {title:?}")))
}

pub fn get_article_by_id(store: &Store, id: i64) -> Result<Article> {
    store
        .find_article_by_id(id)?
        .ok_or_else(|| Error::NotFound(format!("no article with id {id}")))
}

fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn store_with_article() -> (tempfile::TempDir, Store) {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path().join("wikipedia.db")).unwrap();
        let batch = store.begin_batch().unwrap();
        batch
            .upsert_article(1, "Anarchism", 0, "a political philosophy", None)
            .unwrap();
        batch.commit().unwrap();
        (dir, store)
    }

    #[test]
    fn exact_title_lookup_succeeds() {
        let (_dir, store) = store_with_article();
        let article = get_article(&store, "Anarchism").unwrap();
        assert_eq!(article.id, 1);
    }

    #[test]
    fn lowercase_title_falls_back_to_title_case_then_case_insensitive() {
        let (_dir, store) = store_with_article();
        let article = get_article(&store, "anarchism").unwrap();
        assert_eq!(article.title, "Anarchism");
    }

    #[test]
    fn missing_title_is_not_found() {
        let (_dir, store) = store_with_article();
        let err = get_article(&store, "Does Not Exist").unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn missing_id_is_not_found() {
        let (_dir, store) = store_with_article();
        let err = get_article_by_id(&store, 999).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn empty_query_returns_empty_result() {
        let (_dir, store) = store_with_article();
        let titles = search_titles(&store, "   ", None).unwrap();
        assert!(titles.is_empty());
    }

    #[test]
    fn search_finds_article_by_content() {
        let (_dir, store) = store_with_article();
        let titles = search_titles(&store, "philosophy", None).unwrap();
        assert_eq!(titles, vec!["Anarchism".to_string()]);
    }

    #[test]
    fn search_prefix_expands_the_last_term() {
        let (_dir, store) = store_with_article();
        // "Anarch" is not a full token in the index; only prefix expansion
        // makes this match "Anarchism".
        let titles = search_titles(&store, "Anarch", None).unwrap();
        assert_eq!(titles, vec!["Anarchism".to_string()]);
    }

    #[test]
    fn prefix_expand_doubles_embedded_quotes() {
        assert_eq!(prefix_expand(r#"foo"bar"#), r#""foo""bar"*"#);
        assert_eq!(prefix_expand("foo'bar"), "\"foo''bar\"*");
    }

    #[test]
    fn non_positive_limit_normalizes_to_default() {
        assert_eq!(normalize_limit(Some(0)), DEFAULT_SEARCH_LIMIT);
        assert_eq!(normalize_limit(Some(-5)), DEFAULT_SEARCH_LIMIT);
        assert_eq!(normalize_limit(None), DEFAULT_SEARCH_LIMIT);
        assert_eq!(normalize_limit(Some(7)), 7);
    }

    #[test]
    fn search_against_empty_store_returns_empty_result() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path().join("wikipedia.db")).unwrap();
        let titles = search_titles(&store, "python", Some(10)).unwrap();
        assert!(titles.is_empty());
    }

    proptest! {
        #[test]
        fn capitalize_first_uppercases_only_the_first_ascii_letter(s in "[a-zA-Z0-9 ]{0,40}") {
            let out = capitalize_first(&s);
            prop_assert_eq!(out.len(), s.len());
            if let Some(first) = s.chars().next() {
                prop_assert_eq!(out.chars().next().unwrap(), first.to_ascii_uppercase());
                prop_assert_eq!(&out[first.len_utf8()..], &s[first.len_utf8()..]);
            } else {
                prop_assert!(out.is_empty());
            }
        }

        #[test]
        fn capitalize_first_is_idempotent(s in "[a-zA-Z0-9 ]{0,40}") {
            let once = capitalize_first(&s);
            let twice = capitalize_first(&once);
            prop_assert_eq!(once, twice);
        }
    }
}
