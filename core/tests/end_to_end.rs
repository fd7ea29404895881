//! End-to-end scenarios driving the engine the way the CLI and server do:
//! through `Engine::open`, then the ingestion and query operations, against
//! hand-built multistream-shaped fixtures.

use std::io::Write;

use wikisearch_core::config::Config;
use wikisearch_core::error::Error;
use wikisearch_core::Engine;

fn write_bz2_multistream(path: &std::path::Path, chunks: &[&[u8]]) {
    let mut out = Vec::new();
    for chunk in chunks {
        let mut encoder = bzip2::write::BzEncoder::new(Vec::new(), bzip2::Compression::best());
        encoder.write_all(chunk).unwrap();
        out.extend(encoder.finish().unwrap());
    }
    std::fs::write(path, out).unwrap();
}

fn sample_dump(dir: &std::path::Path) -> Config {
    write_bz2_multistream(
        &dir.join("articles-multistream-index.txt.bz2"),
        &[b"0:10:AccessibleComputing\n", b"200:12:Anarchism\n300:25:Albedo\n"],
    );
    write_bz2_multistream(
        &dir.join("articles-multistream.xml.bz2"),
        &[
            br#"<mediawiki><page>
                <title>AccessibleComputing</title>
                <ns>0</ns>
                <id>10</id>
                <redirect title="Computer accessibility" />
                <revision><text>#REDIRECT [[Computer accessibility]]</text></revision>
            </page></mediawiki>"#,
            br#"<mediawiki>
            <page>
                <title>Anarchism</title>
                <ns>0</ns>
                <id>12</id>
                <revision><text>Anarchism is a political philosophy advocating stateless societies.</text></revision>
            </page>
            <page>
                <title>Albedo</title>
                <ns>0</ns>
                <id>25</id>
                <revision><text>Albedo is the diffuse reflectivity of a surface.</text></revision>
            </page>
            <page>
                <title>Talk:Anarchism</title>
                <ns>1</ns>
                <id>13</id>
                <revision><text>discussion, not indexed</text></revision>
            </page>
            </mediawiki>"#,
        ],
    );
    Config::new(dir.to_path_buf(), None, None).unwrap()
}

#[test]
fn fresh_dump_ingests_and_becomes_searchable() {
    let dir = tempfile::tempdir().unwrap();
    let config = sample_dump(dir.path());
    let engine = Engine::open(config).unwrap();

    assert_eq!(engine.load_index(None).unwrap(), 3);
    assert_eq!(engine.process_articles(None).unwrap(), 3);

    let titles = engine.search_titles("stateless", None).unwrap();
    assert_eq!(titles, vec!["Anarchism".to_string()]);
}

#[test]
fn search_prefix_expands_a_partial_title() {
    let dir = tempfile::tempdir().unwrap();
    let config = sample_dump(dir.path());
    let engine = Engine::open(config).unwrap();
    engine.load_index(None).unwrap();
    engine.process_articles(None).unwrap();

    let titles = engine.search_titles("Anarch", Some(5)).unwrap();
    assert!(titles.contains(&"Anarchism".to_string()));
}

#[test]
fn search_on_an_empty_store_returns_an_empty_result() {
    let dir = tempfile::tempdir().unwrap();
    let config = sample_dump(dir.path());
    let engine = Engine::open(config).unwrap();

    let titles = engine.search_titles("python", Some(10)).unwrap();
    assert!(titles.is_empty());
}

#[test]
fn limit_flag_caps_index_entries_loaded() {
    let dir = tempfile::tempdir().unwrap();
    let lines: Vec<String> = (0..100).map(|i| format!("{i}:{i}:Title{i}\n")).collect();
    let joined = lines.concat();
    write_bz2_multistream(&dir.path().join("articles-multistream-index.txt.bz2"), &[joined.as_bytes()]);
    write_bz2_multistream(
        &dir.path().join("articles-multistream.xml.bz2"),
        &[b"<mediawiki></mediawiki>"],
    );
    let config = Config::new(dir.path().to_path_buf(), None, None).unwrap();
    let engine = Engine::open(config).unwrap();

    assert_eq!(engine.load_index(Some(3)).unwrap(), 3);
}

#[test]
fn redirect_pages_are_retained_with_their_target() {
    let dir = tempfile::tempdir().unwrap();
    let config = sample_dump(dir.path());
    let engine = Engine::open(config).unwrap();
    engine.load_index(None).unwrap();
    engine.process_articles(None).unwrap();

    let article = engine.get_article("AccessibleComputing").unwrap();
    assert_eq!(article.redirect_target(), Some("Computer accessibility"));
}

#[test]
fn non_main_namespace_pages_not_in_the_index_are_excluded() {
    let dir = tempfile::tempdir().unwrap();
    let config = sample_dump(dir.path());
    let engine = Engine::open(config).unwrap();
    engine.load_index(None).unwrap();
    engine.process_articles(None).unwrap();

    let err = engine.get_article("Talk:Anarchism").unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[test]
fn title_lookup_is_case_insensitive() {
    let dir = tempfile::tempdir().unwrap();
    let config = sample_dump(dir.path());
    let engine = Engine::open(config).unwrap();
    engine.load_index(None).unwrap();
    engine.process_articles(None).unwrap();

    let article = engine.get_article("albedo").unwrap();
    assert_eq!(article.title, "Albedo");
}

#[test]
fn reopening_the_same_store_preserves_prior_ingestion() {
    let dir = tempfile::tempdir().unwrap();
    let config = sample_dump(dir.path());
    {
        let engine = Engine::open(config.clone()).unwrap();
        engine.load_index(None).unwrap();
        engine.process_articles(None).unwrap();
    }

    let engine = Engine::open(config).unwrap();
    let article = engine.get_article_by_id(12).unwrap();
    assert_eq!(article.title, "Anarchism");
}

#[test]
fn rerunning_the_full_pipeline_yields_identical_content() {
    let dir = tempfile::tempdir().unwrap();
    let config = sample_dump(dir.path());
    let engine = Engine::open(config).unwrap();

    engine.load_index(None).unwrap();
    engine.process_articles(None).unwrap();
    let first = engine.get_article("Anarchism").unwrap();

    engine.load_index(None).unwrap();
    engine.process_articles(None).unwrap();
    let second = engine.get_article("Anarchism").unwrap();

    assert_eq!(first.content, second.content);
}
