use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wikisearch_core::config::Config;
use wikisearch_core::Engine;

/// Preprocessing driver: replays a Wikipedia multistream dump into the
/// engine's SQLite store.
#[derive(Parser, Debug)]
#[command(name = "wikisearch-cli")]
#[command(about = "Ingest a Wikipedia multistream dump into the search store")]
#[command(version)]
struct Args {
    /// Directory holding the dump files and the store (env: DUMP_PATH)
    #[arg(long, env = "DUMP_PATH")]
    dump_path: String,

    /// Index filename override (env: INDEX_FILE)
    #[arg(long, env = "INDEX_FILE")]
    index_file: Option<String>,

    /// Articles filename override (env: ARTICLES_FILE)
    #[arg(long, env = "ARTICLES_FILE")]
    articles_file: Option<String>,

    /// Run index ingestion
    #[arg(long)]
    load_index: bool,

    /// Run article ingestion
    #[arg(long)]
    process_articles: bool,

    /// Cap the number of entries processed. A value ≤ 0 means unlimited.
    #[arg(long)]
    limit: Option<i64>,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    if !args.load_index && !args.process_articles {
        anyhow::bail!("nothing to do: pass --load-index and/or --process-articles");
    }

    let config = Config::new(args.dump_path, args.index_file, args.articles_file)
        .context("invalid configuration")?;
    let limit = args.limit.and_then(|n| if n > 0 { Some(n as usize) } else { None });

    let engine = Engine::open(config).context("failed to open store")?;

    if args.load_index {
        tracing::info!("starting load_index (limit: {:?})", limit);
        let count = engine.load_index(limit).context("load_index failed")?;
        tracing::info!("load_index committed {count} entries");
    }

    if args.process_articles {
        tracing::info!("starting process_articles (limit: {:?})", limit);
        let count = engine
            .process_articles(limit)
            .context("process_articles failed")?;
        tracing::info!("process_articles committed {count} articles");
    }

    Ok(())
}
