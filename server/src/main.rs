use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wikisearch_core::config::Config;
use wikisearch_core::Engine;

mod routes;

#[derive(Parser, Debug)]
#[command(name = "wikisearch-server")]
#[command(about = "Search HTTP surface over an ingested Wikipedia dump")]
#[command(version)]
struct Args {
    /// Host to bind to (env: WIKISEARCH_HOST)
    #[arg(long, default_value = "127.0.0.1", env = "WIKISEARCH_HOST")]
    host: String,

    /// Port to listen on (env: WIKISEARCH_PORT)
    #[arg(short, long, default_value = "8080", env = "WIKISEARCH_PORT")]
    port: u16,

    /// Directory holding the dump files and the store (env: DUMP_PATH)
    #[arg(long, env = "DUMP_PATH")]
    dump_path: String,

    /// Index filename override (env: INDEX_FILE)
    #[arg(long, env = "INDEX_FILE")]
    index_file: Option<String>,

    /// Articles filename override (env: ARTICLES_FILE)
    #[arg(long, env = "ARTICLES_FILE")]
    articles_file: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let config = Config::new(args.dump_path, args.index_file, args.articles_file)
        .context("invalid configuration")?;
    let engine = Arc::new(Engine::open(config).context("failed to open store")?);
    tracing::info!("store opened (full-text mode: {:?})", engine.fts_mode());

    let app = routes::router(engine).layer(tower_http::trace::TraceLayer::new_for_http());

    let addr = format!("{}:{}", args.host, args.port);
    tracing::info!("listening on {addr}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}
