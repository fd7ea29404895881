//! Thin HTTP surface over [`wikisearch_core::Engine`]. Handlers own no
//! business logic: they parse the request, hop onto a blocking task
//! (the engine's store calls block on SQLite I/O), and map the result or
//! error to a JSON response, per the status-code table below.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use wikisearch_core::error::Error;
use wikisearch_core::model::Article;
use wikisearch_core::Engine;

pub fn router(engine: Arc<Engine>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/search", get(search))
        .route("/articles/by-title/:title", get(article_by_title))
        .route("/articles/by-id/:id", get(article_by_id))
        .with_state(engine)
}

async fn health(State(engine): State<Arc<Engine>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "fts_mode": format!("{:?}", engine.fts_mode()),
    }))
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    query: String,
    limit: Option<i64>,
}

#[derive(Debug, Serialize)]
struct SearchResponse {
    query: String,
    results: Vec<String>,
    count: usize,
}

#[derive(Debug, Serialize)]
struct ArticleResponse {
    id: i64,
    title: String,
    namespace: i32,
    content: String,
    redirect: Option<String>,
}

impl From<Article> for ArticleResponse {
    fn from(article: Article) -> Self {
        Self {
            id: article.id,
            title: article.title,
            namespace: article.namespace,
            content: article.content,
            redirect: article.redirect_target().map(str::to_string),
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

async fn search(
    State(engine): State<Arc<Engine>>,
    Query(params): Query<SearchParams>,
) -> Response {
    if params.query.trim().is_empty() {
        return error_response(Error::InvalidInput("query must not be empty".into()));
    }

    let query = params.query.clone();
    let outcome = tokio::task::spawn_blocking(move || engine.search_titles(&params.query, params.limit))
        .await
        .expect("search_titles task panicked");

    match outcome {
        Ok(results) => {
            let count = results.len();
            (
                StatusCode::OK,
                Json(SearchResponse {
                    query,
                    results,
                    count,
                }),
            )
                .into_response()
        }
        Err(err) => error_response(err),
    }
}

async fn article_by_title(State(engine): State<Arc<Engine>>, Path(title): Path<String>) -> Response {
    let outcome = tokio::task::spawn_blocking(move || engine.get_article(&title))
        .await
        .expect("get_article task panicked");

    match outcome {
        Ok(article) => (StatusCode::OK, Json(ArticleResponse::from(article))).into_response(),
        Err(err) => error_response(err),
    }
}

async fn article_by_id(State(engine): State<Arc<Engine>>, Path(id): Path<i64>) -> Response {
    let outcome = tokio::task::spawn_blocking(move || engine.get_article_by_id(id))
        .await
        .expect("get_article_by_id task panicked");

    match outcome {
        Ok(article) => (StatusCode::OK, Json(ArticleResponse::from(article))).into_response(),
        Err(err) => error_response(err),
    }
}

fn error_response(err: Error) -> Response {
    let status = match &err {
        Error::NotFound(_) => StatusCode::NOT_FOUND,
        Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
        Error::Store(_) | Error::Capability(_) => StatusCode::SERVICE_UNAVAILABLE,
        Error::Configuration(_) | Error::Decompression { .. } | Error::Decode(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
        .into_response()
}
