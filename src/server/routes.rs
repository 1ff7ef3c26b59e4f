//! Route handlers and server loop

use std::net::SocketAddr;

use anyhow::{Context, Result};
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        DefaultBodyLimit, Path, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tracing::{error, info, warn};

use crate::core::api::{
    ErrorResponse, IndexRequest, IndexResponse, QueryRequest, QueryResponse, StatusResponse,
};
use crate::core::config::ServerConfig;
use crate::core::document::DocumentRecord;
use crate::core::error::SearchError;
use crate::search::SearchEngine;

/// Handler error, rendered as `{"detail": ...}`
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    fn page_not_found() -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            detail: "Page not found".to_string(),
        }
    }
}

impl From<SearchError> for ApiError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::NotFound(_) => Self::page_not_found(),
            SearchError::DimensionMismatch { .. } => {
                error!(error = %err, "embedding has unexpected dimension");
                Self {
                    status: StatusCode::BAD_GATEWAY,
                    detail: err.to_string(),
                }
            }
            SearchError::EmbeddingUnavailable(_) => Self {
                status: StatusCode::SERVICE_UNAVAILABLE,
                detail: err.to_string(),
            },
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self {
            status: rejection.status(),
            detail: rejection.body_text(),
        }
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self {
            status: rejection.status(),
            detail: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorResponse { detail: self.detail })).into_response()
    }
}

/// Router over `engine`
///
/// Page bodies are not size-limited: whole-page text from the extension is
/// passed to the embedding service as is.
pub fn router(engine: SearchEngine) -> Router {
    Router::new()
        .route("/index", post(index_page))
        .route("/query", post(query_pages))
        .route("/report/{id}", get(report_page))
        .route("/status", get(status))
        .layer(DefaultBodyLimit::disable())
        .with_state(engine)
}

async fn index_page(
    State(engine): State<SearchEngine>,
    page: Result<Json<IndexRequest>, JsonRejection>,
) -> Result<Json<IndexResponse>, ApiError> {
    let Json(page) = page?;
    let id = engine.index(&page.url, &page.text).await?;
    Ok(Json(IndexResponse::success(id)))
}

async fn query_pages(
    State(engine): State<SearchEngine>,
    request: Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Json<QueryResponse>, ApiError> {
    let Json(request) = request?;
    let results = engine.query(&request.query, request.limit()).await?;
    info!(returned = results.len(), "answered query");
    Ok(Json(QueryResponse { results }))
}

async fn report_page(
    State(engine): State<SearchEngine>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<DocumentRecord>, ApiError> {
    let Path(id) = id?;
    let slot = usize::try_from(id).map_err(|_| ApiError::page_not_found())?;
    Ok(Json(engine.report(slot)?))
}

async fn status(State(engine): State<SearchEngine>) -> Json<StatusResponse> {
    let stats = engine.stats();
    let embedder = engine.embedder();
    Json(StatusResponse {
        documents: stats.documents,
        dimension: stats.dimension,
        model: embedder.model().to_string(),
        on_embedding_failure: embedder.policy(),
        last_indexed: stats.last_indexed,
    })
}

/// Serve `engine` on the configured address until Ctrl-C.
pub async fn run_server(engine: SearchEngine, config: &ServerConfig) -> Result<()> {
    let addrs: Vec<SocketAddr> = tokio::net::lookup_host((config.host.as_str(), config.port))
        .await
        .with_context(|| format!("Invalid bind address {}:{}", config.host, config.port))?
        .collect();
    let bind_addr = addrs
        .first()
        .copied()
        .with_context(|| format!("No address found for {}", config.host))?;

    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("Failed to bind {bind_addr}"))?;

    info!(
        address = %bind_addr,
        dimension = engine.stats().dimension,
        model = engine.embedder().model(),
        on_embedding_failure = %engine.embedder().policy(),
        "pagesearch server listening"
    );

    axum::serve(listener, router(engine))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("pagesearch server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}
