//! HTTP client for a running pagesearch server

use std::time::Duration;

use anyhow::{bail, Context, Result};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;

use pagesearch::core::api::{
    ErrorResponse, IndexRequest, IndexResponse, QueryRequest, QueryResponse, StatusResponse,
};
use pagesearch::DocumentRecord;

/// Per-request timeout. Indexing waits on the server's embedding call, so
/// this is well above the embedding client's own timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn index(&self, url: &str, text: &str) -> Result<IndexResponse> {
        let request = IndexRequest {
            url: url.to_string(),
            text: text.to_string(),
        };
        let response = self
            .http
            .post(format!("{}/index", self.base_url))
            .json(&request)
            .send()
            .await
            .with_context(|| self.unreachable())?;
        decode(response).await
    }

    pub async fn query(&self, query: &str, top_k: Option<usize>) -> Result<QueryResponse> {
        let request = QueryRequest {
            query: query.to_string(),
            top_k,
        };
        let response = self
            .http
            .post(format!("{}/query", self.base_url))
            .json(&request)
            .send()
            .await
            .with_context(|| self.unreachable())?;
        decode(response).await
    }

    /// `None` when the server has no page with this id.
    pub async fn report(&self, id: i64) -> Result<Option<DocumentRecord>> {
        let response = self
            .http
            .get(format!("{}/report/{}", self.base_url, id))
            .send()
            .await
            .with_context(|| self.unreachable())?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        decode(response).await.map(Some)
    }

    pub async fn status(&self) -> Result<StatusResponse> {
        let response = self
            .http
            .get(format!("{}/status", self.base_url))
            .send()
            .await
            .with_context(|| self.unreachable())?;
        decode(response).await
    }

    fn unreachable(&self) -> String {
        format!("Failed to reach pagesearch server at {}", self.base_url)
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let detail = response
            .json::<ErrorResponse>()
            .await
            .map(|e| e.detail)
            .unwrap_or_else(|_| "no details".to_string());
        bail!("Server returned {}: {}", status, detail);
    }

    response
        .json::<T>()
        .await
        .context("Failed to parse server response")
}
