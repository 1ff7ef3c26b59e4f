//! Request and response bodies of the HTTP surface, shared by the server
//! and the CLI client commands.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::config::FailurePolicy;
use super::document::{DocumentRecord, Slot};

pub const DEFAULT_TOP_K: usize = 3;
pub const MAX_TOP_K: usize = 100;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexRequest {
    pub url: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexResponse {
    pub status: String,
    pub id: Slot,
}

impl IndexResponse {
    pub fn success(id: Slot) -> Self {
        Self {
            status: "success".to_string(),
            id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_k: Option<usize>,
}

impl QueryRequest {
    /// Requested result count, defaulted and capped at `MAX_TOP_K`.
    pub fn limit(&self) -> usize {
        self.top_k.unwrap_or(DEFAULT_TOP_K).min(MAX_TOP_K)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse {
    pub results: Vec<DocumentRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub documents: usize,
    pub dimension: usize,
    pub model: String,
    pub on_embedding_failure: FailurePolicy,
    pub last_indexed: Option<DateTime<Utc>>,
}

/// Error body, same shape FastAPI-style clients already parse.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}
