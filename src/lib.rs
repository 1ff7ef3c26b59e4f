//! pagesearch library
//!
//! Semantic search over pages captured while browsing. Each page is embedded
//! by an external Ollama-compatible service and stored in an in-memory,
//! exact nearest-neighbor index.
//!
//! # Modules
//!
//! - `core`: records, errors, configuration and the HTTP wire types
//! - `search`: embedding client, vector and metadata stores, pipelines
//! - `server`: axum HTTP surface (`server` feature)
//!
//! # Embedding failures
//!
//! With the default `fallback_random` policy an unreachable embedding
//! service does not fail indexing or queries: a random vector is used in its
//! place and a warning is logged. Pages indexed that way will rank
//! arbitrarily. Set `embedding.on_failure: propagate_error` to get an error
//! (HTTP 503) instead.

pub mod core;
pub mod search;
#[cfg(feature = "server")]
pub mod server;

// Re-exports for convenience
pub use crate::core::config::{Config, FailurePolicy};
pub use crate::core::document::{DocumentRecord, SearchHit, Slot};
pub use crate::core::error::{SearchError, SearchResult};
pub use crate::search::{EmbeddingClient, SearchEngine};
