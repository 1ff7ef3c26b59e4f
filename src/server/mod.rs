//! HTTP server for the browser extension
//!
//! Exposes indexing, querying and record lookup over JSON.

mod routes;

pub use routes::{router, run_server, ApiError};
