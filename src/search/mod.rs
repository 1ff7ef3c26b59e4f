//! Semantic search engine
//!
//! Exact nearest-neighbor search over page embeddings held in memory.

pub mod embedding;
pub mod engine;
pub mod index;
pub mod metadata;
pub mod vector_store;

pub use embedding::{EmbeddingClient, EmbeddingProvider, OllamaProvider};
pub use engine::{IndexingPipeline, QueryPipeline, SearchEngine};
pub use index::{DocumentIndex, IndexStats};
pub use metadata::MetadataStore;
pub use vector_store::VectorStore;
