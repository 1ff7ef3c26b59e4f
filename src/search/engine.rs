//! Search Engine - indexing and query pipelines over one document index
//!
//! Both pipelines share the same [`DocumentIndex`] and [`EmbeddingClient`].
//! Embedding happens before any lock is taken; the index write or read is a
//! single short critical section. A query therefore sees a document only
//! once its insert has completed.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info};

use super::embedding::EmbeddingClient;
use super::index::{DocumentIndex, IndexStats};
use crate::core::api::DEFAULT_TOP_K;
use crate::core::config::Config;
use crate::core::document::{DocumentRecord, Slot};
use crate::core::error::{check_dimension, SearchResult};

/// Turns one document into one searchable entry
#[derive(Clone)]
pub struct IndexingPipeline {
    embedder: EmbeddingClient,
    index: Arc<DocumentIndex>,
}

impl IndexingPipeline {
    pub fn new(embedder: EmbeddingClient, index: Arc<DocumentIndex>) -> Self {
        Self { embedder, index }
    }

    /// Embed `text` and store it with its source. Returns the new slot.
    pub async fn index(&self, source_identifier: &str, text: &str) -> SearchResult<Slot> {
        let vector = self.embedder.embed(text).await?;
        check_dimension(&vector, self.index.dimension())?;

        let record = DocumentRecord::new(source_identifier, text);
        let slot = self.index.insert(&vector, record)?;

        info!(source = source_identifier, slot, "indexed document");
        Ok(slot)
    }
}

/// Turns one query string into ranked document records
#[derive(Clone)]
pub struct QueryPipeline {
    embedder: EmbeddingClient,
    index: Arc<DocumentIndex>,
}

impl QueryPipeline {
    pub fn new(embedder: EmbeddingClient, index: Arc<DocumentIndex>) -> Self {
        Self { embedder, index }
    }

    /// The `top_k` closest records, closest first.
    pub async fn query(&self, text: &str, top_k: usize) -> SearchResult<Vec<DocumentRecord>> {
        Ok(self
            .query_with_scores(text, top_k)
            .await?
            .into_iter()
            .map(|(record, _)| record)
            .collect())
    }

    /// Like [`query`](Self::query) but keeps the squared L2 distance of each hit.
    pub async fn query_with_scores(
        &self,
        text: &str,
        top_k: usize,
    ) -> SearchResult<Vec<(DocumentRecord, f32)>> {
        let vector = self.embedder.embed(text).await?;
        check_dimension(&vector, self.index.dimension())?;

        let results = self.index.search(&vector, top_k)?;
        debug!(top_k, returned = results.len(), "query finished");
        Ok(results)
    }
}

/// Owned handle to the whole engine. Cheap to clone; clones share the index.
#[derive(Clone)]
pub struct SearchEngine {
    indexing: IndexingPipeline,
    querying: QueryPipeline,
    index: Arc<DocumentIndex>,
    embedder: EmbeddingClient,
}

impl SearchEngine {
    /// Engine with an empty index sized to the embedder's dimension
    pub fn new(embedder: EmbeddingClient) -> Self {
        let index = Arc::new(DocumentIndex::new(embedder.dimension()));
        Self {
            indexing: IndexingPipeline::new(embedder.clone(), Arc::clone(&index)),
            querying: QueryPipeline::new(embedder.clone(), Arc::clone(&index)),
            index,
            embedder,
        }
    }

    /// Engine talking to the embedding service named in `config`
    pub fn from_config(config: &Config) -> Result<Self> {
        let embedder = EmbeddingClient::from_config(&config.embedding)
            .context("Failed to create embedding client")?;
        Ok(Self::new(embedder))
    }

    pub async fn index(&self, source_identifier: &str, text: &str) -> SearchResult<Slot> {
        self.indexing.index(source_identifier, text).await
    }

    pub async fn query(&self, text: &str, top_k: usize) -> SearchResult<Vec<DocumentRecord>> {
        self.querying.query(text, top_k).await
    }

    /// Query with the default result count
    pub async fn query_default(&self, text: &str) -> SearchResult<Vec<DocumentRecord>> {
        self.query(text, DEFAULT_TOP_K).await
    }

    pub async fn query_with_scores(
        &self,
        text: &str,
        top_k: usize,
    ) -> SearchResult<Vec<(DocumentRecord, f32)>> {
        self.querying.query_with_scores(text, top_k).await
    }

    /// Record stored at `slot`
    pub fn report(&self, slot: Slot) -> SearchResult<DocumentRecord> {
        self.index.get(slot)
    }

    pub fn stats(&self) -> IndexStats {
        self.index.stats()
    }

    pub fn embedder(&self) -> &EmbeddingClient {
        &self.embedder
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::FailurePolicy;
    use crate::core::error::SearchError;
    use crate::search::embedding::testing::{unit, DownProvider, MapProvider};

    const D: usize = 768;

    fn hello_world_engine() -> SearchEngine {
        let provider = MapProvider::new(D, &[("hello", unit(D, 0)), ("world", unit(D, 1))]);
        SearchEngine::new(EmbeddingClient::new(
            Arc::new(provider),
            D,
            FailurePolicy::PropagateError,
        ))
    }

    #[tokio::test]
    async fn test_hello_world_ranking() {
        let engine = hello_world_engine();
        assert_eq!(engine.index("a", "hello").await.unwrap(), 0);
        assert_eq!(engine.index("b", "world").await.unwrap(), 1);

        let results = engine.query_with_scores("hello", 3).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].0.source_identifier, "a");
        assert_eq!(results[0].1, 0.0);
        assert_eq!(results[1].0.source_identifier, "b");
        assert_eq!(results[1].1, 2.0);
    }

    #[tokio::test]
    async fn test_query_empty_index() {
        let engine = hello_world_engine();
        let results = engine.query_default("hello").await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_top_k_larger_than_index() {
        let engine = hello_world_engine();
        engine.index("a", "hello").await.unwrap();
        engine.index("b", "world").await.unwrap();

        let results = engine.query("hello", 10).await.unwrap();
        assert_eq!(results.len(), 2);
    }

    #[tokio::test]
    async fn test_default_top_k_is_three() {
        let engine = hello_world_engine();
        for i in 0..5 {
            engine.index(&format!("doc-{i}"), "hello").await.unwrap();
        }

        let results = engine.query_default("hello").await.unwrap();
        let sources: Vec<&str> = results
            .iter()
            .map(|r| r.source_identifier.as_str())
            .collect();
        assert_eq!(sources, vec!["doc-0", "doc-1", "doc-2"]);
    }

    #[tokio::test]
    async fn test_report() {
        let engine = hello_world_engine();
        engine.index("a", "hello").await.unwrap();

        let record = engine.report(0).unwrap();
        assert_eq!(record.source_identifier, "a");
        assert_eq!(record.text, "hello");
        assert_eq!(engine.report(1), Err(SearchError::NotFound(1)));
    }

    #[tokio::test]
    async fn test_dimension_mismatch_aborts_indexing() {
        let provider = MapProvider::new(D, &[("bad", vec![0.0; D + 1])]);
        let engine = SearchEngine::new(EmbeddingClient::new(
            Arc::new(provider),
            D,
            FailurePolicy::FallbackRandom,
        ));

        let err = engine.index("x", "bad").await.unwrap_err();
        assert_eq!(
            err,
            SearchError::DimensionMismatch {
                expected: D,
                actual: D + 1
            }
        );
        assert_eq!(engine.stats().documents, 0);
        assert_eq!(engine.stats().vectors, 0);

        assert!(matches!(
            engine.query("bad", 3).await,
            Err(SearchError::DimensionMismatch { .. })
        ));
    }

    #[tokio::test]
    async fn test_embedding_outage_follows_policy() {
        let masking = SearchEngine::new(EmbeddingClient::new(
            Arc::new(DownProvider),
            8,
            FailurePolicy::FallbackRandom,
        ));
        assert_eq!(masking.index("a", "hello").await.unwrap(), 0);
        assert_eq!(masking.query("hello", 3).await.unwrap().len(), 1);

        let strict = SearchEngine::new(EmbeddingClient::new(
            Arc::new(DownProvider),
            8,
            FailurePolicy::PropagateError,
        ));
        assert!(matches!(
            strict.index("a", "hello").await,
            Err(SearchError::EmbeddingUnavailable(_))
        ));
        assert_eq!(strict.stats().documents, 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_indexing_keeps_lock_step() {
        const N: usize = 48;
        let pairs: Vec<(String, Vec<f32>)> =
            (0..N).map(|i| (format!("text-{i}"), unit(N, i))).collect();
        let refs: Vec<(&str, Vec<f32>)> = pairs
            .iter()
            .map(|(t, v)| (t.as_str(), v.clone()))
            .collect();
        let engine = SearchEngine::new(EmbeddingClient::new(
            Arc::new(MapProvider::new(N, &refs)),
            N,
            FailurePolicy::PropagateError,
        ));

        let tasks: Vec<_> = (0..N)
            .map(|i| {
                let engine = engine.clone();
                tokio::spawn(async move {
                    engine
                        .index(&format!("source-{i}"), &format!("text-{i}"))
                        .await
                        .unwrap()
                })
            })
            .collect();

        let mut slots = Vec::new();
        for task in tasks {
            slots.push(task.await.unwrap());
        }
        slots.sort_unstable();
        assert_eq!(slots, (0..N).collect::<Vec<_>>());

        let stats = engine.stats();
        assert_eq!(stats.documents, N);
        assert_eq!(stats.vectors, N);

        for i in 0..N {
            let results = engine.query_with_scores(&format!("text-{i}"), 1).await.unwrap();
            assert_eq!(results[0].0.source_identifier, format!("source-{i}"));
            assert_eq!(results[0].1, 0.0);
        }
    }
}
