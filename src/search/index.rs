//! Document index: vectors and records behind one lock
//!
//! Every write goes through [`DocumentIndex::insert`], which appends to the
//! vector store and the metadata store inside the same write guard. Readers
//! take the read guard and see both stores at the same length.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use super::metadata::MetadataStore;
use super::vector_store::VectorStore;
use crate::core::document::{DocumentRecord, Slot};
use crate::core::error::{check_dimension, SearchResult};

#[derive(Debug)]
struct Entries {
    vectors: VectorStore,
    records: MetadataStore,
}

/// Index statistics
#[derive(Debug, Clone, PartialEq)]
pub struct IndexStats {
    pub documents: usize,
    pub vectors: usize,
    pub dimension: usize,
    pub last_indexed: Option<DateTime<Utc>>,
}

#[derive(Debug)]
pub struct DocumentIndex {
    dimension: usize,
    entries: RwLock<Entries>,
}

impl DocumentIndex {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            entries: RwLock::new(Entries {
                vectors: VectorStore::new(dimension),
                records: MetadataStore::new(),
            }),
        }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.entries.read().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Store one document. Both stores grow by one, or neither does.
    pub fn insert(&self, vector: &[f32], record: DocumentRecord) -> SearchResult<Slot> {
        // Only the vector add can fail, so check it before taking the lock.
        check_dimension(vector, self.dimension)?;

        let mut entries = self.entries.write();
        let slot = entries.vectors.add(vector)?;
        let record_slot = entries.records.append(record);
        debug_assert_eq!(slot, record_slot, "vector and metadata stores drifted");

        Ok(slot)
    }

    /// The `k` nearest documents to `query` with their squared L2 distance,
    /// closest first.
    pub fn search(&self, query: &[f32], k: usize) -> SearchResult<Vec<(DocumentRecord, f32)>> {
        let entries = self.entries.read();
        let hits = entries.vectors.search(query, k)?;

        Ok(hits
            .into_iter()
            .filter_map(|hit| {
                entries
                    .records
                    .get(hit.slot)
                    .ok()
                    .map(|record| (record.clone(), hit.distance))
            })
            .collect())
    }

    pub fn get(&self, slot: Slot) -> SearchResult<DocumentRecord> {
        self.entries.read().records.get(slot).cloned()
    }

    pub fn stats(&self) -> IndexStats {
        let entries = self.entries.read();
        IndexStats {
            documents: entries.records.len(),
            vectors: entries.vectors.len(),
            dimension: self.dimension,
            last_indexed: entries.records.last_ingested_at(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::SearchError;
    use std::sync::Arc;

    fn unit(dimension: usize, axis: usize) -> Vec<f32> {
        let mut v = vec![0.0; dimension];
        v[axis] = 1.0;
        v
    }

    #[test]
    fn test_insert_keeps_stores_aligned() {
        let index = DocumentIndex::new(4);
        assert_eq!(index.insert(&unit(4, 0), DocumentRecord::new("a", "x")).unwrap(), 0);
        assert_eq!(index.insert(&unit(4, 1), DocumentRecord::new("b", "y")).unwrap(), 1);

        let stats = index.stats();
        assert_eq!(stats.documents, 2);
        assert_eq!(stats.vectors, 2);
        assert_eq!(index.get(1).unwrap().source_identifier, "b");
    }

    #[test]
    fn test_rejected_insert_changes_nothing() {
        let index = DocumentIndex::new(4);
        index.insert(&unit(4, 0), DocumentRecord::new("a", "x")).unwrap();

        let err = index
            .insert(&[0.0; 5], DocumentRecord::new("b", "y"))
            .unwrap_err();
        assert!(matches!(err, SearchError::DimensionMismatch { .. }));

        let stats = index.stats();
        assert_eq!(stats.documents, 1);
        assert_eq!(stats.vectors, 1);
        assert_eq!(index.get(1), Err(SearchError::NotFound(1)));
    }

    #[test]
    fn test_zero_dimension_index_stays_aligned() {
        let index = DocumentIndex::new(0);
        assert_eq!(index.insert(&[], DocumentRecord::new("a", "x")).unwrap(), 0);
        assert_eq!(index.insert(&[], DocumentRecord::new("b", "y")).unwrap(), 1);

        let stats = index.stats();
        assert_eq!(stats.documents, 2);
        assert_eq!(stats.vectors, 2);
        assert_eq!(index.get(1).unwrap().source_identifier, "b");
    }

    #[test]
    fn test_search_resolves_records_in_order() {
        let index = DocumentIndex::new(3);
        index.insert(&[1.0, 0.0, 0.0], DocumentRecord::new("a", "x")).unwrap();
        index.insert(&[0.0, 1.0, 0.0], DocumentRecord::new("b", "y")).unwrap();
        index.insert(&[0.9, 0.1, 0.0], DocumentRecord::new("c", "z")).unwrap();

        let results = index.search(&[1.0, 0.0, 0.0], 3).unwrap();
        let sources: Vec<&str> = results
            .iter()
            .map(|(r, _)| r.source_identifier.as_str())
            .collect();
        assert_eq!(sources, vec!["a", "c", "b"]);
        assert_eq!(results[0].1, 0.0);
    }

    #[test]
    fn test_concurrent_inserts_stay_in_lock_step() {
        let index = Arc::new(DocumentIndex::new(64));

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let index = Arc::clone(&index);
                std::thread::spawn(move || {
                    for i in 0..8 {
                        let axis = t * 8 + i;
                        let slot = index
                            .insert(&unit(64, axis), DocumentRecord::new(axis.to_string(), ""))
                            .unwrap();
                        let record = index.get(slot).unwrap();
                        assert_eq!(record.source_identifier, axis.to_string());
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let stats = index.stats();
        assert_eq!(stats.documents, 64);
        assert_eq!(stats.vectors, 64);

        // Each record still sits at the slot of its own vector.
        for axis in 0..64 {
            let results = index.search(&unit(64, axis), 1).unwrap();
            assert_eq!(results[0].0.source_identifier, axis.to_string());
            assert_eq!(results[0].1, 0.0);
        }
    }
}
