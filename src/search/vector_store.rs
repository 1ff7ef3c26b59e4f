//! Flat vector store with exact L2 search
//!
//! Vectors are kept in one contiguous buffer and scanned in full for every
//! query. O(n·d) per search, which is fine for a browsing history.

use std::cmp::Ordering;

use crate::core::document::{SearchHit, Slot};
use crate::core::error::{check_dimension, SearchResult};

/// Append-only store of fixed-dimension vectors
#[derive(Debug, Clone)]
pub struct VectorStore {
    dimension: usize,
    count: usize,
    data: Vec<f32>,
}

impl VectorStore {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            count: 0,
            data: Vec::new(),
        }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of stored vectors, tracked separately from the buffer so a
    /// zero-dimension store still counts its entries.
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Append a vector and return its slot.
    ///
    /// The length check runs before anything is written, so a rejected
    /// vector leaves the store untouched.
    pub fn add(&mut self, vector: &[f32]) -> SearchResult<Slot> {
        check_dimension(vector, self.dimension)?;
        let slot = self.count;
        self.data.extend_from_slice(vector);
        self.count += 1;
        Ok(slot)
    }

    /// Vector stored at `slot`, if any.
    pub fn get(&self, slot: Slot) -> Option<&[f32]> {
        if slot >= self.count {
            return None;
        }
        let start = slot.checked_mul(self.dimension)?;
        let end = start.checked_add(self.dimension)?;
        self.data.get(start..end)
    }

    /// The `k` nearest vectors to `query`, closest first.
    ///
    /// Equal distances are ordered by slot so results are deterministic.
    pub fn search(&self, query: &[f32], k: usize) -> SearchResult<Vec<SearchHit>> {
        check_dimension(query, self.dimension)?;
        if k == 0 || self.is_empty() {
            return Ok(Vec::new());
        }

        let mut hits: Vec<SearchHit> = (0..self.count)
            .filter_map(|slot| {
                self.get(slot).map(|vector| SearchHit {
                    slot,
                    distance: squared_l2(query, vector),
                })
            })
            .collect();

        if k < hits.len() {
            hits.select_nth_unstable_by(k, compare_hits);
            hits.truncate(k);
        }
        hits.sort_unstable_by(compare_hits);

        Ok(hits)
    }
}

fn compare_hits(a: &SearchHit, b: &SearchHit) -> Ordering {
    a.distance
        .total_cmp(&b.distance)
        .then_with(|| a.slot.cmp(&b.slot))
}

/// Squared Euclidean distance between two equal-length vectors
pub fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}
