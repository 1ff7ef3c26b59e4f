use chrono::{DateTime, Utc};

use crate::core::document::{DocumentRecord, Slot};
use crate::core::error::{SearchError, SearchResult};

/// Append-only list of document records, aligned slot-for-slot with the
/// vector store.
#[derive(Debug, Clone, Default)]
pub struct MetadataStore {
    records: Vec<DocumentRecord>,
}

impl MetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, record: DocumentRecord) -> Slot {
        let slot = self.records.len();
        self.records.push(record);
        slot
    }

    pub fn get(&self, slot: Slot) -> SearchResult<&DocumentRecord> {
        self.records.get(slot).ok_or(SearchError::NotFound(slot))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn last_ingested_at(&self) -> Option<DateTime<Utc>> {
        self.records.last().map(|r| r.ingested_at)
    }
}
