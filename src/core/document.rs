use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Position of a document in the index. The vector and the record of one
/// document share the same slot.
pub type Slot = usize;

/// Metadata kept for every indexed page.
///
/// Serialized with the field names the browser extension expects
/// (`url`, `text`, `timestamp`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    #[serde(rename = "url")]
    pub source_identifier: String,
    pub text: String,
    #[serde(rename = "timestamp")]
    pub ingested_at: DateTime<Utc>,
}

impl DocumentRecord {
    /// Create a record stamped with the current time.
    pub fn new(source_identifier: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            source_identifier: source_identifier.into(),
            text: text.into(),
            ingested_at: Utc::now(),
        }
    }

    /// Text shortened to `max_chars` characters for display (char-aware).
    pub fn excerpt(&self, max_chars: usize) -> String {
        if self.text.chars().count() > max_chars {
            format!("{}...", self.text.chars().take(max_chars).collect::<String>())
        } else {
            self.text.clone()
        }
    }
}

/// One nearest-neighbor match. Never stored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchHit {
    pub slot: Slot,
    pub distance: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_wire_names() {
        let record = DocumentRecord::new("https://example.com", "hello");
        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(value["url"], "https://example.com");
        assert_eq!(value["text"], "hello");
        assert!(value.get("timestamp").is_some());
        assert!(value.get("source_identifier").is_none());
    }

    #[test]
    fn test_excerpt_is_char_aware() {
        let record = DocumentRecord::new("a", "한국어 테스트 문장");
        assert_eq!(record.excerpt(3), "한국어...");
        assert_eq!(record.excerpt(100), "한국어 테스트 문장");
    }
}
