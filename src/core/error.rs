use thiserror::Error;

use super::document::Slot;

/// Errors surfaced by the index and the pipelines built on it.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SearchError {
    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("no document at slot {0}")]
    NotFound(Slot),

    #[error("embedding service unavailable: {0}")]
    EmbeddingUnavailable(String),
}

pub type SearchResult<T> = Result<T, SearchError>;

/// Fails with `DimensionMismatch` unless `vector` has exactly `expected` components.
pub fn check_dimension(vector: &[f32], expected: usize) -> SearchResult<()> {
    if vector.len() != expected {
        return Err(SearchError::DimensionMismatch {
            expected,
            actual: vector.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_dimension() {
        assert!(check_dimension(&[0.0; 4], 4).is_ok());
        assert_eq!(
            check_dimension(&[0.0; 5], 4),
            Err(SearchError::DimensionMismatch {
                expected: 4,
                actual: 5
            })
        );
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(SearchError::NotFound(7).to_string(), "no document at slot 7");
        let err = SearchError::DimensionMismatch {
            expected: 768,
            actual: 769,
        };
        assert!(err.to_string().contains("expected 768, got 769"));
    }
}
