//! Persistence-specific error types.

/// Errors that can occur during store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Input rejected before anything was written
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Operation referenced a record that does not exist
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: i64 },

    /// Underlying storage fault
    #[error("Storage failure: {0}")]
    Storage(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(error: rusqlite::Error) -> Self {
        StoreError::Storage(error.to_string())
    }
}

/// Convenience type alias for Result with StoreError
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_display() {
        let error = StoreError::Validation("task name must not be empty".to_string());
        assert!(error.to_string().contains("Validation failed"));
        assert!(error.to_string().contains("task name"));

        let error = StoreError::NotFound {
            entity: "Scanned item",
            id: 99,
        };
        assert_eq!(error.to_string(), "Scanned item not found: 99");

        let error = StoreError::Storage("disk I/O error".to_string());
        assert!(error.to_string().contains("disk I/O error"));
    }

    #[test]
    fn test_store_error_from_sqlite() {
        let error: StoreError = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(matches!(error, StoreError::Storage(_)));
    }
}
