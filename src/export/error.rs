//! Export-specific error types.

use std::path::PathBuf;

/// Errors that can occur while exporting a task.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// Task snapshot is incomplete or inconsistent
    #[error("Invalid task data for export: {0}")]
    InvalidInput(String),

    /// Failed to write the export file
    #[error("Failed to write export file {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Spreadsheet writer rejected the workbook
    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] rust_xlsxwriter::XlsxError),
}

/// Convenience type alias for Result with ExportError
pub type ExportResult<T> = Result<T, ExportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_error_display() {
        let error = ExportError::InvalidInput("task name is empty".to_string());
        assert!(error.to_string().contains("Invalid task data for export"));
        assert!(error.to_string().contains("task name is empty"));

        let error = ExportError::WriteFailed {
            path: PathBuf::from("/exports/Audit_2024-01-01.csv"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(error.to_string().contains("/exports/Audit_2024-01-01.csv"));
        assert!(error.to_string().contains("denied"));
    }
}
