//! Storage error handling
//!
//! Provides typed errors for storage operations with descriptive messages
//! and recovery suggestions.

use std::io;
use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StorageError {
    /// No record with the given key
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// A required field is missing or blank
    #[error("Invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    /// Cascading delete could not complete; nothing was removed
    #[error("Failed to delete inspection {inspection_id} atomically: {source}")]
    TransactionFailure {
        inspection_id: Uuid,
        #[source]
        source: rusqlite::Error,
    },

    /// A stored row could not be mapped back to a model
    #[error("Invalid {column} in {table}: {details}")]
    InvalidRecord {
        table: &'static str,
        column: &'static str,
        details: String,
    },

    /// Failed to create data directory
    #[error("Failed to create data directory '{path}': {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Permission denied accessing path
    #[error("Permission denied: cannot access '{path}'. Check file permissions.")]
    PermissionDenied {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Disk is full or quota exceeded
    #[error(
        "Disk full or quota exceeded while writing to '{path}'. Free up disk space and try again."
    )]
    DiskFull {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// SQLite database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Generic I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl StorageError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        StorageError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        StorageError::Validation {
            field,
            reason: reason.into(),
        }
    }

    /// Create an error from an I/O error with path context
    ///
    /// Classifies the error based on its kind (permission, disk full, etc.)
    pub fn from_io(error: io::Error, path: PathBuf) -> Self {
        match error.kind() {
            io::ErrorKind::PermissionDenied => StorageError::PermissionDenied {
                path,
                source: error,
            },
            _ if is_disk_full_error(&error) => StorageError::DiskFull {
                path,
                source: error,
            },
            _ => StorageError::CreateDirectory {
                path,
                source: error,
            },
        }
    }

    /// Whether this is a missing-record error
    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound { .. })
    }

    /// Check if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            StorageError::DiskFull { .. }
                | StorageError::PermissionDenied { .. }
                | StorageError::Validation { .. }
                | StorageError::TransactionFailure { .. }
        )
    }

    /// Get a recovery suggestion for this error
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            StorageError::DiskFull { .. } => Some("Free up disk space and try again."),
            StorageError::PermissionDenied { .. } => Some(
                "Check file and directory permissions. You may need to run with different permissions or change ownership.",
            ),
            StorageError::CreateDirectory { .. } => {
                Some("Check that the parent directory exists and you have write permissions.")
            }
            StorageError::TransactionFailure { .. } => {
                Some("No data was removed. Close other programs using the database and retry.")
            }
            StorageError::Validation { .. } => Some("Provide a non-empty value and try again."),
            _ => None,
        }
    }
}

/// Check if an I/O error indicates disk full condition
fn is_disk_full_error(error: &io::Error) -> bool {
    let msg = error.to_string().to_lowercase();
    msg.contains("no space left")
        || msg.contains("disk full")
        || msg.contains("quota exceeded")
        || msg.contains("not enough space")
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_denied_classification() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        let err = StorageError::from_io(io_err, PathBuf::from("/test/path"));

        assert!(matches!(err, StorageError::PermissionDenied { .. }));
        assert!(err.is_recoverable());
        assert!(err.recovery_suggestion().is_some());
    }

    #[test]
    fn test_disk_full_detection() {
        let io_err = io::Error::new(io::ErrorKind::Other, "No space left on device");
        let err = StorageError::from_io(io_err, PathBuf::from("/full/disk"));

        assert!(matches!(err, StorageError::DiskFull { .. }));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_other_io_error_is_directory_failure() {
        let io_err = io::Error::new(io::ErrorKind::Other, "read-only file system");
        let err = StorageError::from_io(io_err, PathBuf::from("/ro"));

        assert!(matches!(err, StorageError::CreateDirectory { .. }));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_not_found_display() {
        let err = StorageError::not_found("inspection", "abc-123");

        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "inspection not found: abc-123");
        assert!(err.recovery_suggestion().is_none());
    }

    #[test]
    fn test_validation_display() {
        let err = StorageError::validation("property address", "must not be blank");

        let msg = err.to_string();
        assert!(msg.contains("property address"));
        assert!(msg.contains("blank"));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_transaction_failure_display() {
        let err = StorageError::TransactionFailure {
            inspection_id: Uuid::nil(),
            source: rusqlite::Error::QueryReturnedNoRows,
        };

        let msg = err.to_string();
        assert!(msg.contains("atomically"));
        assert!(msg.contains(&Uuid::nil().to_string()));
        assert!(err.recovery_suggestion().unwrap().contains("No data was removed"));
    }
}
