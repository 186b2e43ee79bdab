//! Storage error taxonomy
//!
//! Every backend maps its native errors into [`StorageError`] once, at the
//! adapter boundary. Callers only ever branch on [`ErrorKind`].

use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Coarse classification of a storage failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input rejected before any backend call
    Validation,
    /// Object or bucket absent
    NotFound,
    /// Authorization failure or bucket owner mismatch
    Permission,
    /// Anything else reported by the backend
    Transport,
    /// Provider misconfiguration or undeterminable environment
    Configuration,
}

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Invalid bucket name \"{name}\": {reason}")]
    InvalidBucketName { name: String, reason: String },

    #[error("Invalid presign expiration: {0}")]
    InvalidExpiration(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Invalid region: {0}")]
    InvalidRegion(String),

    #[error("Object \"{key}\" not found in bucket \"{bucket}\"")]
    NotFound { bucket: String, key: String },

    #[error("Bucket \"{0}\" not found")]
    BucketNotFound(String),

    #[error("Bucket \"{0}\" already exists")]
    BucketAlreadyExists(String),

    #[error("{message}")]
    PermissionDenied {
        bucket: String,
        key: Option<String>,
        message: String,
    },

    #[error("Unable to determine the current region: {0}")]
    RegionUnavailable(String),

    #[error("{operation} failed for {target}: {source}")]
    Backend {
        operation: &'static str,
        target: String,
        #[source]
        source: BoxError,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

impl StorageError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StorageError::InvalidBucketName { .. }
            | StorageError::InvalidExpiration(_)
            | StorageError::InvalidKey(_)
            | StorageError::InvalidRegion(_) => ErrorKind::Validation,
            StorageError::NotFound { .. } | StorageError::BucketNotFound(_) => {
                ErrorKind::NotFound
            }
            StorageError::PermissionDenied { .. } => ErrorKind::Permission,
            StorageError::BucketAlreadyExists(_)
            | StorageError::Backend { .. }
            | StorageError::IoError(_) => ErrorKind::Transport,
            StorageError::RegionUnavailable(_) | StorageError::ConfigError(_) => {
                ErrorKind::Configuration
            }
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    pub(crate) fn backend(
        operation: &'static str,
        target: impl Into<String>,
        source: impl Into<BoxError>,
    ) -> Self {
        StorageError::Backend {
            operation,
            target: target.into(),
            source: source.into(),
        }
    }
}

/// Human readable `bucket/key` target used in error and log messages.
pub(crate) fn describe_target(bucket: &str, key: Option<&str>) -> String {
    match key {
        Some(key) => format!("\"{}\" in bucket \"{}\"", key, bucket),
        None => format!("bucket \"{}\"", bucket),
    }
}
