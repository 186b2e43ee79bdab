//! Normalization of AWS SDK errors into `StorageError`
//!
//! This is the only place that inspects SDK error codes and status codes.

use crate::error::{describe_target, StorageError};
use aws_sdk_s3::config::http::HttpResponse;
use aws_sdk_s3::error::{ProvideErrorMetadata, SdkError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorClass {
    NotFound,
    BucketNotFound,
    Permission,
    Other,
}

/// Classify an S3 failure from its error code, message and HTTP status.
pub(crate) fn classify(code: Option<&str>, message: Option<&str>, status: Option<u16>) -> ErrorClass {
    match code {
        Some("NoSuchBucket") => return ErrorClass::BucketNotFound,
        Some("NotFound") | Some("NoSuchKey") => return ErrorClass::NotFound,
        Some("AccessDenied") | Some("AllAccessDisabled") => return ErrorClass::Permission,
        _ => {}
    }

    // HeadObject on a bucket without s3:ListBucket answers with a bare 403
    // that the SDK surfaces as "UnknownError".
    if status == Some(403) || message == Some("UnknownError") {
        return ErrorClass::Permission;
    }

    if status == Some(404) {
        return ErrorClass::NotFound;
    }

    ErrorClass::Other
}

/// Map an SDK error for `operation` on `bucket`/`key` into the shared taxonomy.
pub(crate) fn from_sdk<E>(
    operation: &'static str,
    bucket: &str,
    key: Option<&str>,
    err: SdkError<E, HttpResponse>,
) -> StorageError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
{
    let status = err.raw_response().map(|response| response.status().as_u16());
    let class = classify(err.code(), err.message(), status);

    match class {
        ErrorClass::BucketNotFound => StorageError::BucketNotFound(bucket.to_string()),
        ErrorClass::NotFound => match key {
            Some(key) => StorageError::NotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            },
            None => StorageError::BucketNotFound(bucket.to_string()),
        },
        ErrorClass::Permission => StorageError::PermissionDenied {
            bucket: bucket.to_string(),
            key: key.map(str::to_string),
            message: format!(
                "Access denied during {} on {}{}",
                operation,
                describe_target(bucket, key),
                err.message()
                    .map(|m| format!(": {}", m))
                    .unwrap_or_default()
            ),
        },
        ErrorClass::Other => {
            tracing::error!(
                error = %err,
                bucket = %bucket,
                key = key.unwrap_or_default(),
                http_status = status.unwrap_or_default(),
                operation,
                "S3 operation failed"
            );
            StorageError::backend(operation, describe_target(bucket, key), err)
        }
    }
}
