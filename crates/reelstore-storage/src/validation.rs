//! Input validation shared by all providers
//!
//! Validation runs before any client is constructed, so a rejected input
//! never reaches the network.

use crate::error::{StorageError, StorageResult};
use regex::Regex;
use std::sync::LazyLock;

/// Longest lifetime a presigned URL may have (7 days)
pub const MAX_PRESIGN_EXPIRATION_SECS: u64 = 604_800;

/// Longest object key accepted by S3 (in bytes)
pub const MAX_OBJECT_KEY_LENGTH: usize = 1024;

// Dot-separated labels, each starting and ending with a letter or digit.
static BUCKET_NAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([a-z0-9]|[a-z0-9][a-z0-9\-]*[a-z0-9])(\.([a-z0-9]|[a-z0-9][a-z0-9\-]*[a-z0-9]))*$")
        .expect("bucket name pattern is valid")
});

static IP_ADDRESS_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+\.)+\d+$").expect("ip address pattern is valid"));

/// Validate a bucket name against S3 naming rules
///
/// Rules:
/// - 3 to 63 characters
/// - lowercase letters, digits, hyphens and dots
/// - every dot-separated label starts and ends with a letter or digit
/// - not formatted like an IP address
/// - starts with `required_prefix` when one is given
pub fn validate_bucket_name(name: &str, required_prefix: Option<&str>) -> StorageResult<()> {
    let invalid = |reason: String| StorageError::InvalidBucketName {
        name: name.to_string(),
        reason,
    };

    if name.len() < 3 || name.len() > 63 {
        return Err(invalid(format!(
            "must be between 3 and 63 characters long, got {}",
            name.len()
        )));
    }

    if !BUCKET_NAME_PATTERN.is_match(name) {
        return Err(invalid(
            "may only contain lowercase letters, digits, hyphens and dots, and each label must start and end with a letter or digit"
                .to_string(),
        ));
    }

    if IP_ADDRESS_PATTERN.is_match(name) {
        return Err(invalid("must not be formatted as an IP address".to_string()));
    }

    if let Some(prefix) = required_prefix {
        if !name.starts_with(prefix) {
            return Err(invalid(format!("must start with \"{}\"", prefix)));
        }
    }

    Ok(())
}

/// Validate the lifetime of a presigned URL in seconds
pub fn validate_presign_expiration(expires_in_seconds: u64) -> StorageResult<()> {
    if expires_in_seconds < 1 {
        return Err(StorageError::InvalidExpiration(format!(
            "expires_in_seconds must be at least 1, got {}",
            expires_in_seconds
        )));
    }

    if expires_in_seconds > MAX_PRESIGN_EXPIRATION_SECS {
        return Err(StorageError::InvalidExpiration(format!(
            "expires_in_seconds must be at most {} (7 days), got {}",
            MAX_PRESIGN_EXPIRATION_SECS, expires_in_seconds
        )));
    }

    Ok(())
}

/// Validate an object key
pub fn validate_object_key(key: &str) -> StorageResult<()> {
    if key.is_empty() {
        return Err(StorageError::InvalidKey("key must not be empty".to_string()));
    }

    if key.len() > MAX_OBJECT_KEY_LENGTH {
        return Err(StorageError::InvalidKey(format!(
            "key exceeds {} bytes",
            MAX_OBJECT_KEY_LENGTH
        )));
    }

    Ok(())
}
