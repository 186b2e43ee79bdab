//! Folder expiry rules
//!
//! Renders written below `renders/<label>/` are removed by the object store
//! after the label's number of days once folder expiry is enabled.

use crate::keys::RENDERS_PREFIX;
use chrono::{DateTime, Duration, Utc};

/// Retention classes for render folders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FolderExpiry {
    OneDay,
    ThreeDays,
    SevenDays,
    ThirtyDays,
}

impl FolderExpiry {
    pub const ALL: [FolderExpiry; 4] = [
        FolderExpiry::OneDay,
        FolderExpiry::ThreeDays,
        FolderExpiry::SevenDays,
        FolderExpiry::ThirtyDays,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            FolderExpiry::OneDay => "1-day",
            FolderExpiry::ThreeDays => "3-days",
            FolderExpiry::SevenDays => "7-days",
            FolderExpiry::ThirtyDays => "30-days",
        }
    }

    pub fn days(&self) -> i32 {
        match self {
            FolderExpiry::OneDay => 1,
            FolderExpiry::ThreeDays => 3,
            FolderExpiry::SevenDays => 7,
            FolderExpiry::ThirtyDays => 30,
        }
    }

    /// Key prefix covered by this retention class
    pub fn prefix(&self) -> String {
        format!("{}/{}/", RENDERS_PREFIX, self.label())
    }

    /// Retention class whose prefix `key` falls under, if any.
    pub fn for_key(key: &str) -> Option<FolderExpiry> {
        FolderExpiry::ALL
            .into_iter()
            .find(|expiry| key.starts_with(&expiry.prefix()))
    }

    /// Whether an object last modified at `last_modified` has expired at `now`.
    pub fn is_expired(&self, last_modified: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        now - last_modified >= Duration::days(i64::from(self.days()))
    }
}

/// Backend-neutral description of one expiration rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleRule {
    pub id: String,
    pub prefix: String,
    pub expiration_days: i32,
}

/// The full rule set installed when folder expiry is enabled.
pub fn folder_expiry_rules() -> Vec<LifecycleRule> {
    FolderExpiry::ALL
        .iter()
        .map(|expiry| LifecycleRule {
            id: format!("delete-after-{}", expiry.label()),
            prefix: expiry.prefix(),
            expiration_days: expiry.days(),
        })
        .collect()
}
