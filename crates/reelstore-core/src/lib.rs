//! Reelstore Core Library
//!
//! This crate provides the configuration and shared type tags used by the
//! storage provider layer and the command-line tools.

pub mod config;
pub mod provider_types;

// Re-export commonly used types
pub use config::{Config, StorageConfig};
pub use provider_types::ProviderKind;
