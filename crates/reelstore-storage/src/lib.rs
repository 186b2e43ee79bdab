//! Reelstore Storage Library
//!
//! This crate provides the cloud storage provider abstraction used by the
//! rendering pipeline, together with an S3 implementation and a local
//! filesystem implementation.
//!
//! # Regions
//!
//! Every bucket and object operation receives its region explicitly. Each
//! provider declares its own region type through [`StorageProvider::Region`],
//! so region values can never be mixed across providers.
//!
//! # Render folders
//!
//! Renders are written below `renders/`. When folder expiry is enabled on a
//! bucket, objects below `renders/{1-day,3-days,7-days,30-days}/` are deleted
//! automatically after the matching number of days. Key generation is
//! centralized in the `keys` module.

pub mod error;
pub mod factory;
pub mod folder;
pub mod keys;
pub mod lifecycle;
#[cfg(feature = "storage-local")]
pub mod local;
pub mod model;
pub mod presign;
pub mod region;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;
pub mod validation;

// Re-export commonly used types
pub use error::{ErrorKind, StorageError, StorageResult};
pub use factory::{create_provider, ConfiguredProvider};
#[cfg(feature = "storage-local")]
pub use local::{LocalCredentials, LocalProvider, LocalProviderConfig};
pub use model::{
    ApplyLifeCycleInput, BucketExistsInput, BucketObject, BucketWithLocation, ByteStream,
    ConvertToServeUrlInput, CreateBucketInput, DeleteFileInput, DownloadBehavior, FileBody,
    FolderFile, HeadFileInput, HeadFileOutput, ListObjectsInput, ListObjectsPage, Privacy,
    ReadFileInput, WriteFileInput,
};
pub use presign::{
    presign_url, presign_url_if_exists, PresignClient, PresignClientFactory, PresignUrlInput,
};
pub use reelstore_core::ProviderKind;
pub use region::{AwsRegion, LocalRegion};
#[cfg(feature = "storage-s3")]
pub use s3::{AwsCustomCredentials, S3Provider, S3ProviderConfig};
pub use traits::{list_all_objects, StorageProvider};
