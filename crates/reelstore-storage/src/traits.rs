//! Storage provider abstraction trait
//!
//! This module defines the StorageProvider trait that every storage backend
//! must implement.

use crate::error::StorageResult;
use crate::model::{
    ApplyLifeCycleInput, BucketExistsInput, BucketObject, BucketWithLocation, ByteStream,
    ConvertToServeUrlInput, CreateBucketInput, DeleteFileInput, FolderFile, HeadFileInput,
    HeadFileOutput, ListObjectsInput, ListObjectsPage, ReadFileInput, WriteFileInput,
};
use crate::ProviderKind;
use async_trait::async_trait;
use std::fmt::{Debug, Display};
use std::path::{Path, PathBuf};

/// Storage provider capability set
///
/// The rendering pipeline depends only on this trait. A concrete backend is
/// chosen once at configuration time (see `factory`). Every bucket and object
/// operation takes its region explicitly; no provider keeps a "current"
/// region for these calls.
///
/// `expected_bucket_owner`, where accepted, is an authorization guard: when
/// set, the backend must refuse the operation if the bucket belongs to a
/// different account.
#[async_trait]
pub trait StorageProvider: Send + Sync {
    /// Backend-specific region identifier
    type Region: Clone + Debug + Display + PartialEq + Send + Sync + 'static;

    /// Per-call credentials overriding the default credential chain
    type Credentials: Clone + Debug + Send + Sync + 'static;

    /// Location of a browser binary shipped with the runtime, if any.
    fn get_chromium_path(&self) -> Option<PathBuf>;

    /// Region the current function runtime executes in.
    ///
    /// Fails with `RegionUnavailable` when it cannot be determined.
    fn get_current_region_in_function(&self) -> StorageResult<Self::Region>;

    /// List buckets in `region`.
    ///
    /// Without `force_bucket_name`, only buckets carrying the configured bucket
    /// prefix are returned. Returns an empty list when nothing matches.
    async fn get_buckets(
        &self,
        region: &Self::Region,
        force_bucket_name: Option<&str>,
    ) -> StorageResult<Vec<BucketWithLocation<Self::Region>>>;

    /// Create a bucket. Not idempotent: fails if the bucket already exists.
    async fn create_bucket(&self, input: CreateBucketInput<Self::Region>) -> StorageResult<()>;

    /// Enable or disable the render folder expiry rules on a bucket.
    async fn apply_life_cycle(
        &self,
        input: ApplyLifeCycleInput<Self::Region, Self::Credentials>,
    ) -> StorageResult<()>;

    /// Fetch one page of objects below `prefix`.
    ///
    /// The continuation token is handed to the backend unchanged, and the
    /// backend's next token is returned verbatim. Callers loop until
    /// `next_continuation_token` is `None`.
    async fn list_objects(
        &self,
        input: ListObjectsInput<Self::Region>,
    ) -> StorageResult<ListObjectsPage>;

    /// Delete one object. Deleting a missing key succeeds.
    async fn delete_file(
        &self,
        input: DeleteFileInput<Self::Region, Self::Credentials>,
    ) -> StorageResult<()>;

    /// `Ok(false)` when the bucket does not exist; errors only for
    /// authorization or transport failures.
    async fn bucket_exists(&self, input: BucketExistsInput<Self::Region>) -> StorageResult<bool>;

    /// Random identifier used for naming renders.
    fn random_hash(&self) -> String {
        crate::keys::random_hash()
    }

    /// Stream an object's content. Fails with `NotFound` if the key is absent.
    async fn read_file(&self, input: ReadFileInput<Self::Region>) -> StorageResult<ByteStream>;

    /// Write an object's full content.
    async fn write_file(
        &self,
        input: WriteFileInput<Self::Region, Self::Credentials>,
    ) -> StorageResult<()>;

    /// Fetch the metadata of one object without its content.
    async fn head_file(
        &self,
        input: HeadFileInput<Self::Region, Self::Credentials>,
    ) -> StorageResult<HeadFileOutput>;

    /// Turn a site id (or an already complete URL) into the URL a browser
    /// loads. Pure: performs no I/O.
    fn convert_to_serve_url(&self, input: ConvertToServeUrlInput<'_, Self::Region>) -> String;

    /// Whether callers should print verbose diagnostic hints for this backend.
    fn print_logging_helper(&self) -> bool;

    /// List files below a local directory, e.g. a site bundle about to be uploaded.
    async fn get_folder_files(&self, dir: &Path) -> StorageResult<Vec<FolderFile>> {
        crate::folder::get_folder_files(dir).await
    }

    /// Which concrete provider this is.
    fn provider(&self) -> ProviderKind;
}

/// Drain every page of a listing.
///
/// Convenience for callers that do want the whole listing; pages are
/// fetched one after another.
pub async fn list_all_objects<P>(
    provider: &P,
    mut input: ListObjectsInput<P::Region>,
) -> StorageResult<Vec<BucketObject>>
where
    P: StorageProvider + ?Sized,
{
    let mut objects = Vec::new();

    loop {
        let page = provider.list_objects(input.clone()).await?;
        objects.extend(page.objects);

        match page.next_continuation_token {
            Some(token) => input.continuation_token = Some(token),
            None => break,
        }
    }

    Ok(objects)
}
