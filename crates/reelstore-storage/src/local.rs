//! Local filesystem storage provider
//!
//! Layout on disk:
//!
//! ```text
//! <root>/<region>/<bucket>/.bucket.json
//! <root>/<region>/<bucket>/<key>
//! ```
//!
//! `.bucket.json` records the owning account, the creation date and whether
//! folder expiry is enabled. With folder expiry on, objects under
//! `renders/<retention>/` older than their retention class are purged when
//! they are listed, read or inspected. Presigned URLs are HMAC-SHA256 signed
//! and can be checked with [`LocalProvider::verify_presigned_url`].

use crate::error::{describe_target, StorageError, StorageResult};
use crate::keys::site_index_key;
use crate::lifecycle::FolderExpiry;
use crate::model::{
    ApplyLifeCycleInput, BucketExistsInput, BucketObject, BucketWithLocation, ByteStream,
    ConvertToServeUrlInput, CreateBucketInput, DeleteFileInput, FileBody, HeadFileInput,
    HeadFileOutput, ListObjectsInput, ListObjectsPage, ReadFileInput, WriteFileInput,
};
use crate::presign::{PresignClient, PresignClientFactory};
use crate::region::LocalRegion;
use crate::traits::StorageProvider;
use crate::validation::{validate_bucket_name, validate_object_key};
use crate::ProviderKind;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::StreamExt;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use subtle::ConstantTimeEq;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use walkdir::WalkDir;

type HmacSha256 = Hmac<Sha256>;

const BUCKET_METADATA_FILE: &str = ".bucket.json";

/// Objects returned per `list_objects` page unless configured otherwise
pub const DEFAULT_LIST_PAGE_SIZE: usize = 1000;

pub const DATE_PARAM: &str = "X-Reel-Date";
pub const EXPIRES_PARAM: &str = "X-Reel-Expires";
pub const SIGNATURE_PARAM: &str = "X-Reel-Signature";

/// Per-call identity for the local provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalCredentials {
    /// Account the caller acts as
    pub owner: String,
}

#[derive(Debug, Clone)]
pub struct LocalProviderConfig {
    /// Root directory for bucket storage (e.g., "/var/lib/reelstore")
    pub root: PathBuf,
    /// Base URL the root is served under (e.g., "http://localhost:3000/storage")
    pub base_url: String,
    /// Region reported as the function region
    pub region: LocalRegion,
    /// Account owning buckets created by this provider
    pub owner: String,
    pub signing_secret: String,
    pub bucket_prefix: String,
    pub chromium_path: Option<PathBuf>,
    pub page_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BucketMetadata {
    owner: String,
    creation_date: i64,
    #[serde(default)]
    folder_expiry: bool,
}

/// Object addressed by a verified presigned URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresignedTarget {
    pub region: LocalRegion,
    pub bucket_name: String,
    pub key: String,
}

/// Local filesystem storage provider
#[derive(Clone)]
pub struct LocalProvider {
    settings: Arc<LocalProviderConfig>,
}

impl LocalProvider {
    /// Create a new LocalProvider, creating the root directory if needed.
    pub async fn new(settings: LocalProviderConfig) -> StorageResult<Self> {
        if settings.signing_secret.is_empty() {
            return Err(StorageError::ConfigError(
                "local signing secret must not be empty".to_string(),
            ));
        }

        fs::create_dir_all(&settings.root).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                settings.root.display(),
                e
            ))
        })?;

        Ok(LocalProvider {
            settings: Arc::new(LocalProviderConfig {
                page_size: settings.page_size.max(1),
                ..settings
            }),
        })
    }

    fn region_dir(&self, region: &LocalRegion) -> PathBuf {
        self.settings.root.join(region.as_str())
    }

    fn bucket_dir(&self, region: &LocalRegion, bucket_name: &str) -> StorageResult<PathBuf> {
        validate_bucket_name(bucket_name, None)?;
        Ok(self.region_dir(region).join(bucket_name))
    }

    /// Convert an object key to a filesystem path below the bucket directory
    ///
    /// Rejects keys containing path traversal sequences that could escape the
    /// bucket, and the name reserved for bucket metadata.
    fn key_to_path(&self, bucket_dir: &Path, key: &str) -> StorageResult<PathBuf> {
        validate_object_key(key)?;

        if key.contains('\\') {
            return Err(StorageError::InvalidKey(
                "Storage key contains invalid characters".to_string(),
            ));
        }

        // Every segment must name a real path component
        if key
            .split('/')
            .any(|segment| segment.is_empty() || segment == "." || segment == "..")
        {
            return Err(StorageError::InvalidKey(format!(
                "Storage key \"{}\" contains empty, \".\" or \"..\" segments",
                key
            )));
        }

        if key.split('/').next() == Some(BUCKET_METADATA_FILE) {
            return Err(StorageError::InvalidKey(format!(
                "\"{}\" is reserved",
                BUCKET_METADATA_FILE
            )));
        }

        let path = bucket_dir.join(key);

        // Symlinks inside the bucket must not lead outside of it
        if let (Ok(canonical), Ok(base)) = (path.canonicalize(), bucket_dir.canonicalize()) {
            if canonical.strip_prefix(&base).is_err() {
                return Err(StorageError::InvalidKey(
                    "Storage key resolves outside bucket directory".to_string(),
                ));
            }
        }

        Ok(path)
    }

    async fn load_bucket(
        &self,
        region: &LocalRegion,
        bucket_name: &str,
    ) -> StorageResult<(PathBuf, BucketMetadata)> {
        let dir = self.bucket_dir(region, bucket_name)?;
        let raw = match fs::read(dir.join(BUCKET_METADATA_FILE)).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == IoErrorKind::NotFound => {
                return Err(StorageError::BucketNotFound(bucket_name.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        let metadata = serde_json::from_slice(&raw).map_err(|e| {
            StorageError::backend(
                "read bucket metadata",
                describe_target(bucket_name, None),
                e,
            )
        })?;

        Ok((dir, metadata))
    }

    async fn store_bucket(&self, dir: &Path, metadata: &BucketMetadata) -> StorageResult<()> {
        let raw = serde_json::to_vec_pretty(metadata).map_err(|e| {
            StorageError::backend("write bucket metadata", dir.display().to_string(), e)
        })?;
        fs::write(dir.join(BUCKET_METADATA_FILE), raw).await?;
        Ok(())
    }

    /// Load a bucket and refuse access when `account` does not own it.
    async fn authorize(
        &self,
        region: &LocalRegion,
        bucket_name: &str,
        key: Option<&str>,
        account: Option<&str>,
    ) -> StorageResult<(PathBuf, BucketMetadata)> {
        let (dir, metadata) = self.load_bucket(region, bucket_name).await?;

        if let Some(account) = account {
            if metadata.owner != account {
                tracing::warn!(
                    bucket = %bucket_name,
                    region = %region,
                    account = %account,
                    "Bucket owner mismatch"
                );
                return Err(StorageError::PermissionDenied {
                    bucket: bucket_name.to_string(),
                    key: key.map(str::to_string),
                    message: format!(
                        "Access denied to {}: bucket is not owned by account \"{}\"",
                        describe_target(bucket_name, key),
                        account
                    ),
                });
            }
        }

        Ok((dir, metadata))
    }

    async fn purge_object(&self, path: &Path, key: &str, expiry: FolderExpiry) -> StorageResult<()> {
        match fs::remove_file(path).await {
            Ok(()) => {}
            Err(e) if e.kind() == IoErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        tracing::info!(
            path = %path.display(),
            key = %key,
            expiry = %expiry.label(),
            "Expired render object purged"
        );
        Ok(())
    }

    /// Purge the object at `path` when the bucket has folder expiry enabled and
    /// the object's retention class has run out. Returns whether it was purged.
    async fn purge_if_expired(
        &self,
        bucket: &BucketMetadata,
        path: &Path,
        key: &str,
    ) -> StorageResult<bool> {
        if !bucket.folder_expiry {
            return Ok(false);
        }
        let Some(expiry) = FolderExpiry::for_key(key) else {
            return Ok(false);
        };
        let last_modified = match fs::metadata(path).await {
            Ok(metadata) => to_utc(metadata.modified()),
            Err(e) if e.kind() == IoErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(e.into()),
        };
        match last_modified {
            Some(last_modified) if expiry.is_expired(last_modified, Utc::now()) => {
                self.purge_object(path, key, expiry).await?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn object_url(&self, region: &LocalRegion, bucket_name: &str, key: &str) -> String {
        let encoded_key = key
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect::<Vec<_>>()
            .join("/");
        format!(
            "{}/{}/{}/{}",
            self.settings.base_url.trim_end_matches('/'),
            region,
            bucket_name,
            encoded_key
        )
    }

    fn signature(
        &self,
        region: &LocalRegion,
        bucket_name: &str,
        key: &str,
        issued_at: i64,
        expires_in_seconds: u64,
    ) -> StorageResult<String> {
        let mut mac = HmacSha256::new_from_slice(self.settings.signing_secret.as_bytes())
            .map_err(|e| StorageError::ConfigError(format!("Invalid signing secret: {}", e)))?;
        mac.update(
            format!(
                "{}/{}/{}\n{}\n{}",
                region, bucket_name, key, issued_at, expires_in_seconds
            )
            .as_bytes(),
        );
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    fn sign_url(
        &self,
        region: &LocalRegion,
        bucket_name: &str,
        key: &str,
        expires_in: Duration,
        now: DateTime<Utc>,
    ) -> StorageResult<String> {
        let issued_at = now.timestamp();
        let expires_in_seconds = expires_in.as_secs();
        let signature = self.signature(region, bucket_name, key, issued_at, expires_in_seconds)?;

        Ok(format!(
            "{}?{}={}&{}={}&{}={}",
            self.object_url(region, bucket_name, key),
            DATE_PARAM,
            issued_at,
            EXPIRES_PARAM,
            expires_in_seconds,
            SIGNATURE_PARAM,
            signature
        ))
    }

    /// Check a presigned URL issued by this provider at time `now`.
    ///
    /// Malformed URLs fail with `InvalidKey`; expired or tampered URLs fail
    /// with `PermissionDenied`.
    pub fn verify_presigned_url(
        &self,
        presigned_url: &str,
        now: DateTime<Utc>,
    ) -> StorageResult<PresignedTarget> {
        let malformed = || StorageError::InvalidKey("malformed presigned URL".to_string());

        let parsed = url::Url::parse(presigned_url).map_err(|_| malformed())?;
        let mut issued_at = None;
        let mut expires_in = None;
        let mut provided = None;
        for (name, value) in parsed.query_pairs() {
            match name.as_ref() {
                DATE_PARAM => issued_at = value.parse::<i64>().ok(),
                EXPIRES_PARAM => expires_in = value.parse::<u64>().ok(),
                SIGNATURE_PARAM => provided = Some(value.into_owned()),
                _ => {}
            }
        }
        let (issued_at, expires_in, provided) = match (issued_at, expires_in, provided) {
            (Some(i), Some(e), Some(s)) => (i, e, s),
            _ => return Err(malformed()),
        };

        let base = self.settings.base_url.trim_end_matches('/');
        let path = presigned_url
            .split('?')
            .next()
            .and_then(|u| u.strip_prefix(base))
            .and_then(|rest| rest.strip_prefix('/'))
            .ok_or_else(malformed)?;
        let mut parts = path.splitn(3, '/');
        let (region, bucket_name, encoded_key) = match (parts.next(), parts.next(), parts.next()) {
            (Some(r), Some(b), Some(k)) if !k.is_empty() => (r, b, k),
            _ => return Err(malformed()),
        };
        let region: LocalRegion = region.parse().map_err(|_| malformed())?;
        let key = urlencoding::decode(encoded_key)
            .map_err(|_| malformed())?
            .into_owned();

        let denied = |message: &str| StorageError::PermissionDenied {
            bucket: bucket_name.to_string(),
            key: Some(key.clone()),
            message: message.to_string(),
        };

        let expected = self.signature(&region, bucket_name, &key, issued_at, expires_in)?;
        if !bool::from(expected.as_bytes().ct_eq(provided.as_bytes())) {
            return Err(denied("Presigned URL signature mismatch"));
        }

        let expires_at = issued_at.saturating_add(i64::try_from(expires_in).unwrap_or(i64::MAX));
        if now.timestamp() > expires_at {
            return Err(denied("Presigned URL has expired"));
        }

        Ok(PresignedTarget {
            region,
            bucket_name: bucket_name.to_string(),
            key,
        })
    }
}

fn to_utc(time: std::io::Result<std::time::SystemTime>) -> Option<DateTime<Utc>> {
    time.ok().map(DateTime::<Utc>::from)
}

/// Every object below `dir`, sorted by key.
fn collect_objects(dir: &Path, prefix: &str) -> StorageResult<Vec<BucketObject>> {
    let mut objects = Vec::new();

    for entry in WalkDir::new(dir).follow_links(false) {
        let entry = entry.map_err(std::io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(dir)
            .map_err(|e| StorageError::InvalidKey(e.to_string()))?;
        let key = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        if key == BUCKET_METADATA_FILE || !key.starts_with(prefix) {
            continue;
        }

        let metadata = entry.metadata().map_err(std::io::Error::from)?;
        let last_modified = to_utc(metadata.modified()).unwrap_or_default();
        objects.push(BucketObject {
            e_tag: format!(
                "\"{:x}-{:x}\"",
                metadata.len(),
                last_modified.timestamp_millis()
            ),
            key,
            last_modified,
            size: metadata.len(),
        });
    }

    objects.sort_by(|a, b| a.key.cmp(&b.key));
    Ok(objects)
}

#[async_trait]
impl StorageProvider for LocalProvider {
    type Region = LocalRegion;
    type Credentials = LocalCredentials;

    fn get_chromium_path(&self) -> Option<PathBuf> {
        self.settings.chromium_path.clone()
    }

    fn get_current_region_in_function(&self) -> StorageResult<LocalRegion> {
        Ok(self.settings.region.clone())
    }

    async fn get_buckets(
        &self,
        region: &LocalRegion,
        force_bucket_name: Option<&str>,
    ) -> StorageResult<Vec<BucketWithLocation<LocalRegion>>> {
        let mut entries = match fs::read_dir(self.region_dir(region)).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == IoErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut buckets = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            let wanted = match force_bucket_name {
                Some(forced) => name == forced,
                None => name.starts_with(&self.settings.bucket_prefix),
            };
            if !wanted {
                continue;
            }

            match self.load_bucket(region, &name).await {
                Ok((_, metadata)) => buckets.push(BucketWithLocation {
                    name,
                    creation_date: metadata.creation_date,
                    region: region.clone(),
                }),
                // Directories without metadata are not buckets
                Err(StorageError::BucketNotFound(_)) | Err(StorageError::InvalidBucketName { .. }) => {}
                Err(e) => return Err(e),
            }
        }

        buckets.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(buckets)
    }

    async fn create_bucket(&self, input: CreateBucketInput<LocalRegion>) -> StorageResult<()> {
        let dir = self.bucket_dir(&input.region, &input.bucket_name)?;

        if fs::try_exists(dir.join(BUCKET_METADATA_FILE)).await? {
            return Err(StorageError::BucketAlreadyExists(input.bucket_name));
        }

        fs::create_dir_all(&dir).await?;
        let metadata = BucketMetadata {
            owner: self.settings.owner.clone(),
            creation_date: Utc::now().timestamp_millis(),
            folder_expiry: false,
        };
        self.store_bucket(&dir, &metadata).await?;

        tracing::info!(
            path = %dir.display(),
            bucket = %input.bucket_name,
            region = %input.region,
            "Local bucket created"
        );

        Ok(())
    }

    async fn apply_life_cycle(
        &self,
        input: ApplyLifeCycleInput<LocalRegion, LocalCredentials>,
    ) -> StorageResult<()> {
        let Some(enable) = input.enable_folder_expiry else {
            return Ok(());
        };

        let account = input.custom_credentials.as_ref().map(|c| c.owner.as_str());
        let (dir, mut metadata) = self
            .authorize(&input.region, &input.bucket_name, None, account)
            .await?;

        metadata.folder_expiry = enable;
        self.store_bucket(&dir, &metadata).await?;

        tracing::info!(
            bucket = %input.bucket_name,
            region = %input.region,
            folder_expiry = enable,
            "Local lifecycle configuration applied"
        );

        Ok(())
    }

    async fn list_objects(
        &self,
        input: ListObjectsInput<LocalRegion>,
    ) -> StorageResult<ListObjectsPage> {
        let (dir, bucket) = self
            .authorize(
                &input.region,
                &input.bucket_name,
                None,
                input.expected_bucket_owner.as_deref(),
            )
            .await?;

        let prefix = input.prefix.clone();
        let walk_dir = dir.clone();
        let mut objects = tokio::task::spawn_blocking(move || collect_objects(&walk_dir, &prefix))
            .await
            .map_err(|e| StorageError::IoError(std::io::Error::other(e)))??;

        if bucket.folder_expiry {
            let now = Utc::now();
            let mut kept = Vec::with_capacity(objects.len());
            for object in objects {
                match FolderExpiry::for_key(&object.key) {
                    Some(expiry) if expiry.is_expired(object.last_modified, now) => {
                        self.purge_object(&dir.join(&object.key), &object.key, expiry)
                            .await?;
                    }
                    _ => kept.push(object),
                }
            }
            objects = kept;
        }

        // The continuation token is the last key of the previous page
        let mut remaining: Vec<BucketObject> = match input.continuation_token {
            Some(ref after) => objects.into_iter().filter(|o| o.key > *after).collect(),
            None => objects,
        };

        let next_continuation_token = if remaining.len() > self.settings.page_size {
            remaining.truncate(self.settings.page_size);
            remaining.last().map(|o| o.key.clone())
        } else {
            None
        };

        Ok(ListObjectsPage {
            objects: remaining,
            next_continuation_token,
        })
    }

    async fn delete_file(
        &self,
        input: DeleteFileInput<LocalRegion, LocalCredentials>,
    ) -> StorageResult<()> {
        let account = input.custom_credentials.as_ref().map(|c| c.owner.as_str());
        let (dir, _) = self
            .authorize(&input.region, &input.bucket_name, Some(&input.key), account)
            .await?;
        let path = self.key_to_path(&dir, &input.key)?;
        let start = Instant::now();

        match fs::remove_file(&path).await {
            Ok(()) => {}
            Err(e) if e.kind() == IoErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e.into()),
        }

        tracing::info!(
            path = %path.display(),
            key = %input.key,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage delete successful"
        );

        Ok(())
    }

    async fn bucket_exists(&self, input: BucketExistsInput<LocalRegion>) -> StorageResult<bool> {
        match self
            .authorize(
                &input.region,
                &input.bucket_name,
                None,
                input.expected_bucket_owner.as_deref(),
            )
            .await
        {
            Ok(_) => Ok(true),
            Err(StorageError::BucketNotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn read_file(&self, input: ReadFileInput<LocalRegion>) -> StorageResult<ByteStream> {
        let (dir, bucket) = self
            .authorize(
                &input.region,
                &input.bucket_name,
                Some(&input.key),
                input.expected_bucket_owner.as_deref(),
            )
            .await?;
        let path = self.key_to_path(&dir, &input.key)?;
        let start = Instant::now();

        if self.purge_if_expired(&bucket, &path, &input.key).await? {
            return Err(StorageError::NotFound {
                bucket: input.bucket_name,
                key: input.key,
            });
        }

        let target = describe_target(&input.bucket_name, Some(&input.key));
        let file = match fs::File::open(&path).await {
            Ok(file) => file,
            Err(e) if e.kind() == IoErrorKind::NotFound => {
                return Err(StorageError::NotFound {
                    bucket: input.bucket_name,
                    key: input.key,
                });
            }
            Err(e) => return Err(StorageError::backend("read_file", target, e)),
        };

        let key = input.key;
        let path_display = path.display().to_string();
        let stream = tokio_util::io::ReaderStream::new(file).map(move |item| {
            item.map_err(|e| {
                tracing::error!(
                    path = %path_display,
                    key = %key,
                    error = %e,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Local storage stream download error"
                );
                StorageError::backend("read_file", target.clone(), e)
            })
        });

        Ok(Box::pin(stream))
    }

    async fn write_file(
        &self,
        input: WriteFileInput<LocalRegion, LocalCredentials>,
    ) -> StorageResult<()> {
        let (dir, _) = self
            .authorize(
                &input.region,
                &input.bucket_name,
                Some(&input.key),
                input.expected_bucket_owner.as_deref(),
            )
            .await?;
        if let Some(ref credentials) = input.custom_credentials {
            self.authorize(
                &input.region,
                &input.bucket_name,
                Some(&input.key),
                Some(&credentials.owner),
            )
            .await?;
        }

        let path = self.key_to_path(&dir, &input.key)?;
        let target = describe_target(&input.bucket_name, Some(&input.key));
        let failed = |e: std::io::Error| StorageError::backend("write_file", target.clone(), e);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(failed)?;
        }

        let start = Instant::now();

        // Privacy and download behavior have no meaning on local disk
        let mut file = fs::File::create(&path).await.map_err(failed)?;
        let size = match input.body {
            FileBody::Bytes(data) => {
                file.write_all(&data).await.map_err(failed)?;
                data.len() as u64
            }
            FileBody::Reader(mut reader) => tokio::io::copy(&mut reader, &mut file)
                .await
                .map_err(failed)?,
        };
        file.sync_all().await.map_err(failed)?;

        tracing::info!(
            path = %path.display(),
            key = %input.key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage upload successful"
        );

        Ok(())
    }

    async fn head_file(
        &self,
        input: HeadFileInput<LocalRegion, LocalCredentials>,
    ) -> StorageResult<HeadFileOutput> {
        let account = input.custom_credentials.as_ref().map(|c| c.owner.as_str());
        let (dir, bucket) = self
            .authorize(&input.region, &input.bucket_name, Some(&input.key), account)
            .await?;
        let path = self.key_to_path(&dir, &input.key)?;

        if self.purge_if_expired(&bucket, &path, &input.key).await? {
            return Err(StorageError::NotFound {
                bucket: input.bucket_name,
                key: input.key,
            });
        }

        let metadata = match fs::metadata(&path).await {
            Ok(metadata) if metadata.is_file() => metadata,
            Ok(_) => {
                return Err(StorageError::NotFound {
                    bucket: input.bucket_name,
                    key: input.key,
                })
            }
            Err(e) if e.kind() == IoErrorKind::NotFound => {
                return Err(StorageError::NotFound {
                    bucket: input.bucket_name,
                    key: input.key,
                });
            }
            Err(e) => return Err(e.into()),
        };

        Ok(HeadFileOutput {
            last_modified: to_utc(metadata.modified()),
            content_length: Some(metadata.len()),
        })
    }

    fn convert_to_serve_url(&self, input: ConvertToServeUrlInput<'_, LocalRegion>) -> String {
        if input.url_or_id.starts_with("https://") || input.url_or_id.starts_with("http://") {
            return input.url_or_id.to_string();
        }

        format!(
            "{}/{}/{}/{}",
            self.settings.base_url.trim_end_matches('/'),
            input.region,
            input.bucket_name,
            site_index_key(input.url_or_id)
        )
    }

    fn print_logging_helper(&self) -> bool {
        false
    }

    fn provider(&self) -> ProviderKind {
        ProviderKind::Local
    }
}

/// Presign client for one local region, acting as the provider's own account
#[derive(Clone)]
pub struct LocalPresignClient {
    provider: LocalProvider,
    region: LocalRegion,
}

#[async_trait]
impl PresignClient for LocalPresignClient {
    async fn head_object(&self, bucket_name: &str, object_key: &str) -> StorageResult<()> {
        let owner = self.provider.settings.owner.clone();
        self.provider
            .head_file(HeadFileInput {
                bucket_name: bucket_name.to_string(),
                key: object_key.to_string(),
                region: self.region.clone(),
                custom_credentials: Some(LocalCredentials { owner }),
            })
            .await
            .map(|_| ())
    }

    async fn presign_get(
        &self,
        bucket_name: &str,
        object_key: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        self.provider
            .sign_url(&self.region, bucket_name, object_key, expires_in, Utc::now())
    }
}

impl PresignClientFactory for LocalProvider {
    type Region = LocalRegion;
    type Client = LocalPresignClient;

    /// Path style is the only addressing style on local disk.
    fn presign_client(
        &self,
        region: &LocalRegion,
        _force_path_style: bool,
    ) -> StorageResult<LocalPresignClient> {
        Ok(LocalPresignClient {
            provider: self.clone(),
            region: region.clone(),
        })
    }
}
