//! Bucket, object and file I/O value types
//!
//! All of these are transient request/response values. The object store is
//! the source of truth; nothing here is cached.

use crate::error::StorageResult;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::Stream;
use serde::Serialize;
use std::fmt;
use std::pin::Pin;
use std::str::FromStr;
use tokio::io::{AsyncRead, AsyncReadExt};

/// Lazily consumed object content
pub type ByteStream = Pin<Box<dyn Stream<Item = StorageResult<Bytes>> + Send>>;

/// A bucket together with the region it lives in
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketWithLocation<R> {
    pub name: String,
    /// Milliseconds since the Unix epoch
    pub creation_date: i64,
    pub region: R,
}

/// One entry of an object listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketObject {
    pub key: String,
    pub last_modified: DateTime<Utc>,
    pub e_tag: String,
    pub size: u64,
}

/// One page of an object listing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListObjectsPage {
    pub objects: Vec<BucketObject>,
    /// Opaque cursor for the next page, `None` on the last page
    pub next_continuation_token: Option<String>,
}

/// Access level applied to written objects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Privacy {
    Public,
    #[default]
    Private,
    /// Do not send an ACL at all (buckets with ACLs disabled)
    NoAcl,
}

impl FromStr for Privacy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "public" => Ok(Privacy::Public),
            "private" => Ok(Privacy::Private),
            "no-acl" => Ok(Privacy::NoAcl),
            other => Err(format!(
                "invalid privacy \"{}\", expected public, private or no-acl",
                other
            )),
        }
    }
}

impl fmt::Display for Privacy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Privacy::Public => write!(f, "public"),
            Privacy::Private => write!(f, "private"),
            Privacy::NoAcl => write!(f, "no-acl"),
        }
    }
}

/// How a browser should treat the object when opened from its URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadBehavior {
    PlayInBrowser,
    Download { file_name: Option<String> },
}

impl DownloadBehavior {
    /// `Content-Disposition` header value, if one must be set
    pub fn content_disposition(&self) -> Option<String> {
        match self {
            DownloadBehavior::PlayInBrowser => None,
            DownloadBehavior::Download { file_name: None } => Some("attachment".to_string()),
            DownloadBehavior::Download {
                file_name: Some(name),
            } => Some(format!(
                "attachment; filename=\"{}\"",
                name.replace('\\', "\\\\").replace('"', "\\\"")
            )),
        }
    }
}

/// Object content handed to `write_file`
pub enum FileBody {
    Bytes(Bytes),
    Reader(Pin<Box<dyn AsyncRead + Send + Unpin>>),
}

impl FileBody {
    /// Buffer the whole body in memory.
    pub async fn into_bytes(self) -> std::io::Result<Bytes> {
        match self {
            FileBody::Bytes(bytes) => Ok(bytes),
            FileBody::Reader(mut reader) => {
                let mut buffer = Vec::new();
                reader.read_to_end(&mut buffer).await?;
                Ok(Bytes::from(buffer))
            }
        }
    }
}

impl fmt::Debug for FileBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileBody::Bytes(bytes) => write!(f, "FileBody::Bytes({} bytes)", bytes.len()),
            FileBody::Reader(_) => write!(f, "FileBody::Reader"),
        }
    }
}

impl From<Bytes> for FileBody {
    fn from(bytes: Bytes) -> Self {
        FileBody::Bytes(bytes)
    }
}

impl From<Vec<u8>> for FileBody {
    fn from(data: Vec<u8>) -> Self {
        FileBody::Bytes(Bytes::from(data))
    }
}

impl From<String> for FileBody {
    fn from(text: String) -> Self {
        FileBody::Bytes(Bytes::from(text))
    }
}

impl From<&'static str> for FileBody {
    fn from(text: &'static str) -> Self {
        FileBody::Bytes(Bytes::from_static(text.as_bytes()))
    }
}

#[derive(Debug, Clone)]
pub struct CreateBucketInput<R> {
    pub region: R,
    pub bucket_name: String,
}

#[derive(Debug, Clone)]
pub struct ApplyLifeCycleInput<R, C> {
    /// `None` leaves the bucket's lifecycle configuration untouched
    pub enable_folder_expiry: Option<bool>,
    pub bucket_name: String,
    pub region: R,
    pub custom_credentials: Option<C>,
}

#[derive(Debug, Clone)]
pub struct ListObjectsInput<R> {
    pub bucket_name: String,
    pub prefix: String,
    pub region: R,
    pub expected_bucket_owner: Option<String>,
    pub continuation_token: Option<String>,
}

#[derive(Debug, Clone)]
pub struct DeleteFileInput<R, C> {
    pub bucket_name: String,
    pub key: String,
    pub region: R,
    pub custom_credentials: Option<C>,
}

#[derive(Debug, Clone)]
pub struct BucketExistsInput<R> {
    pub bucket_name: String,
    pub region: R,
    pub expected_bucket_owner: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ReadFileInput<R> {
    pub bucket_name: String,
    pub key: String,
    pub region: R,
    pub expected_bucket_owner: Option<String>,
}

#[derive(Debug)]
pub struct WriteFileInput<R, C> {
    pub bucket_name: String,
    pub key: String,
    pub body: FileBody,
    pub region: R,
    pub privacy: Privacy,
    pub expected_bucket_owner: Option<String>,
    pub download_behavior: Option<DownloadBehavior>,
    pub custom_credentials: Option<C>,
}

#[derive(Debug, Clone)]
pub struct HeadFileInput<R, C> {
    pub bucket_name: String,
    pub key: String,
    pub region: R,
    pub custom_credentials: Option<C>,
}

/// Object metadata returned by `head_file`. Not every backend reports both fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeadFileOutput {
    pub last_modified: Option<DateTime<Utc>>,
    pub content_length: Option<u64>,
}

#[derive(Debug, Clone, Copy)]
pub struct ConvertToServeUrlInput<'a, R> {
    pub url_or_id: &'a str,
    pub region: &'a R,
    pub bucket_name: &'a str,
}

/// A file found below a local directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FolderFile {
    /// Path relative to the listed directory, `/`-separated
    pub name: String,
    pub size: u64,
}
