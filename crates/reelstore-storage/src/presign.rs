//! Presigned URL issuance
//!
//! Produces time-limited, credential-free URLs for single objects,
//! optionally verifying that the object exists first. Expiry is enforced by
//! the backend; issued URLs are not tracked.

use crate::error::{StorageError, StorageResult};
use crate::validation::{validate_bucket_name, validate_presign_expiration};
use async_trait::async_trait;
use std::time::Duration;

/// Client able to check and sign single objects
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PresignClient: Send + Sync {
    /// Existence check. Must map absence to `NotFound` and authorization
    /// failures to `PermissionDenied`.
    async fn head_object(&self, bucket_name: &str, object_key: &str) -> StorageResult<()>;

    /// Signed GET URL valid for `expires_in` from now.
    async fn presign_get(
        &self,
        bucket_name: &str,
        object_key: &str,
        expires_in: Duration,
    ) -> StorageResult<String>;
}

/// Builds region-scoped presign clients using default credentials
#[cfg_attr(
    test,
    mockall::automock(type Region = crate::region::AwsRegion; type Client = MockPresignClient;)
)]
pub trait PresignClientFactory: Send + Sync {
    type Region: Send + Sync;
    type Client: PresignClient;

    fn presign_client(
        &self,
        region: &Self::Region,
        force_path_style: bool,
    ) -> StorageResult<Self::Client>;
}

#[derive(Debug, Clone)]
pub struct PresignUrlInput<R> {
    pub region: R,
    pub bucket_name: String,
    pub object_key: String,
    pub expires_in_seconds: u64,
    pub force_path_style: bool,
}

impl<R> PresignUrlInput<R> {
    pub fn new(
        region: R,
        bucket_name: impl Into<String>,
        object_key: impl Into<String>,
        expires_in_seconds: u64,
    ) -> Self {
        Self {
            region,
            bucket_name: bucket_name.into(),
            object_key: object_key.into(),
            expires_in_seconds,
            force_path_style: false,
        }
    }

    pub fn with_force_path_style(mut self, force_path_style: bool) -> Self {
        self.force_path_style = force_path_style;
        self
    }
}

/// Presign an object without checking that it exists.
pub async fn presign_url<F>(factory: &F, input: &PresignUrlInput<F::Region>) -> StorageResult<String>
where
    F: PresignClientFactory + ?Sized,
{
    let client = prepare(factory, input)?;
    sign(&client, input).await
}

/// Presign an object only if it exists.
///
/// Returns `Ok(None)` when the object is absent. An authorization failure
/// during the existence check becomes a `PermissionDenied` naming both capabilities
/// the caller needs.
pub async fn presign_url_if_exists<F>(
    factory: &F,
    input: &PresignUrlInput<F::Region>,
) -> StorageResult<Option<String>>
where
    F: PresignClientFactory + ?Sized,
{
    let client = prepare(factory, input)?;

    match client
        .head_object(&input.bucket_name, &input.object_key)
        .await
    {
        Ok(()) => {}
        Err(StorageError::NotFound { .. }) => {
            tracing::debug!(
                bucket = %input.bucket_name,
                key = %input.object_key,
                "Object absent, not presigning"
            );
            return Ok(None);
        }
        Err(StorageError::PermissionDenied { .. }) => {
            return Err(StorageError::PermissionDenied {
                bucket: input.bucket_name.clone(),
                key: Some(input.object_key.clone()),
                message: format!(
                    "Unable to access item \"{}\" from bucket \"{}\". You must have permission for both object-read (\"s3:GetObject\") and bucket-list (\"s3:ListBucket\") actions.",
                    input.object_key, input.bucket_name
                ),
            });
        }
        Err(other) => return Err(other),
    }

    sign(&client, input).await.map(Some)
}

fn prepare<F>(factory: &F, input: &PresignUrlInput<F::Region>) -> StorageResult<F::Client>
where
    F: PresignClientFactory + ?Sized,
{
    validate_bucket_name(&input.bucket_name, None)?;
    validate_presign_expiration(input.expires_in_seconds)?;

    factory.presign_client(&input.region, input.force_path_style)
}

async fn sign<C, R>(client: &C, input: &PresignUrlInput<R>) -> StorageResult<String>
where
    C: PresignClient + ?Sized,
{
    let url = client
        .presign_get(
            &input.bucket_name,
            &input.object_key,
            Duration::from_secs(input.expires_in_seconds),
        )
        .await?;

    tracing::debug!(
        bucket = %input.bucket_name,
        key = %input.object_key,
        expires_in_seconds = input.expires_in_seconds,
        "Presigned URL issued"
    );

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::region::AwsRegion;
    use mockall::predicate::eq;

    const SIGNED: &str = "https://my-bucket.s3.us-east-1.amazonaws.com/renders/out.mp4?X-Amz-Expires=120";

    fn input(expires: u64) -> PresignUrlInput<AwsRegion> {
        PresignUrlInput::new(AwsRegion::UsEast1, "my-bucket", "renders/out.mp4", expires)
    }

    fn factory_with(client: MockPresignClient) -> MockPresignClientFactory {
        let mut factory = MockPresignClientFactory::new();
        factory
            .expect_presign_client()
            .with(eq(AwsRegion::UsEast1), eq(false))
            .times(1)
            .return_once(move |_, _| Ok(client));
        factory
    }

    fn signing_client() -> MockPresignClient {
        let mut client = MockPresignClient::new();
        client
            .expect_presign_get()
            .with(
                eq("my-bucket"),
                eq("renders/out.mp4"),
                eq(Duration::from_secs(120)),
            )
            .times(1)
            .returning(|_, _, _| Ok(SIGNED.to_string()));
        client
    }

    #[tokio::test]
    async fn test_presign_without_check_returns_url() {
        let mut client = signing_client();
        client.expect_head_object().times(0);
        let factory = factory_with(client);

        let url = presign_url(&factory, &input(120)).await.unwrap();
        assert_eq!(url, SIGNED);
    }

    #[tokio::test]
    async fn test_presign_if_exists_returns_same_url_when_present() {
        let mut client = signing_client();
        client
            .expect_head_object()
            .with(eq("my-bucket"), eq("renders/out.mp4"))
            .times(1)
            .returning(|_, _| Ok(()));
        let factory = factory_with(client);

        let url = presign_url_if_exists(&factory, &input(120)).await.unwrap();
        assert_eq!(url.as_deref(), Some(SIGNED));
    }

    #[tokio::test]
    async fn test_presign_if_exists_returns_none_when_absent() {
        let mut client = MockPresignClient::new();
        client.expect_head_object().times(1).returning(|bucket, key| {
            Err(StorageError::NotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            })
        });
        client.expect_presign_get().times(0);
        let factory = factory_with(client);

        let url = presign_url_if_exists(&factory, &input(120)).await.unwrap();
        assert_eq!(url, None);
    }

    #[tokio::test]
    async fn test_permission_error_names_both_capabilities() {
        let mut client = MockPresignClient::new();
        client.expect_head_object().times(1).returning(|bucket, key| {
            Err(StorageError::PermissionDenied {
                bucket: bucket.to_string(),
                key: Some(key.to_string()),
                message: "Forbidden".to_string(),
            })
        });
        client.expect_presign_get().times(0);
        let factory = factory_with(client);

        let err = presign_url_if_exists(&factory, &input(120))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Permission);
        let message = err.to_string();
        assert!(message.contains("object-read"));
        assert!(message.contains("bucket-list"));
        assert!(message.contains("my-bucket"));
        assert!(message.contains("renders/out.mp4"));
    }

    #[tokio::test]
    async fn test_other_head_errors_propagate() {
        let mut client = MockPresignClient::new();
        client.expect_head_object().times(1).returning(|_, _| {
            Err(StorageError::backend(
                "head_object",
                "\"renders/out.mp4\" in bucket \"my-bucket\"",
                "connection reset",
            ))
        });
        client.expect_presign_get().times(0);
        let factory = factory_with(client);

        let err = presign_url_if_exists(&factory, &input(120))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert!(err.to_string().contains("connection reset"));
    }

    #[tokio::test]
    async fn test_invalid_expiration_never_builds_a_client() {
        for expires in [0, 604_801] {
            let mut factory = MockPresignClientFactory::new();
            factory.expect_presign_client().times(0);

            let err = presign_url(&factory, &input(expires)).await.unwrap_err();
            assert!(matches!(err, StorageError::InvalidExpiration(_)));

            let err = presign_url_if_exists(&factory, &input(expires))
                .await
                .unwrap_err();
            assert!(matches!(err, StorageError::InvalidExpiration(_)));
        }
    }

    #[tokio::test]
    async fn test_invalid_bucket_name_never_builds_a_client() {
        let mut factory = MockPresignClientFactory::new();
        factory.expect_presign_client().times(0);

        let bad = PresignUrlInput::new(AwsRegion::UsEast1, "Bad_Bucket", "key", 120);
        let err = presign_url(&factory, &bad).await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidBucketName { .. }));
    }

    #[tokio::test]
    async fn test_bucket_without_reserved_prefix_is_accepted() {
        let factory = factory_with(signing_client());
        assert!(presign_url(&factory, &input(120)).await.is_ok());
    }

    #[tokio::test]
    async fn test_force_path_style_is_forwarded() {
        let mut client = MockPresignClient::new();
        client
            .expect_presign_get()
            .returning(|_, _, _| Ok("https://s3.us-east-1.amazonaws.com/my-bucket/k".to_string()));
        let mut factory = MockPresignClientFactory::new();
        factory
            .expect_presign_client()
            .with(eq(AwsRegion::UsEast1), eq(true))
            .times(1)
            .return_once(move |_, _| Ok(client));

        let request = input(60).with_force_path_style(true);
        assert!(presign_url(&factory, &request).await.is_ok());
    }
}
