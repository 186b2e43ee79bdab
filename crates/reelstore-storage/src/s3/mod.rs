//! S3 storage provider
//!
//! Clients are built per call from one shared `SdkConfig`, scoped to the
//! call's region and, when supplied, to the call's custom credentials.
//! All SDK errors go through `errors::from_sdk` before leaving this module.

mod client;
mod errors;

use crate::error::{describe_target, StorageError, StorageResult};
use crate::keys::site_index_key;
use crate::lifecycle::folder_expiry_rules;
use crate::model::{
    ApplyLifeCycleInput, BucketExistsInput, BucketObject, BucketWithLocation, ByteStream,
    ConvertToServeUrlInput, CreateBucketInput, DeleteFileInput, DownloadBehavior, HeadFileInput,
    HeadFileOutput, ListObjectsInput, ListObjectsPage, Privacy, ReadFileInput, WriteFileInput,
};
use crate::presign::{PresignClient, PresignClientFactory};
use crate::region::AwsRegion;
use crate::traits::StorageProvider;
use crate::validation::{validate_bucket_name, validate_object_key};
use crate::ProviderKind;
use async_trait::async_trait;
use aws_config::{BehaviorVersion, SdkConfig};
use aws_sdk_s3::error::ProvideErrorMetadata;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream as S3ByteStream;
use aws_sdk_s3::types::{
    BucketLifecycleConfiguration, BucketLocationConstraint, CreateBucketConfiguration,
    ExpirationStatus, LifecycleExpiration, LifecycleRule, LifecycleRuleFilter, ObjectCannedAcl,
    ObjectOwnership, PublicAccessBlockConfiguration,
};
use aws_sdk_s3::Client;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Browser binary location inside the function runtime image
const FUNCTION_CHROMIUM_PATH: &str = "/opt/bin/chromium";

/// Static credentials overriding the default credential chain for one call
#[derive(Clone)]
pub struct AwsCustomCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    /// Endpoint of an S3-compatible service these credentials belong to
    pub endpoint: Option<String>,
}

impl fmt::Debug for AwsCustomCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AwsCustomCredentials")
            .field(
                "access_key_id",
                &format!(
                    "{}****",
                    self.access_key_id.chars().take(4).collect::<String>()
                ),
            )
            .field("secret_access_key", &"****")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

/// Settings of the S3 provider
#[derive(Debug, Clone, Default)]
pub struct S3ProviderConfig {
    /// Custom endpoint for S3-compatible providers (e.g. "http://localhost:9000" for MinIO)
    pub endpoint: Option<String>,
    pub force_path_style: bool,
    /// Buckets not starting with this prefix are ignored by `get_buckets`
    pub bucket_prefix: String,
    pub chromium_path: Option<PathBuf>,
    /// Region reported by the function runtime (AWS_REGION)
    pub function_region: Option<String>,
    pub running_in_function: bool,
}

/// S3 storage provider
#[derive(Clone)]
pub struct S3Provider {
    sdk_config: SdkConfig,
    settings: Arc<S3ProviderConfig>,
}

impl S3Provider {
    /// Create a provider using the default AWS credential chain.
    pub async fn new(settings: S3ProviderConfig) -> Self {
        let sdk_config = aws_config::defaults(BehaviorVersion::latest()).load().await;
        Self::with_sdk_config(sdk_config, settings)
    }

    /// Create a provider from an already loaded SDK configuration.
    pub fn with_sdk_config(sdk_config: SdkConfig, settings: S3ProviderConfig) -> Self {
        S3Provider {
            sdk_config,
            settings: Arc::new(settings),
        }
    }

    fn client(
        &self,
        region: AwsRegion,
        custom_credentials: Option<&AwsCustomCredentials>,
    ) -> Client {
        client::build_client(
            &self.sdk_config,
            region,
            self.settings.endpoint.as_deref(),
            custom_credentials,
            self.settings.force_path_style,
        )
    }

    /// Public base URL of a bucket
    ///
    /// For AWS S3, uses the standard format: https://{bucket}.s3.{region}.amazonaws.com
    /// For S3-compatible providers, uses the endpoint URL with path-style addressing
    fn bucket_url(&self, bucket_name: &str, region: &AwsRegion) -> String {
        match self.settings.endpoint {
            Some(ref endpoint) => format!("{}/{}", endpoint.trim_end_matches('/'), bucket_name),
            None if self.settings.force_path_style => {
                format!("https://s3.{}.amazonaws.com/{}", region, bucket_name)
            }
            None => format!("https://{}.s3.{}.amazonaws.com", bucket_name, region),
        }
    }
}

fn to_utc(value: &aws_sdk_s3::primitives::DateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(value.to_millis().ok()?)
}

/// Keep the buckets located in `region`.
///
/// Buckets in regions this provider does not know are skipped: they cannot
/// be in `region` either.
fn filter_buckets_in_region(
    region: &AwsRegion,
    buckets: Vec<(String, i64, Option<String>)>,
) -> Vec<BucketWithLocation<AwsRegion>> {
    buckets
        .into_iter()
        .filter_map(|(name, creation_date, location)| {
            let bucket_region = match AwsRegion::from_location_constraint(location.as_deref()) {
                Ok(bucket_region) => bucket_region,
                Err(e) => {
                    tracing::debug!(bucket = %name, error = %e, "Skipping bucket in unknown region");
                    return None;
                }
            };
            (bucket_region == *region).then_some(BucketWithLocation {
                name,
                creation_date,
                region: bucket_region,
            })
        })
        .collect()
}

/// Fetch one ListObjectsV2 page. Continuation tokens are passed through untouched.
async fn list_objects_page(
    client: &Client,
    input: &ListObjectsInput<AwsRegion>,
) -> StorageResult<ListObjectsPage> {
    let start = Instant::now();

    let output = client
        .list_objects_v2()
        .bucket(&input.bucket_name)
        .prefix(&input.prefix)
        .set_expected_bucket_owner(input.expected_bucket_owner.clone())
        .set_continuation_token(input.continuation_token.clone())
        .send()
        .await
        .map_err(|e| errors::from_sdk("list_objects_v2", &input.bucket_name, None, e))?;

    let objects: Vec<BucketObject> = output
        .contents()
        .iter()
        .map(|object| BucketObject {
            key: object.key().unwrap_or_default().to_string(),
            last_modified: object
                .last_modified()
                .and_then(to_utc)
                .unwrap_or_default(),
            e_tag: object.e_tag().unwrap_or_default().to_string(),
            size: object.size().unwrap_or_default().max(0) as u64,
        })
        .collect();

    tracing::debug!(
        bucket = %input.bucket_name,
        prefix = %input.prefix,
        object_count = objects.len(),
        truncated = output.next_continuation_token().is_some(),
        duration_ms = start.elapsed().as_secs_f64() * 1000.0,
        "S3 list page fetched"
    );

    Ok(ListObjectsPage {
        objects,
        next_continuation_token: output.next_continuation_token().map(str::to_string),
    })
}

/// Lifecycle configuration holding every folder expiry rule.
fn folder_expiry_configuration() -> StorageResult<BucketLifecycleConfiguration> {
    let rules = folder_expiry_rules()
        .into_iter()
        .map(|rule| {
            LifecycleRule::builder()
                .id(rule.id)
                .filter(LifecycleRuleFilter::builder().prefix(rule.prefix).build())
                .expiration(
                    LifecycleExpiration::builder()
                        .days(rule.expiration_days)
                        .build(),
                )
                .status(ExpirationStatus::Enabled)
                .build()
                .map_err(|e| StorageError::ConfigError(e.to_string()))
        })
        .collect::<StorageResult<Vec<_>>>()?;

    BucketLifecycleConfiguration::builder()
        .set_rules(Some(rules))
        .build()
        .map_err(|e| StorageError::ConfigError(e.to_string()))
}

#[async_trait]
impl StorageProvider for S3Provider {
    type Region = AwsRegion;
    type Credentials = AwsCustomCredentials;

    fn get_chromium_path(&self) -> Option<PathBuf> {
        self.settings.chromium_path.clone().or_else(|| {
            self.settings
                .running_in_function
                .then(|| PathBuf::from(FUNCTION_CHROMIUM_PATH))
        })
    }

    fn get_current_region_in_function(&self) -> StorageResult<AwsRegion> {
        let raw = self.settings.function_region.as_deref().ok_or_else(|| {
            StorageError::RegionUnavailable("AWS_REGION is not set".to_string())
        })?;
        raw.parse().map_err(|e: StorageError| {
            StorageError::RegionUnavailable(format!("AWS_REGION is unusable: {}", e))
        })
    }

    async fn get_buckets(
        &self,
        region: &AwsRegion,
        force_bucket_name: Option<&str>,
    ) -> StorageResult<Vec<BucketWithLocation<AwsRegion>>> {
        let start = Instant::now();
        let client = self.client(*region, None);

        let output = client
            .list_buckets()
            .send()
            .await
            .map_err(|e| errors::from_sdk("list_buckets", "(all buckets)", None, e))?;

        let candidates: Vec<(String, i64)> = output
            .buckets()
            .iter()
            .filter_map(|bucket| {
                let name = bucket.name()?;
                let wanted = match force_bucket_name {
                    Some(forced) => name == forced,
                    None => name.starts_with(&self.settings.bucket_prefix),
                };
                if !wanted {
                    return None;
                }
                let creation_date = bucket
                    .creation_date()
                    .and_then(|d| d.to_millis().ok())
                    .unwrap_or_default();
                Some((name.to_string(), creation_date))
            })
            .collect();

        let locations = join_all(candidates.iter().map(|(name, _)| {
            let client = client.clone();
            async move {
                let output = client
                    .get_bucket_location()
                    .bucket(name)
                    .send()
                    .await
                    .map_err(|e| errors::from_sdk("get_bucket_location", name, None, e))?;
                Ok::<_, StorageError>(
                    output
                        .location_constraint()
                        .map(|c| c.as_str().to_string()),
                )
            }
        }))
        .await;

        let mut located = Vec::with_capacity(candidates.len());
        for ((name, creation_date), location) in candidates.into_iter().zip(locations) {
            located.push((name, creation_date, location?));
        }
        let buckets = filter_buckets_in_region(region, located);

        tracing::info!(
            region = %region,
            bucket_count = buckets.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 bucket listing successful"
        );

        Ok(buckets)
    }

    async fn create_bucket(&self, input: CreateBucketInput<AwsRegion>) -> StorageResult<()> {
        validate_bucket_name(&input.bucket_name, None)?;
        let start = Instant::now();
        let client = self.client(input.region, None);

        let mut request = client
            .create_bucket()
            .bucket(&input.bucket_name)
            .object_ownership(ObjectOwnership::ObjectWriter);

        // us-east-1 rejects an explicit location constraint
        if input.region != AwsRegion::UsEast1 {
            request = request.create_bucket_configuration(
                CreateBucketConfiguration::builder()
                    .location_constraint(BucketLocationConstraint::from(input.region.as_str()))
                    .build(),
            );
        }

        request.send().await.map_err(|e| {
            match e.code() {
                Some("BucketAlreadyExists") | Some("BucketAlreadyOwnedByYou") => {
                    StorageError::BucketAlreadyExists(input.bucket_name.clone())
                }
                _ => errors::from_sdk("create_bucket", &input.bucket_name, None, e),
            }
        })?;

        // Public renders need object ACLs to take effect
        client
            .put_public_access_block()
            .bucket(&input.bucket_name)
            .public_access_block_configuration(
                PublicAccessBlockConfiguration::builder()
                    .block_public_acls(false)
                    .ignore_public_acls(false)
                    .block_public_policy(false)
                    .restrict_public_buckets(false)
                    .build(),
            )
            .send()
            .await
            .map_err(|e| errors::from_sdk("put_public_access_block", &input.bucket_name, None, e))?;

        tracing::info!(
            bucket = %input.bucket_name,
            region = %input.region,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 bucket created"
        );

        Ok(())
    }

    async fn apply_life_cycle(
        &self,
        input: ApplyLifeCycleInput<AwsRegion, AwsCustomCredentials>,
    ) -> StorageResult<()> {
        let Some(enable) = input.enable_folder_expiry else {
            tracing::debug!(bucket = %input.bucket_name, "Folder expiry left unchanged");
            return Ok(());
        };

        let client = self.client(input.region, input.custom_credentials.as_ref());

        if enable {
            let configuration = folder_expiry_configuration()?;
            client
                .put_bucket_lifecycle_configuration()
                .bucket(&input.bucket_name)
                .lifecycle_configuration(configuration)
                .send()
                .await
                .map_err(|e| {
                    errors::from_sdk(
                        "put_bucket_lifecycle_configuration",
                        &input.bucket_name,
                        None,
                        e,
                    )
                })?;
        } else {
            client
                .delete_bucket_lifecycle()
                .bucket(&input.bucket_name)
                .send()
                .await
                .map_err(|e| {
                    errors::from_sdk("delete_bucket_lifecycle", &input.bucket_name, None, e)
                })?;
        }

        tracing::info!(
            bucket = %input.bucket_name,
            region = %input.region,
            folder_expiry = enable,
            "S3 lifecycle configuration applied"
        );

        Ok(())
    }

    async fn list_objects(
        &self,
        input: ListObjectsInput<AwsRegion>,
    ) -> StorageResult<ListObjectsPage> {
        let client = self.client(input.region, None);
        list_objects_page(&client, &input).await
    }

    async fn delete_file(
        &self,
        input: DeleteFileInput<AwsRegion, AwsCustomCredentials>,
    ) -> StorageResult<()> {
        let start = Instant::now();
        let client = self.client(input.region, input.custom_credentials.as_ref());

        // S3 answers 204 for missing keys as well
        client
            .delete_object()
            .bucket(&input.bucket_name)
            .key(&input.key)
            .send()
            .await
            .map_err(|e| errors::from_sdk("delete_object", &input.bucket_name, Some(&input.key), e))?;

        tracing::info!(
            bucket = %input.bucket_name,
            key = %input.key,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 delete successful"
        );

        Ok(())
    }

    async fn bucket_exists(&self, input: BucketExistsInput<AwsRegion>) -> StorageResult<bool> {
        let client = self.client(input.region, None);

        let result = client
            .head_bucket()
            .bucket(&input.bucket_name)
            .set_expected_bucket_owner(input.expected_bucket_owner.clone())
            .send()
            .await;

        match result {
            Ok(_) => Ok(true),
            Err(e) => match errors::from_sdk("head_bucket", &input.bucket_name, None, e) {
                StorageError::BucketNotFound(_) => Ok(false),
                other => Err(other),
            },
        }
    }

    async fn read_file(&self, input: ReadFileInput<AwsRegion>) -> StorageResult<ByteStream> {
        let client = self.client(input.region, None);

        let output = client
            .get_object()
            .bucket(&input.bucket_name)
            .key(&input.key)
            .set_expected_bucket_owner(input.expected_bucket_owner.clone())
            .send()
            .await
            .map_err(|e| errors::from_sdk("get_object", &input.bucket_name, Some(&input.key), e))?;

        let target = describe_target(&input.bucket_name, Some(&input.key));
        let stream = futures::stream::unfold(output.body, move |mut body| {
            let target = target.clone();
            async move {
                match body.next().await? {
                    Ok(chunk) => Some((Ok(chunk), body)),
                    Err(e) => {
                        tracing::error!(error = %e, target = %target, "S3 stream download error");
                        Some((Err(StorageError::backend("get_object", target, e)), body))
                    }
                }
            }
        });

        Ok(Box::pin(stream))
    }

    async fn write_file(
        &self,
        input: WriteFileInput<AwsRegion, AwsCustomCredentials>,
    ) -> StorageResult<()> {
        validate_object_key(&input.key)?;
        let start = Instant::now();
        let client = self.client(input.region, input.custom_credentials.as_ref());

        // The SDK needs a sized body; readers are buffered first.
        let body = input.body.into_bytes().await?;
        let size = body.len();
        let content_type = mime_guess::from_path(&input.key)
            .first_or_octet_stream()
            .to_string();

        let mut request = client
            .put_object()
            .bucket(&input.bucket_name)
            .key(&input.key)
            .body(S3ByteStream::from(body))
            .content_type(content_type)
            .set_expected_bucket_owner(input.expected_bucket_owner.clone())
            .set_content_disposition(
                input
                    .download_behavior
                    .as_ref()
                    .and_then(DownloadBehavior::content_disposition),
            );

        match input.privacy {
            Privacy::Public => request = request.acl(ObjectCannedAcl::PublicRead),
            Privacy::Private => request = request.acl(ObjectCannedAcl::Private),
            Privacy::NoAcl => {}
        }

        request
            .send()
            .await
            .map_err(|e| errors::from_sdk("put_object", &input.bucket_name, Some(&input.key), e))?;

        tracing::info!(
            bucket = %input.bucket_name,
            key = %input.key,
            size_bytes = size,
            privacy = %input.privacy,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 upload successful"
        );

        Ok(())
    }

    async fn head_file(
        &self,
        input: HeadFileInput<AwsRegion, AwsCustomCredentials>,
    ) -> StorageResult<HeadFileOutput> {
        let client = self.client(input.region, input.custom_credentials.as_ref());

        let output = client
            .head_object()
            .bucket(&input.bucket_name)
            .key(&input.key)
            .send()
            .await
            .map_err(|e| errors::from_sdk("head_object", &input.bucket_name, Some(&input.key), e))?;

        Ok(HeadFileOutput {
            last_modified: output.last_modified().and_then(to_utc),
            content_length: output.content_length().and_then(|l| u64::try_from(l).ok()),
        })
    }

    fn convert_to_serve_url(&self, input: ConvertToServeUrlInput<'_, AwsRegion>) -> String {
        if input.url_or_id.starts_with("https://") || input.url_or_id.starts_with("http://") {
            return input.url_or_id.to_string();
        }

        format!(
            "{}/{}",
            self.bucket_url(input.bucket_name, input.region),
            site_index_key(input.url_or_id)
        )
    }

    fn print_logging_helper(&self) -> bool {
        true
    }

    fn provider(&self) -> ProviderKind {
        ProviderKind::Aws
    }
}

/// Presign client backed by an S3 client with default credentials
#[derive(Clone)]
pub struct S3PresignClient {
    client: Client,
}

#[async_trait]
impl PresignClient for S3PresignClient {
    async fn head_object(&self, bucket_name: &str, object_key: &str) -> StorageResult<()> {
        self.client
            .head_object()
            .bucket(bucket_name)
            .key(object_key)
            .send()
            .await
            .map(|_| ())
            .map_err(|e| errors::from_sdk("head_object", bucket_name, Some(object_key), e))
    }

    async fn presign_get(
        &self,
        bucket_name: &str,
        object_key: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        let config = PresigningConfig::expires_in(expires_in)
            .map_err(|e| StorageError::InvalidExpiration(e.to_string()))?;

        let request = self
            .client
            .get_object()
            .bucket(bucket_name)
            .key(object_key)
            .presigned(config)
            .await
            .map_err(|e| errors::from_sdk("presign get_object", bucket_name, Some(object_key), e))?;

        Ok(request.uri().to_string())
    }
}

impl PresignClientFactory for S3Provider {
    type Region = AwsRegion;
    type Client = S3PresignClient;

    fn presign_client(
        &self,
        region: &AwsRegion,
        force_path_style: bool,
    ) -> StorageResult<S3PresignClient> {
        Ok(S3PresignClient {
            client: client::build_client(
                &self.sdk_config,
                *region,
                self.settings.endpoint.as_deref(),
                None,
                force_path_style,
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presign::{presign_url, PresignUrlInput};
    use aws_credential_types::provider::SharedCredentialsProvider;
    use aws_credential_types::Credentials;
    use aws_sdk_s3::config::Region;
    use aws_sdk_s3::operation::list_objects_v2::ListObjectsV2Output;
    use aws_sdk_s3::types::Object;
    use aws_smithy_mocks::{mock, mock_client};

    fn test_sdk_config() -> SdkConfig {
        SdkConfig::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("us-east-1"))
            .credentials_provider(SharedCredentialsProvider::new(Credentials::new(
                "AKIDEXAMPLE",
                "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY",
                None,
                None,
                "test",
            )))
            .build()
    }

    fn s3_provider(settings: S3ProviderConfig) -> S3Provider {
        S3Provider::with_sdk_config(test_sdk_config(), settings)
    }

    #[tokio::test]
    async fn test_presigned_url_contains_bucket_key_and_expiry() {
        let provider = s3_provider(S3ProviderConfig::default());
        let input = PresignUrlInput::new(AwsRegion::UsEast1, "my-bucket", "renders/out.mp4", 120);

        let url = presign_url(&provider, &input).await.unwrap();

        assert!(url.starts_with("https://my-bucket.s3.us-east-1.amazonaws.com/"));
        assert!(url.contains("my-bucket"));
        assert!(url.contains("renders/out.mp4"));
        assert!(url.contains("X-Amz-Expires=120"));
        assert!(url.contains("X-Amz-Signature="));
    }

    #[tokio::test]
    async fn test_presigned_url_path_style() {
        let provider = s3_provider(S3ProviderConfig::default());
        let input = PresignUrlInput::new(AwsRegion::EuCentral1, "my-bucket", "renders/out.mp4", 60)
            .with_force_path_style(true);

        let url = presign_url(&provider, &input).await.unwrap();

        assert!(url.starts_with("https://s3.eu-central-1.amazonaws.com/my-bucket/renders/out.mp4"));
        assert!(url.contains("X-Amz-Expires=60"));
    }

    #[test]
    fn test_convert_to_serve_url() {
        let provider = s3_provider(S3ProviderConfig::default());
        let region = AwsRegion::EuWest1;

        let url = provider.convert_to_serve_url(ConvertToServeUrlInput {
            url_or_id: "my-site",
            region: &region,
            bucket_name: "reelstore-abc",
        });
        assert_eq!(
            url,
            "https://reelstore-abc.s3.eu-west-1.amazonaws.com/sites/my-site/index.html"
        );

        let passthrough = provider.convert_to_serve_url(ConvertToServeUrlInput {
            url_or_id: "https://example.com/site/index.html",
            region: &region,
            bucket_name: "reelstore-abc",
        });
        assert_eq!(passthrough, "https://example.com/site/index.html");
    }

    #[test]
    fn test_convert_to_serve_url_custom_endpoint() {
        let provider = s3_provider(S3ProviderConfig {
            endpoint: Some("http://localhost:9000/".to_string()),
            ..Default::default()
        });

        let url = provider.convert_to_serve_url(ConvertToServeUrlInput {
            url_or_id: "my-site",
            region: &AwsRegion::UsEast1,
            bucket_name: "renders",
        });
        assert_eq!(url, "http://localhost:9000/renders/sites/my-site/index.html");
    }

    #[test]
    fn test_current_region_in_function() {
        let provider = s3_provider(S3ProviderConfig {
            function_region: Some("ap-south-1".to_string()),
            ..Default::default()
        });
        assert_eq!(
            provider.get_current_region_in_function().unwrap(),
            AwsRegion::ApSouth1
        );

        let missing = provider_without_region();
        assert!(matches!(
            missing.get_current_region_in_function(),
            Err(StorageError::RegionUnavailable(_))
        ));

        let bogus = s3_provider(S3ProviderConfig {
            function_region: Some("moon-1".to_string()),
            ..Default::default()
        });
        assert!(matches!(
            bogus.get_current_region_in_function(),
            Err(StorageError::RegionUnavailable(_))
        ));
    }

    fn provider_without_region() -> S3Provider {
        s3_provider(S3ProviderConfig::default())
    }

    #[test]
    fn test_chromium_path() {
        assert_eq!(provider_without_region().get_chromium_path(), None);

        let in_function = s3_provider(S3ProviderConfig {
            running_in_function: true,
            ..Default::default()
        });
        assert_eq!(
            in_function.get_chromium_path(),
            Some(PathBuf::from("/opt/bin/chromium"))
        );

        let configured = s3_provider(S3ProviderConfig {
            running_in_function: true,
            chromium_path: Some(PathBuf::from("/usr/bin/chromium")),
            ..Default::default()
        });
        assert_eq!(
            configured.get_chromium_path(),
            Some(PathBuf::from("/usr/bin/chromium"))
        );
    }

    #[test]
    fn test_folder_expiry_configuration() {
        let configuration = folder_expiry_configuration().unwrap();
        let rules = configuration.rules();
        assert_eq!(rules.len(), 4);
        assert_eq!(rules[1].id(), Some("delete-after-3-days"));
        assert_eq!(rules[1].expiration().and_then(|e| e.days()), Some(3));
        assert_eq!(rules[1].status(), &ExpirationStatus::Enabled);
    }

    #[test]
    fn test_introspection() {
        let provider = provider_without_region();
        assert!(provider.print_logging_helper());
        assert_eq!(provider.provider(), ProviderKind::Aws);
        assert_eq!(provider.random_hash().len(), 10);
    }

    #[test]
    fn test_custom_credentials_debug_is_redacted() {
        let credentials = AwsCustomCredentials {
            access_key_id: "AKIDEXAMPLE".to_string(),
            secret_access_key: "super-secret".to_string(),
            endpoint: None,
        };
        let printed = format!("{:?}", credentials);
        assert!(!printed.contains("super-secret"));
        assert!(printed.contains("AKID****"));
    }

    #[test]
    fn test_custom_credentials_debug_with_multibyte_key_id() {
        let credentials = AwsCustomCredentials {
            access_key_id: "é€abc".to_string(),
            secret_access_key: "super-secret".to_string(),
            endpoint: None,
        };
        let printed = format!("{:?}", credentials);
        assert!(printed.contains("é€ab****"));
        assert!(!printed.contains("super-secret"));

        let short = AwsCustomCredentials {
            access_key_id: "é".to_string(),
            ..credentials
        };
        assert!(format!("{:?}", short).contains("é****"));
    }

    #[test]
    fn test_buckets_in_unknown_regions_are_skipped() {
        let buckets = vec![
            ("reelstore-virginia".to_string(), 1, None),
            ("reelstore-ireland".to_string(), 2, Some("EU".to_string())),
            ("reelstore-calgary".to_string(), 3, Some("ca-west-1".to_string())),
            ("reelstore-tel-aviv".to_string(), 4, Some("il-central-1".to_string())),
            ("reelstore-dublin".to_string(), 5, Some("eu-west-1".to_string())),
        ];

        let in_ireland = filter_buckets_in_region(&AwsRegion::EuWest1, buckets.clone());
        let names: Vec<&str> = in_ireland.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["reelstore-ireland", "reelstore-dublin"]);
        assert!(in_ireland.iter().all(|b| b.region == AwsRegion::EuWest1));

        let in_virginia = filter_buckets_in_region(&AwsRegion::UsEast1, buckets);
        assert_eq!(in_virginia.len(), 1);
        assert_eq!(in_virginia[0].name, "reelstore-virginia");
        assert_eq!(in_virginia[0].creation_date, 1);
    }

    fn list_input(continuation_token: Option<&str>) -> ListObjectsInput<AwsRegion> {
        ListObjectsInput {
            bucket_name: "reelstore-abc".to_string(),
            prefix: "renders/".to_string(),
            region: AwsRegion::UsEast1,
            expected_bucket_owner: None,
            continuation_token: continuation_token.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_list_objects_passes_continuation_tokens_verbatim() {
        const TOKEN: &str = "1/Zm9v+YmFy==?&%2F é";
        const NEXT_TOKEN: &str = "2/opaque token+/=";

        let page_rule = mock!(aws_sdk_s3::Client::list_objects_v2)
            .match_requests(|req| {
                req.bucket() == Some("reelstore-abc")
                    && req.prefix() == Some("renders/")
                    && req.continuation_token() == Some(TOKEN)
            })
            .then_output(|| {
                ListObjectsV2Output::builder()
                    .contents(
                        Object::builder()
                            .key("renders/abc/out.mp4")
                            .size(42)
                            .e_tag("\"etag\"")
                            .build(),
                    )
                    .next_continuation_token(NEXT_TOKEN)
                    .build()
            });
        let client = mock_client!(aws_sdk_s3, [&page_rule]);

        let page = list_objects_page(&client, &list_input(Some(TOKEN)))
            .await
            .unwrap();

        assert_eq!(page_rule.num_calls(), 1);
        assert_eq!(page.next_continuation_token.as_deref(), Some(NEXT_TOKEN));
        assert_eq!(page.objects.len(), 1);
        assert_eq!(page.objects[0].key, "renders/abc/out.mp4");
        assert_eq!(page.objects[0].size, 42);
        assert_eq!(page.objects[0].e_tag, "\"etag\"");
    }

    #[tokio::test]
    async fn test_list_objects_last_page_has_no_token() {
        let first_page_rule = mock!(aws_sdk_s3::Client::list_objects_v2)
            .match_requests(|req| req.continuation_token().is_none())
            .then_output(|| ListObjectsV2Output::builder().build());
        let client = mock_client!(aws_sdk_s3, [&first_page_rule]);

        let page = list_objects_page(&client, &list_input(None)).await.unwrap();

        assert_eq!(first_page_rule.num_calls(), 1);
        assert!(page.objects.is_empty());
        assert!(page.next_continuation_token.is_none());
    }
}
