use super::AwsCustomCredentials;
use crate::region::AwsRegion;
use aws_config::SdkConfig;
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::Client;

/// Build an S3 client scoped to one region.
///
/// Clients share the base `SdkConfig` (default credential chain, retry and
/// timeout settings) and differ only by region, addressing style and, when
/// given, per-call credentials.
pub(crate) fn build_client(
    sdk_config: &SdkConfig,
    region: AwsRegion,
    endpoint: Option<&str>,
    custom_credentials: Option<&AwsCustomCredentials>,
    force_path_style: bool,
) -> Client {
    let mut builder = aws_sdk_s3::config::Builder::from(sdk_config)
        .region(Region::new(region.as_str()))
        .force_path_style(force_path_style);

    match custom_credentials {
        Some(credentials) => {
            builder = builder.credentials_provider(Credentials::new(
                credentials.access_key_id.clone(),
                credentials.secret_access_key.clone(),
                None, // No session token
                None, // No expiry
                "reelstore-custom-credentials",
            ));
            if let Some(ref endpoint) = credentials.endpoint {
                builder = builder.endpoint_url(endpoint.clone());
            } else if let Some(endpoint) = endpoint {
                builder = builder.endpoint_url(endpoint);
            }
        }
        None => {
            if let Some(endpoint) = endpoint {
                builder = builder.endpoint_url(endpoint);
            }
        }
    }

    Client::from_conf(builder.build())
}
