#[cfg(feature = "storage-local")]
use crate::local::{LocalProvider, LocalProviderConfig, DEFAULT_LIST_PAGE_SIZE};
#[cfg(feature = "storage-s3")]
use crate::s3::{S3Provider, S3ProviderConfig};
use crate::{ProviderKind, StorageError, StorageResult};
use reelstore_core::Config;
#[cfg(any(feature = "storage-s3", feature = "storage-local"))]
use std::path::PathBuf;

/// The provider selected by configuration
///
/// Providers carry their own region and credential types, so the concrete
/// provider is kept instead of a trait object.
#[derive(Clone)]
pub enum ConfiguredProvider {
    #[cfg(feature = "storage-s3")]
    Aws(S3Provider),
    #[cfg(feature = "storage-local")]
    Local(LocalProvider),
}

impl ConfiguredProvider {
    pub fn kind(&self) -> ProviderKind {
        match self {
            #[cfg(feature = "storage-s3")]
            ConfiguredProvider::Aws(_) => ProviderKind::Aws,
            #[cfg(feature = "storage-local")]
            ConfiguredProvider::Local(_) => ProviderKind::Local,
        }
    }
}

/// Create the storage provider based on configuration
pub async fn create_provider(config: &Config) -> StorageResult<ConfiguredProvider> {
    let provider = match config.provider() {
        #[cfg(feature = "storage-s3")]
        ProviderKind::Aws => {
            let settings = S3ProviderConfig {
                endpoint: config.s3_endpoint().map(String::from),
                force_path_style: config.s3_force_path_style(),
                bucket_prefix: config.bucket_prefix().to_string(),
                chromium_path: config.chromium_path().map(PathBuf::from),
                function_region: config.aws_region().map(String::from),
                running_in_function: config.running_in_function(),
            };
            ConfiguredProvider::Aws(S3Provider::new(settings).await)
        }

        #[cfg(not(feature = "storage-s3"))]
        ProviderKind::Aws => {
            return Err(StorageError::ConfigError(
                "AWS storage provider not available (storage-s3 feature not enabled)".to_string(),
            ))
        }

        #[cfg(feature = "storage-local")]
        ProviderKind::Local => {
            let root = config.local_storage_path().ok_or_else(|| {
                StorageError::ConfigError("LOCAL_STORAGE_PATH not configured".to_string())
            })?;
            let base_url = config.local_storage_base_url().ok_or_else(|| {
                StorageError::ConfigError("LOCAL_STORAGE_BASE_URL not configured".to_string())
            })?;
            let signing_secret = config.local_signing_secret().ok_or_else(|| {
                StorageError::ConfigError("LOCAL_SIGNING_SECRET not configured".to_string())
            })?;

            let settings = LocalProviderConfig {
                root: PathBuf::from(root),
                base_url: base_url.to_string(),
                region: config.local_storage_region().parse()?,
                owner: config.local_storage_owner().to_string(),
                signing_secret: signing_secret.to_string(),
                bucket_prefix: config.bucket_prefix().to_string(),
                chromium_path: config.chromium_path().map(PathBuf::from),
                page_size: DEFAULT_LIST_PAGE_SIZE,
            };
            ConfiguredProvider::Local(LocalProvider::new(settings).await?)
        }

        #[cfg(not(feature = "storage-local"))]
        ProviderKind::Local => {
            return Err(StorageError::ConfigError(
                "Local storage provider not available (storage-local feature not enabled)"
                    .to_string(),
            ))
        }
    };

    tracing::info!(provider = %provider.kind(), "Storage provider configured");

    Ok(provider)
}

#[cfg(all(test, feature = "storage-local"))]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn config(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_vars(|name| vars.get(name).cloned()).unwrap()
    }

    #[tokio::test]
    async fn test_creates_local_provider() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("storage");
        let config = config(&[
            ("STORAGE_PROVIDER", "local"),
            ("LOCAL_STORAGE_PATH", root.to_str().unwrap()),
            ("LOCAL_STORAGE_BASE_URL", "http://localhost:3000/storage"),
            ("LOCAL_SIGNING_SECRET", "0123456789abcdef0123456789abcdef"),
        ]);

        let provider = create_provider(&config).await.unwrap();

        assert_eq!(provider.kind(), ProviderKind::Local);
        assert!(root.is_dir());
    }

    #[tokio::test]
    async fn test_local_provider_requires_path() {
        let mut config = config(&[
            ("STORAGE_PROVIDER", "local"),
            ("LOCAL_STORAGE_PATH", "/tmp/unused"),
            ("LOCAL_STORAGE_BASE_URL", "http://localhost:3000/storage"),
            ("LOCAL_SIGNING_SECRET", "0123456789abcdef0123456789abcdef"),
        ]);
        config.0.local_storage_path = None;

        let result = create_provider(&config).await;
        assert!(matches!(result, Err(StorageError::ConfigError(_))));
    }
}
