//! Configuration module
//!
//! This module provides the configuration for the storage provider layer:
//! which provider to use, how to reach it and the local development backend.

use std::env;

use crate::provider_types::ProviderKind;

const DEFAULT_BUCKET_PREFIX: &str = "reelstore-";
const DEFAULT_LOCAL_REGION: &str = "local";
const DEFAULT_LOCAL_OWNER: &str = "local-account";
const MIN_SIGNING_SECRET_LENGTH: usize = 32;

/// Storage configuration
#[derive(Clone, Debug)]
pub struct StorageConfig {
    pub environment: String,
    pub log_format: String,
    pub provider: ProviderKind,
    // Region of the current function runtime (AWS_REGION)
    pub aws_region: Option<String>,
    pub s3_endpoint: Option<String>, // Custom endpoint for S3-compatible providers (MinIO, R2, etc.)
    pub s3_force_path_style: bool,
    pub bucket_prefix: String,
    pub chromium_path: Option<String>,
    pub running_in_function: bool,
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
    pub local_storage_region: String,
    pub local_storage_owner: String,
    pub local_signing_secret: Option<String>,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<StorageConfig>);

impl Config {
    fn as_storage(&self) -> &StorageConfig {
        &self.0
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let environment = self.as_storage().environment.to_lowercase();
        environment == "production" || environment == "prod"
    }

    /// Load configuration from the process environment, reading `.env` first.
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_vars(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_vars<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = StorageConfig::from_vars(lookup)?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.as_storage().validate()
    }

    pub fn environment(&self) -> &str {
        &self.as_storage().environment
    }

    pub fn log_format(&self) -> &str {
        &self.as_storage().log_format
    }

    pub fn provider(&self) -> ProviderKind {
        self.as_storage().provider
    }

    pub fn aws_region(&self) -> Option<&str> {
        self.as_storage().aws_region.as_deref()
    }

    pub fn s3_endpoint(&self) -> Option<&str> {
        self.as_storage().s3_endpoint.as_deref()
    }

    pub fn s3_force_path_style(&self) -> bool {
        self.as_storage().s3_force_path_style
    }

    pub fn bucket_prefix(&self) -> &str {
        &self.as_storage().bucket_prefix
    }

    pub fn chromium_path(&self) -> Option<&str> {
        self.as_storage().chromium_path.as_deref()
    }

    pub fn running_in_function(&self) -> bool {
        self.as_storage().running_in_function
    }

    pub fn local_storage_path(&self) -> Option<&str> {
        self.as_storage().local_storage_path.as_deref()
    }

    pub fn local_storage_base_url(&self) -> Option<&str> {
        self.as_storage().local_storage_base_url.as_deref()
    }

    pub fn local_storage_region(&self) -> &str {
        &self.as_storage().local_storage_region
    }

    pub fn local_storage_owner(&self) -> &str {
        &self.as_storage().local_storage_owner
    }

    pub fn local_signing_secret(&self) -> Option<&str> {
        self.as_storage().local_signing_secret.as_deref()
    }
}

fn parse_bool(value: Option<String>, default: bool) -> bool {
    value
        .map(|v| v.trim().to_lowercase())
        .and_then(|v| match v.as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        })
        .unwrap_or(default)
}

impl StorageConfig {
    pub fn from_vars<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|s| !s.trim().is_empty());

        let environment = non_empty("ENVIRONMENT")
            .or_else(|| non_empty("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let provider = match non_empty("STORAGE_PROVIDER") {
            Some(raw) => raw.parse::<ProviderKind>()?,
            None => ProviderKind::Aws,
        };

        let config = StorageConfig {
            environment,
            log_format: non_empty("LOG_FORMAT")
                .unwrap_or_else(|| "text".to_string())
                .to_lowercase(),
            provider,
            aws_region: non_empty("AWS_REGION"),
            s3_endpoint: non_empty("S3_ENDPOINT"),
            s3_force_path_style: parse_bool(lookup("S3_FORCE_PATH_STYLE"), false),
            bucket_prefix: non_empty("BUCKET_PREFIX")
                .unwrap_or_else(|| DEFAULT_BUCKET_PREFIX.to_string()),
            chromium_path: non_empty("CHROMIUM_PATH"),
            running_in_function: non_empty("AWS_LAMBDA_FUNCTION_NAME").is_some(),
            local_storage_path: non_empty("LOCAL_STORAGE_PATH"),
            local_storage_base_url: non_empty("LOCAL_STORAGE_BASE_URL"),
            local_storage_region: non_empty("LOCAL_STORAGE_REGION")
                .unwrap_or_else(|| DEFAULT_LOCAL_REGION.to_string()),
            local_storage_owner: non_empty("LOCAL_STORAGE_OWNER")
                .unwrap_or_else(|| DEFAULT_LOCAL_OWNER.to_string()),
            local_signing_secret: non_empty("LOCAL_SIGNING_SECRET"),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !self
            .bucket_prefix
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        {
            return Err(anyhow::anyhow!(
                "BUCKET_PREFIX may only contain lowercase letters, digits and hyphens"
            ));
        }

        if self.log_format != "text" && self.log_format != "json" {
            return Err(anyhow::anyhow!("LOG_FORMAT must be either 'text' or 'json'"));
        }

        if let Some(ref endpoint) = self.s3_endpoint {
            if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
                return Err(anyhow::anyhow!(
                    "S3_ENDPOINT must start with http:// or https://"
                ));
            }
        }

        match self.provider {
            ProviderKind::Aws => {
                // Region is supplied per call; nothing else is mandatory.
            }
            ProviderKind::Local => {
                if self.local_storage_path.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_PATH must be set when using the local storage provider"
                    ));
                }
                if self.local_storage_base_url.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_BASE_URL must be set when using the local storage provider"
                    ));
                }
                match self.local_signing_secret {
                    Some(ref secret) if secret.len() >= MIN_SIGNING_SECRET_LENGTH => {}
                    _ => {
                        return Err(anyhow::anyhow!(
                            "LOCAL_SIGNING_SECRET must be at least {} characters long",
                            MIN_SIGNING_SECRET_LENGTH
                        ))
                    }
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, anyhow::Error> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_vars(|name| map.get(name).cloned())
    }

    #[test]
    fn defaults_to_aws_provider() {
        let config = load(&[]).unwrap();
        assert_eq!(config.provider(), ProviderKind::Aws);
        assert_eq!(config.bucket_prefix(), "reelstore-");
        assert_eq!(config.log_format(), "text");
        assert!(!config.s3_force_path_style());
        assert!(!config.running_in_function());
        assert!(!config.is_production());
    }

    #[test]
    fn reads_aws_settings() {
        let config = load(&[
            ("AWS_REGION", "eu-central-1"),
            ("S3_ENDPOINT", "http://localhost:9000"),
            ("S3_FORCE_PATH_STYLE", "true"),
            ("AWS_LAMBDA_FUNCTION_NAME", "renderer"),
            ("ENVIRONMENT", "prod"),
        ])
        .unwrap();
        assert_eq!(config.aws_region(), Some("eu-central-1"));
        assert_eq!(config.s3_endpoint(), Some("http://localhost:9000"));
        assert!(config.s3_force_path_style());
        assert!(config.running_in_function());
        assert!(config.is_production());
    }

    #[test]
    fn local_provider_requires_path_url_and_secret() {
        let err = load(&[("STORAGE_PROVIDER", "local")]).unwrap_err();
        assert!(err.to_string().contains("LOCAL_STORAGE_PATH"));

        let err = load(&[
            ("STORAGE_PROVIDER", "local"),
            ("LOCAL_STORAGE_PATH", "/tmp/reelstore"),
            ("LOCAL_STORAGE_BASE_URL", "http://localhost:8080/files"),
            ("LOCAL_SIGNING_SECRET", "too-short"),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("LOCAL_SIGNING_SECRET"));

        let config = load(&[
            ("STORAGE_PROVIDER", "local"),
            ("LOCAL_STORAGE_PATH", "/tmp/reelstore"),
            ("LOCAL_STORAGE_BASE_URL", "http://localhost:8080/files"),
            ("LOCAL_SIGNING_SECRET", "0123456789abcdef0123456789abcdef"),
        ])
        .unwrap();
        assert_eq!(config.provider(), ProviderKind::Local);
        assert_eq!(config.local_storage_region(), "local");
        assert_eq!(config.local_storage_owner(), "local-account");
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(load(&[("STORAGE_PROVIDER", "azure")]).is_err());
        assert!(load(&[("BUCKET_PREFIX", "Upper_Case")]).is_err());
        assert!(load(&[("LOG_FORMAT", "xml")]).is_err());
        assert!(load(&[("S3_ENDPOINT", "localhost:9000")]).is_err());
    }
}
