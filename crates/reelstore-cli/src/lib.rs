use anyhow::Context;
use reelstore_storage::{DownloadBehavior, StorageError, StorageProvider};
use std::str::FromStr;

/// Initialize tracing for the CLI.
///
/// Logs go to stderr so that stdout only carries command output.
pub fn init_tracing(log_format: &str) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr);

    if log_format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Region given on the command line, or the one the provider runs in.
pub fn resolve_region<P>(provider: &P, explicit: Option<&str>) -> anyhow::Result<P::Region>
where
    P: StorageProvider,
    P::Region: FromStr<Err = StorageError>,
{
    match explicit {
        Some(raw) => raw
            .parse()
            .with_context(|| format!("Invalid --region {}", raw)),
        None => provider
            .get_current_region_in_function()
            .context("No --region given and the current region is unknown"),
    }
}

/// Download behavior selected by the `put` flags.
pub fn download_behavior(download: bool, file_name: Option<String>) -> Option<DownloadBehavior> {
    match (download, file_name) {
        (false, None) => None,
        (_, file_name) => Some(DownloadBehavior::Download { file_name }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reelstore_storage::{LocalProvider, LocalProviderConfig, LocalRegion};
    use tempfile::tempdir;

    #[test]
    fn download_flags() {
        assert_eq!(download_behavior(false, None), None);
        assert_eq!(
            download_behavior(true, None),
            Some(DownloadBehavior::Download { file_name: None })
        );
        // A file name alone implies a download
        assert_eq!(
            download_behavior(false, Some("out.mp4".to_string())),
            Some(DownloadBehavior::Download {
                file_name: Some("out.mp4".to_string())
            })
        );
    }

    #[tokio::test]
    async fn region_falls_back_to_provider() {
        let dir = tempdir().unwrap();
        let provider = LocalProvider::new(LocalProviderConfig {
            root: dir.path().to_path_buf(),
            base_url: "http://localhost:3000/storage".to_string(),
            region: "local".parse().unwrap(),
            owner: "local-account".to_string(),
            signing_secret: "0123456789abcdef0123456789abcdef".to_string(),
            bucket_prefix: "reelstore-".to_string(),
            chromium_path: None,
            page_size: 1000,
        })
        .await
        .unwrap();

        let fallback = resolve_region(&provider, None).unwrap();
        assert_eq!(fallback.as_str(), "local");

        let explicit: LocalRegion = resolve_region(&provider, Some("eu-dev")).unwrap();
        assert_eq!(explicit.as_str(), "eu-dev");

        assert!(resolve_region(&provider, Some("Not A Region")).is_err());
    }
}
