//! Reelstore CLI: run storage provider operations from the shell.
//!
//! The provider is selected through the environment (STORAGE_PROVIDER and the
//! matching AWS_* or LOCAL_STORAGE_* variables). Results are printed as JSON.

use anyhow::Context;
use clap::{Parser, Subcommand};
use futures::StreamExt;
use reelstore_cli::{download_behavior, init_tracing, resolve_region};
use reelstore_core::Config;
use reelstore_storage::{
    create_provider, list_all_objects, presign_url, presign_url_if_exists, ApplyLifeCycleInput,
    BucketExistsInput, ConfiguredProvider, ConvertToServeUrlInput, CreateBucketInput,
    DeleteFileInput, FileBody, HeadFileInput, ListObjectsInput, PresignClientFactory,
    PresignUrlInput, Privacy, ReadFileInput, StorageError, StorageProvider, WriteFileInput,
};
use serde::Serialize;
use serde_json::json;
use std::path::PathBuf;
use std::str::FromStr;
use tokio::io::AsyncWriteExt;

#[derive(Parser)]
#[command(name = "reelstore", about = "Cloud storage provider CLI")]
struct Cli {
    /// Region to operate in; defaults to the region of the current runtime
    #[arg(long, global = true)]
    region: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List buckets in the region
    Buckets {
        /// Only return this bucket instead of prefix-matching ones
        #[arg(long)]
        name: Option<String>,
    },
    /// Create a bucket
    CreateBucket { bucket: String },
    /// Enable or disable render folder expiry on a bucket
    Lifecycle {
        bucket: String,
        /// true installs the expiry rules, false removes them
        #[arg(long)]
        folder_expiry: Option<bool>,
    },
    /// List objects below a prefix
    Ls {
        bucket: String,
        #[arg(long, default_value = "")]
        prefix: String,
        #[arg(long)]
        expected_owner: Option<String>,
        #[arg(long)]
        continuation_token: Option<String>,
        /// Follow continuation tokens until the listing is complete
        #[arg(long)]
        all: bool,
    },
    /// Write an object's content to stdout
    Cat {
        bucket: String,
        key: String,
        #[arg(long)]
        expected_owner: Option<String>,
    },
    /// Upload a local file
    Put {
        bucket: String,
        key: String,
        file: PathBuf,
        /// public, private or no-acl
        #[arg(long, default_value = "private")]
        privacy: Privacy,
        /// Ask browsers to download instead of playing inline
        #[arg(long)]
        download: bool,
        /// File name offered when downloading
        #[arg(long)]
        file_name: Option<String>,
        #[arg(long)]
        expected_owner: Option<String>,
    },
    /// Show object metadata
    Head { bucket: String, key: String },
    /// Delete an object
    Rm { bucket: String, key: String },
    /// Check whether a bucket exists
    Exists {
        bucket: String,
        #[arg(long)]
        expected_owner: Option<String>,
    },
    /// Issue a presigned GET URL
    Presign {
        bucket: String,
        key: String,
        /// Validity in seconds (1 to 604800)
        #[arg(long, default_value = "120")]
        expires: u64,
        /// Return null instead of a URL when the object does not exist
        #[arg(long)]
        check: bool,
        #[arg(long)]
        force_path_style: bool,
    },
    /// Resolve a site id to the URL a browser loads
    ServeUrl { bucket: String, url_or_id: String },
    /// Print a random render id
    Hash,
    /// Print the provider and runtime environment
    Info,
    /// List the files of a local directory
    FolderFiles { dir: PathBuf },
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

async fn run<P>(provider: &P, region: Option<&str>, command: Commands) -> anyhow::Result<()>
where
    P: StorageProvider + PresignClientFactory<Region = <P as StorageProvider>::Region>,
    <P as StorageProvider>::Region: FromStr<Err = StorageError> + Serialize,
{
    // Commands that work without a region
    match &command {
        Commands::Hash => return print_json(&json!({ "hash": provider.random_hash() })),
        Commands::FolderFiles { dir } => {
            let files = provider.get_folder_files(dir).await?;
            return print_json(&files);
        }
        Commands::Info => {
            return print_json(&json!({
                "provider": provider.provider(),
                "region": provider.get_current_region_in_function().ok(),
                "chromiumPath": provider.get_chromium_path(),
                "printLoggingHelper": provider.print_logging_helper(),
            }));
        }
        _ => {}
    }

    let region = resolve_region(provider, region)?;

    match command {
        Commands::Buckets { name } => {
            let buckets = provider.get_buckets(&region, name.as_deref()).await?;
            print_json(&buckets)?;
        }
        Commands::CreateBucket { bucket } => {
            provider
                .create_bucket(CreateBucketInput {
                    region,
                    bucket_name: bucket.clone(),
                })
                .await?;
            print_json(&json!({ "created": bucket }))?;
        }
        Commands::Lifecycle {
            bucket,
            folder_expiry,
        } => {
            provider
                .apply_life_cycle(ApplyLifeCycleInput {
                    enable_folder_expiry: folder_expiry,
                    bucket_name: bucket.clone(),
                    region,
                    custom_credentials: None,
                })
                .await?;
            print_json(&json!({ "bucket": bucket, "folderExpiry": folder_expiry }))?;
        }
        Commands::Ls {
            bucket,
            prefix,
            expected_owner,
            continuation_token,
            all,
        } => {
            let input = ListObjectsInput {
                bucket_name: bucket,
                prefix,
                region,
                expected_bucket_owner: expected_owner,
                continuation_token,
            };
            if all {
                let objects = list_all_objects(provider, input).await?;
                print_json(&objects)?;
            } else {
                let page = provider.list_objects(input).await?;
                print_json(&page)?;
            }
        }
        Commands::Cat {
            bucket,
            key,
            expected_owner,
        } => {
            let mut stream = provider
                .read_file(ReadFileInput {
                    bucket_name: bucket,
                    key,
                    region,
                    expected_bucket_owner: expected_owner,
                })
                .await?;
            let mut stdout = tokio::io::stdout();
            while let Some(chunk) = stream.next().await {
                stdout.write_all(&chunk?).await?;
            }
            stdout.flush().await?;
        }
        Commands::Put {
            bucket,
            key,
            file,
            privacy,
            download,
            file_name,
            expected_owner,
        } => {
            let reader = tokio::fs::File::open(&file)
                .await
                .with_context(|| format!("Open {}", file.display()))?;
            provider
                .write_file(WriteFileInput {
                    bucket_name: bucket.clone(),
                    key: key.clone(),
                    body: FileBody::Reader(Box::pin(reader)),
                    region,
                    privacy,
                    expected_bucket_owner: expected_owner,
                    download_behavior: download_behavior(download, file_name),
                    custom_credentials: None,
                })
                .await?;
            print_json(&json!({ "bucket": bucket, "key": key }))?;
        }
        Commands::Head { bucket, key } => {
            let head = provider
                .head_file(HeadFileInput {
                    bucket_name: bucket,
                    key,
                    region,
                    custom_credentials: None,
                })
                .await?;
            print_json(&head)?;
        }
        Commands::Rm { bucket, key } => {
            provider
                .delete_file(DeleteFileInput {
                    bucket_name: bucket.clone(),
                    key: key.clone(),
                    region,
                    custom_credentials: None,
                })
                .await?;
            print_json(&json!({ "deleted": key, "bucket": bucket }))?;
        }
        Commands::Exists {
            bucket,
            expected_owner,
        } => {
            let exists = provider
                .bucket_exists(BucketExistsInput {
                    bucket_name: bucket,
                    region,
                    expected_bucket_owner: expected_owner,
                })
                .await?;
            print_json(&json!({ "exists": exists }))?;
        }
        Commands::Presign {
            bucket,
            key,
            expires,
            check,
            force_path_style,
        } => {
            let input = PresignUrlInput::new(region, bucket, key, expires)
                .with_force_path_style(force_path_style);
            let url = if check {
                presign_url_if_exists(provider, &input).await?
            } else {
                Some(presign_url(provider, &input).await?)
            };
            print_json(&json!({ "url": url }))?;
        }
        Commands::ServeUrl { bucket, url_or_id } => {
            let url = provider.convert_to_serve_url(ConvertToServeUrlInput {
                url_or_id: &url_or_id,
                region: &region,
                bucket_name: &bucket,
            });
            print_json(&json!({ "url": url }))?;
        }
        Commands::Hash | Commands::Info | Commands::FolderFiles { .. } => {}
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("Failed to load storage configuration")?;
    init_tracing(config.log_format());

    let cli = Cli::parse();
    let provider = create_provider(&config)
        .await
        .context("Failed to create storage provider")?;

    match provider {
        ConfiguredProvider::Aws(ref s3) => run(s3, cli.region.as_deref(), cli.command).await,
        ConfiguredProvider::Local(ref local) => {
            run(local, cli.region.as_deref(), cli.command).await
        }
    }
}
