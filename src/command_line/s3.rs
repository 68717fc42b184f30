use anyhow::Result;
use aws_config::SdkConfig;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use super::prompt::confirm;
use crate::s3::S3;

#[derive(Debug, Parser)]
pub struct S3Command {
    #[command(subcommand)]
    pub action: S3Action,
}

#[derive(Debug, Subcommand)]
pub enum S3Action {
    /// Create a bucket in the current region.
    CreateBucket { bucket: String },
    /// List the account's buckets.
    ListBuckets,
    /// Upload a local file.
    Upload {
        bucket: String,
        file: PathBuf,
        /// Object key; defaults to the file name.
        #[arg(long)]
        key: Option<String>,
    },
    /// Download an object to a local file.
    Download {
        bucket: String,
        key: String,
        file: PathBuf,
    },
    /// List objects, optionally under a prefix.
    ListObjects {
        bucket: String,
        #[arg(long)]
        prefix: Option<String>,
    },
    /// Delete one object.
    DeleteObject { bucket: String, key: String },
    /// Delete an empty bucket.
    DeleteBucket { bucket: String },
    /// Print a presigned GET URL.
    Presign {
        bucket: String,
        key: String,
        /// Lifetime of the URL in seconds.
        #[arg(long, default_value = "900")]
        expires_in: u64,
    },
}

pub async fn run(sdk_config: &SdkConfig, cmd: S3Command, yes: bool) -> Result<()> {
    let s3 = S3::new(sdk_config);
    match cmd.action {
        S3Action::CreateBucket { bucket } => {
            s3.create_bucket(&bucket).await?;
            println!("Bucket {bucket} is ready");
        }
        S3Action::ListBuckets => {
            let buckets = s3.list_buckets().await?;
            for bucket in &buckets {
                println!("{}\t{}", bucket.name, bucket.created.as_deref().unwrap_or("-"));
            }
            println!("Found {} buckets", buckets.len());
        }
        S3Action::Upload { bucket, file, key } => {
            let key = match key {
                Some(key) => key,
                None => default_key(&file)?,
            };
            s3.upload_file(&bucket, &key, &file).await?;
            println!("Uploaded s3://{bucket}/{key}");
        }
        S3Action::Download { bucket, key, file } => {
            let bytes = s3.download_file(&bucket, &key, &file).await?;
            println!("Wrote {bytes} bytes to {}", file.display());
        }
        S3Action::ListObjects { bucket, prefix } => {
            let objects = s3.list_objects(&bucket, prefix.as_deref()).await?;
            for object in &objects {
                println!("{:>12}  {}", object.size, object.key);
            }
            println!("Found {} objects", objects.len());
        }
        S3Action::DeleteObject { bucket, key } => {
            if confirm(&format!("Delete s3://{bucket}/{key}"), yes)? {
                s3.delete_object(&bucket, &key).await?;
            }
        }
        S3Action::DeleteBucket { bucket } => {
            if confirm(&format!("Delete bucket {bucket}"), yes)? {
                s3.delete_bucket(&bucket).await?;
            }
        }
        S3Action::Presign {
            bucket,
            key,
            expires_in,
        } => {
            let url = s3
                .presigned_get_url(&bucket, &key, Duration::from_secs(expires_in))
                .await?;
            println!("{url}");
        }
    }
    Ok(())
}

fn default_key(file: &std::path::Path) -> Result<String> {
    file.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .ok_or_else(|| anyhow::anyhow!("Cannot derive an object key from {}", file.display()))
}
