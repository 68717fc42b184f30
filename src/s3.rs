use anyhow::{anyhow, Result};
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{BucketLocationConstraint, CreateBucketConfiguration};
use aws_sdk_s3::Client;
use aws_smithy_types::date_time::Format;
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::config::region_name;
use crate::error::service_error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketSummary {
    pub name: String,
    pub created: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectSummary {
    pub key: String,
    pub size: i64,
}

/// S3 bucket and object samples.
#[derive(Debug, Clone)]
pub struct S3 {
    client: Client,
    region: String,
}

impl S3 {
    pub fn new(sdk_config: &aws_config::SdkConfig) -> Self {
        Self {
            client: Client::new(sdk_config),
            region: region_name(sdk_config).to_string(),
        }
    }

    /// Creates a bucket in the client's region.
    ///
    /// A bucket we already own counts as created.
    pub async fn create_bucket(&self, bucket: &str) -> Result<()> {
        let mut request = self.client.create_bucket().bucket(bucket);
        if let Some(constraint) = location_constraint(&self.region) {
            request = request.create_bucket_configuration(
                CreateBucketConfiguration::builder()
                    .location_constraint(constraint)
                    .build(),
            );
        }

        match request.send().await {
            Ok(_) => info!("Created bucket '{bucket}' in {}", self.region),
            Err(e)
                if e.as_service_error()
                    .is_some_and(|se| se.is_bucket_already_owned_by_you()) =>
            {
                info!("Bucket '{bucket}' already exists and is owned by you")
            }
            Err(e) => return Err(service_error("CreateBucket", e)),
        }
        Ok(())
    }

    pub async fn list_buckets(&self) -> Result<Vec<BucketSummary>> {
        let output = self
            .client
            .list_buckets()
            .send()
            .await
            .map_err(|e| service_error("ListBuckets", e))?;

        Ok(output
            .buckets()
            .iter()
            .map(|bucket| BucketSummary {
                name: bucket.name().unwrap_or_default().to_string(),
                created: bucket
                    .creation_date()
                    .and_then(|date| date.fmt(Format::DateTime).ok()),
            })
            .collect())
    }

    /// Uploads a local file as `key`.
    pub async fn upload_file(&self, bucket: &str, key: &str, path: &Path) -> Result<()> {
        let body = ByteStream::from_path(path).await?;
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(body)
            .send()
            .await
            .map_err(|e| service_error("PutObject", e))?;
        info!("Uploaded {} to s3://{bucket}/{key}", path.display());
        Ok(())
    }

    /// Downloads `key` into a local file, returning the number of bytes written.
    pub async fn download_file(&self, bucket: &str, key: &str, path: &Path) -> Result<usize> {
        let object = match self.client.get_object().bucket(bucket).key(key).send().await {
            Ok(object) => object,
            Err(e) if e.as_service_error().is_some_and(|se| se.is_no_such_key()) => {
                return Err(anyhow!("s3://{bucket}/{key} does not exist"));
            }
            Err(e) => return Err(service_error("GetObject", e)),
        };

        let bytes = object.body.collect().await?.into_bytes();
        tokio::fs::write(path, &bytes).await?;
        info!("Downloaded s3://{bucket}/{key} to {}", path.display());
        Ok(bytes.len())
    }

    /// Lists every object under an optional prefix.
    pub async fn list_objects(&self, bucket: &str, prefix: Option<&str>) -> Result<Vec<ObjectSummary>> {
        let mut pages = self
            .client
            .list_objects_v2()
            .bucket(bucket)
            .set_prefix(prefix.map(str::to_string))
            .into_paginator()
            .send();

        let mut objects = Vec::new();
        while let Some(page) = pages.next().await {
            let page = page.map_err(|e| service_error("ListObjectsV2", e))?;
            objects.extend(page.contents().iter().map(|object| ObjectSummary {
                key: object.key().unwrap_or_default().to_string(),
                size: object.size().unwrap_or_default(),
            }));
        }
        Ok(objects)
    }

    pub async fn delete_object(&self, bucket: &str, key: &str) -> Result<()> {
        self.client
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| service_error("DeleteObject", e))?;
        info!("Deleted s3://{bucket}/{key}");
        Ok(())
    }

    /// Deletes a bucket. The bucket must already be empty.
    pub async fn delete_bucket(&self, bucket: &str) -> Result<()> {
        self.client
            .delete_bucket()
            .bucket(bucket)
            .send()
            .await
            .map_err(|e| service_error("DeleteBucket", e))?;
        info!("Deleted bucket '{bucket}'");
        Ok(())
    }

    /// Presigned GET URL for an object.
    pub async fn presigned_get_url(&self, bucket: &str, key: &str, expires_in: Duration) -> Result<String> {
        let presigned = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .presigned(PresigningConfig::expires_in(expires_in)?)
            .await
            .map_err(|e| service_error("GetObject (presign)", e))?;
        Ok(presigned.uri().to_string())
    }
}

/// `us-east-1` is the default location and must not be sent as a constraint.
pub fn location_constraint(region: &str) -> Option<BucketLocationConstraint> {
    (region != "us-east-1").then(|| BucketLocationConstraint::from(region))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn us_east_1_has_no_location_constraint() {
        assert_eq!(location_constraint("us-east-1"), None);
        assert_eq!(
            location_constraint("eu-west-1"),
            Some(BucketLocationConstraint::EuWest1)
        );
        assert_eq!(
            location_constraint("ap-south-2").map(|c| c.as_str().to_string()),
            Some("ap-south-2".to_string())
        );
    }
}
