//! S3 model store

use super::ModelStore;
use crate::error::{PipelineError, Result};
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use std::path::Path;
use tokio::runtime::Runtime;

/// S3 client driven from synchronous code.
///
/// Owns a current-thread runtime; each call blocks until the request
/// completes. Credentials come from the default AWS provider chain.
pub struct S3ModelStore {
    runtime: Runtime,
    client: Client,
}

impl S3ModelStore {
    pub fn connect(region: &str) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        let config = runtime.block_on(
            aws_config::defaults(BehaviorVersion::latest())
                .region(Region::new(region.to_string()))
                .load(),
        );
        tracing::info!(region, "S3 client created");

        Ok(Self {
            runtime,
            client: Client::new(&config),
        })
    }
}

impl ModelStore for S3ModelStore {
    fn is_model_present(&self, bucket: &str, key: &str) -> Result<bool> {
        let response = self
            .runtime
            .block_on(self.client.head_object().bucket(bucket).key(key).send());

        match response {
            Ok(_) => Ok(true),
            Err(e) if e.as_service_error().is_some_and(|se| se.is_not_found()) => Ok(false),
            Err(e) => Err(PipelineError::connectivity(format!(
                "failed to look up s3://{}/{}: {}",
                bucket,
                key,
                DisplayErrorContext(&e)
            ))
            .with_source(e)),
        }
    }

    fn download(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        let bytes = self.runtime.block_on(async {
            let object = self
                .client
                .get_object()
                .bucket(bucket)
                .key(key)
                .send()
                .await
                .map_err(|e| {
                    PipelineError::connectivity(format!(
                        "failed to fetch s3://{}/{}: {}",
                        bucket,
                        key,
                        DisplayErrorContext(&e)
                    ))
                    .with_source(e)
                })?;

            object.body.collect().await.map_err(|e| {
                PipelineError::connectivity(format!("failed to read s3://{}/{}", bucket, key))
                    .with_source(e)
            })
        })?;

        let data = bytes.into_bytes().to_vec();
        tracing::info!(bucket, key, bytes = data.len(), "model downloaded");
        Ok(data)
    }

    fn upload(&self, path: &Path, bucket: &str, key: &str) -> Result<()> {
        self.runtime.block_on(async {
            let body = ByteStream::from_path(path).await.map_err(|e| {
                PipelineError::connectivity(format!("failed to open {}", path.display()))
                    .with_source(e)
            })?;

            self.client
                .put_object()
                .bucket(bucket)
                .key(key)
                .body(body)
                .send()
                .await
                .map_err(|e| {
                    PipelineError::connectivity(format!(
                        "failed to upload s3://{}/{}: {}",
                        bucket,
                        key,
                        DisplayErrorContext(&e)
                    ))
                    .with_source(e)
                })?;
            Ok::<_, PipelineError>(())
        })?;

        tracing::info!(from = %path.display(), bucket, key, "model uploaded");
        Ok(())
    }
}
