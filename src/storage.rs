use anyhow::Context;
use async_trait::async_trait;
use aws_config::{defaults, BehaviorVersion};
use aws_credential_types::Credentials;
use aws_sdk_s3::{
    config::{Builder as S3ConfigBuilder, Region},
    types::{BucketCannedAcl, BucketLocationConstraint, CreateBucketConfiguration},
    Client,
};
use aws_smithy_types::byte_stream::ByteStream;
use bytes::Bytes;
use tracing::info;

use crate::config::StorageConfig;

/// Blob store holding receipt files.
#[async_trait]
pub trait StorageClient: Send + Sync {
    /// Creates the bucket (private) if it does not exist yet. Idempotent.
    async fn ensure_bucket(&self) -> anyhow::Result<()>;
    async fn put_object(&self, key: &str, body: Bytes, content_type: &str) -> anyhow::Result<()>;
    async fn delete_object(&self, key: &str) -> anyhow::Result<()>;
    /// Retrievable address of an object.
    fn object_url(&self, key: &str) -> String;
}

#[derive(Clone)]
pub struct Storage {
    client: Client,
    bucket: String,
    region: String,
    base_url: String,
}

impl Storage {
    pub async fn new(cfg: &StorageConfig) -> anyhow::Result<Self> {
        let shared = defaults(BehaviorVersion::latest())
            .region(Region::new(cfg.region.clone()))
            .credentials_provider(Credentials::new(
                &cfg.access_key,
                &cfg.secret_key,
                None,
                None,
                "static",
            ))
            .endpoint_url(&cfg.endpoint)
            .load()
            .await;

        let conf = S3ConfigBuilder::from(&shared)
            .endpoint_url(&cfg.endpoint)
            .force_path_style(true)
            .build();

        Ok(Self {
            client: Client::from_conf(conf),
            bucket: cfg.bucket.clone(),
            region: cfg.region.clone(),
            base_url: base_url(cfg),
        })
    }
}

fn base_url(cfg: &StorageConfig) -> String {
    match &cfg.public_url {
        Some(url) => url.trim_end_matches('/').to_string(),
        None => format!("{}/{}", cfg.endpoint.trim_end_matches('/'), cfg.bucket),
    }
}

#[async_trait]
impl StorageClient for Storage {
    async fn ensure_bucket(&self) -> anyhow::Result<()> {
        match self.client.head_bucket().bucket(&self.bucket).send().await {
            Ok(_) => return Ok(()),
            Err(err) => {
                let missing = err
                    .as_service_error()
                    .map(|e| e.is_not_found())
                    .unwrap_or(false);
                if !missing {
                    return Err(err).context("s3 head_bucket");
                }
            }
        }

        let mut req = self
            .client
            .create_bucket()
            .bucket(&self.bucket)
            .acl(BucketCannedAcl::Private);
        // us-east-1 rejects an explicit location constraint
        if self.region != "us-east-1" {
            req = req.create_bucket_configuration(
                CreateBucketConfiguration::builder()
                    .location_constraint(BucketLocationConstraint::from(self.region.as_str()))
                    .build(),
            );
        }

        match req.send().await {
            Ok(_) => {
                info!(bucket = %self.bucket, "created receipt bucket");
                Ok(())
            }
            Err(err)
                if err
                    .as_service_error()
                    .map(|e| e.is_bucket_already_owned_by_you() || e.is_bucket_already_exists())
                    .unwrap_or(false) =>
            {
                Ok(())
            }
            Err(err) => Err(err).context("s3 create_bucket"),
        }
    }

    async fn put_object(&self, key: &str, body: Bytes, content_type: &str) -> anyhow::Result<()> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(body))
            .content_type(content_type)
            .send()
            .await
            .context("s3 put_object")?;
        Ok(())
    }

    async fn delete_object(&self, key: &str) -> anyhow::Result<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .context("s3 delete_object")?;
        Ok(())
    }

    fn object_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url, key)
    }
}
