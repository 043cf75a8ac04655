use async_trait::async_trait;
use aws_sdk_s3::{primitives::ByteStream as AwsByteStream, Client};
use bytes::Bytes;
use tracing::{debug, error};

use crate::store::blob_object_key;
use crate::{BlobStore, FragmentError, FragmentResult, StorageConfig};

/// Blob store backed by S3 (or an S3-compatible endpoint).
///
/// Objects live at `"{ownerId}/{id}"` with no additional envelope. Read
/// failures — including a missing key — collapse into the generic
/// unable-to-read condition; callers cannot distinguish them and are not
/// meant to.
pub struct S3BlobStore {
    client: Client,
    bucket: String,
}

impl S3BlobStore {
    pub async fn new(config: &StorageConfig) -> FragmentResult<Self> {
        let bucket = config.require_s3_bucket()?.to_string();
        let shared = config.sdk_config().await?;

        let mut builder = aws_sdk_s3::config::Builder::from(&shared).force_path_style(true);
        if let Some(endpoint) = &config.s3_endpoint {
            debug!(%endpoint, "using alternate S3 endpoint");
            builder = builder.endpoint_url(endpoint);
        }

        Ok(Self {
            client: Client::from_conf(builder.build()),
            bucket,
        })
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn put(&self, owner_id: &str, id: &str, data: Bytes) -> FragmentResult<()> {
        let key = blob_object_key(owner_id, id);
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(AwsByteStream::from(data.to_vec()))
            .send()
            .await
            .map_err(|err| {
                error!(error = %err, owner_id, id, "error writing fragment data to S3");
                FragmentError::storage(err)
            })?;

        debug!(owner_id, id, "fragment data written to S3");
        Ok(())
    }

    async fn get(&self, owner_id: &str, id: &str) -> FragmentResult<Option<Bytes>> {
        let key = blob_object_key(owner_id, id);
        let output = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(&key)
            .send()
            .await
            .map_err(|err| {
                error!(error = %err, bucket = %self.bucket, %key, "error streaming fragment data from S3");
                FragmentError::data_unavailable(owner_id, id)
            })?;

        let body = output.body.collect().await.map_err(|err| {
            error!(error = %err, bucket = %self.bucket, %key, "error collecting fragment data from S3");
            FragmentError::data_unavailable(owner_id, id)
        })?;

        Ok(Some(body.into_bytes()))
    }

    async fn delete(&self, owner_id: &str, id: &str) -> FragmentResult<()> {
        let key = blob_object_key(owner_id, id);
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(&key)
            .send()
            .await
            .map_err(|err| {
                error!(error = %err, owner_id, id, "error deleting fragment data from S3");
                FragmentError::storage(err)
            })?;
        Ok(())
    }
}
