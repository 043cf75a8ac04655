use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;
use tracing::{debug, info, warn};

use crate::convert::{convert, Converted};
use crate::fragment::base_mime;
use crate::{
    BlobStore, DynamoMetadataStore, Fragment, FragmentError, FragmentListing, FragmentResult,
    MemoryBlobStore, MemoryMetadataStore, MetadataStore, S3BlobStore, StorageConfig,
};

/// The fragment layer's entry point - services embed this and inject a
/// backend pair once, at composition time.
///
/// Every operation that touches storage goes through the two injected store
/// traits; nothing here branches on which backend is behind them. Each
/// loaded [`Fragment`] is a per-request value: concurrent writers to the
/// same fragment race with last-writer-wins semantics, and no operation
/// holds a lock across an await.
pub struct FragmentAdapter {
    metadata: Arc<dyn MetadataStore>,
    blobs: Arc<dyn BlobStore>,
}

impl FragmentAdapter {
    /// Create an adapter over an explicit store pair
    pub fn new<M, B>(metadata: M, blobs: B) -> Self
    where
        M: MetadataStore + 'static,
        B: BlobStore + 'static,
    {
        Self {
            metadata: Arc::new(metadata),
            blobs: Arc::new(blobs),
        }
    }

    /// Create an adapter over the in-process backend pair
    pub fn in_memory() -> Self {
        Self::new(MemoryMetadataStore::new(), MemoryBlobStore::new())
    }

    /// Create an adapter from startup configuration: a configured region
    /// selects the S3 + DynamoDB pair, otherwise both stores are in-process.
    pub async fn from_config(config: &StorageConfig) -> FragmentResult<Self> {
        if config.is_aws() {
            info!("using AWS backends for fragment storage");
            let metadata = DynamoMetadataStore::new(config).await?;
            let blobs = S3BlobStore::new(config).await?;
            Ok(Self::new(metadata, blobs))
        } else {
            info!("using in-memory backends for fragment storage");
            Ok(Self::in_memory())
        }
    }

    /// List an owner's fragments: identifiers only, or fully hydrated
    /// records when `expand` is set. An unknown owner yields an empty
    /// listing, never an error.
    pub async fn by_user(&self, owner_id: &str, expand: bool) -> FragmentResult<FragmentListing> {
        let listing = self.metadata.list(owner_id, expand).await?;
        if let FragmentListing::Full(fragments) = &listing {
            for fragment in fragments {
                fragment.validate()?;
            }
        }
        Ok(listing)
    }

    /// Load one fragment's metadata; [`FragmentError::NotFound`] when absent
    pub async fn by_id(&self, owner_id: &str, id: &str) -> FragmentResult<Fragment> {
        let fragment = self
            .metadata
            .get(owner_id, id)
            .await?
            .ok_or_else(|| FragmentError::not_found(id))?;
        fragment.validate()?;
        Ok(fragment)
    }

    /// Create a fragment from a declared content type and its first payload.
    ///
    /// The metadata persisted at the end reflects the true stored size and
    /// write timestamp, never anything the caller declared.
    pub async fn create(
        &self,
        owner_id: &str,
        content_type: &str,
        data: Bytes,
    ) -> FragmentResult<Fragment> {
        let mut fragment = Fragment::new(owner_id, content_type)?;
        self.set_data(&mut fragment, data).await?;

        info!(
            id = %fragment.id,
            owner_id,
            size = fragment.size,
            content_type = %fragment.content_type,
            "fragment created"
        );
        Ok(fragment)
    }

    /// Persist the in-memory metadata record, refreshing `updated` first
    pub async fn save(&self, fragment: &mut Fragment) -> FragmentResult<()> {
        fragment.updated = Utc::now();
        self.metadata.put(fragment).await
    }

    /// Read the fragment's raw bytes.
    ///
    /// A blob the store cannot supply - missing or unreadable - surfaces as
    /// [`FragmentError::DataUnavailable`]; a metadata record without a blob
    /// is an inconsistency this layer reports rather than repairs.
    pub async fn get_data(&self, fragment: &Fragment) -> FragmentResult<Bytes> {
        match self.blobs.get(&fragment.owner_id, fragment.id.as_str()).await? {
            Some(data) => Ok(data),
            None => Err(FragmentError::data_unavailable(
                &fragment.owner_id,
                fragment.id.as_str(),
            )),
        }
    }

    /// Write the fragment's raw bytes and persist the refreshed metadata.
    ///
    /// The blob write lands before the metadata persist; if the latter fails
    /// the two stores are transiently inconsistent and the error propagates.
    pub async fn set_data(&self, fragment: &mut Fragment, data: Bytes) -> FragmentResult<()> {
        self.blobs
            .put(&fragment.owner_id, fragment.id.as_str(), data.clone())
            .await?;
        // size always comes from the stored payload
        fragment.size = data.len() as u64;
        self.save(fragment).await
    }

    /// Replace the fragment's bytes, holding the declared content type to
    /// the fragment's existing base mime. A mismatch is rejected, not
    /// coerced.
    pub async fn replace_data(
        &self,
        fragment: &mut Fragment,
        declared_type: &str,
        data: Bytes,
    ) -> FragmentResult<()> {
        let declared = base_mime(declared_type)
            .ok_or_else(|| FragmentError::validation("invalid content type"))?;
        if declared != fragment.mime_type() {
            warn!(
                id = %fragment.id,
                existing = %fragment.mime_type(),
                declared = %declared,
                "content type does not match existing fragment type"
            );
            return Err(FragmentError::validation(
                "content type does not match existing fragment type",
            ));
        }
        self.set_data(fragment, data).await
    }

    /// Remove the metadata record, then the blob. Best-effort: the first
    /// failure propagates and nothing is compensated.
    pub async fn delete(&self, owner_id: &str, id: &str) -> FragmentResult<()> {
        self.metadata.delete(owner_id, id).await?;
        self.blobs.delete(owner_id, id).await?;
        debug!(owner_id, id, "fragment deleted");
        Ok(())
    }

    /// Convert the fragment's bytes to the format named by an extension
    /// token and return them with their new content type.
    pub async fn convert_data(&self, fragment: &Fragment, ext: &str) -> FragmentResult<Converted> {
        if !fragment.can_convert_to(ext) {
            return Err(FragmentError::unsupported_conversion(
                fragment.mime_type(),
                ext,
            ));
        }
        let data = self.get_data(fragment).await?;
        convert(data, &fragment.content_type, ext)
    }
}
