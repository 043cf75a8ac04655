use async_trait::async_trait;
use bytes::Bytes;

use crate::{Fragment, FragmentListing, FragmentResult};

/// Key-value persistence for fragment metadata records.
///
/// Records are addressed by the `(owner_id, id)` pair; neither half alone is
/// a valid key. Implementations must be safe to share across concurrently
/// executing tasks.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Write (or overwrite) a metadata record
    async fn put(&self, fragment: &Fragment) -> FragmentResult<()>;

    /// Read a metadata record; `None` when the key is absent
    async fn get(&self, owner_id: &str, id: &str) -> FragmentResult<Option<Fragment>>;

    /// List an owner's fragments. With `expand = false` only identifiers are
    /// returned (a storage-level projection). Ordering is backend-defined.
    async fn list(&self, owner_id: &str, expand: bool) -> FragmentResult<FragmentListing>;

    /// Remove a metadata record
    async fn delete(&self, owner_id: &str, id: &str) -> FragmentResult<()>;
}

/// Key-value persistence for raw fragment bytes.
///
/// `get` on an absent key is backend-defined: the in-process store returns
/// `Ok(None)`, a networked store may surface a fetch error instead. Callers
/// treat both as "data unavailable".
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Write (or overwrite) the blob for a fragment
    async fn put(&self, owner_id: &str, id: &str, data: Bytes) -> FragmentResult<()>;

    /// Read the blob for a fragment
    async fn get(&self, owner_id: &str, id: &str) -> FragmentResult<Option<Bytes>>;

    /// Remove the blob for a fragment
    async fn delete(&self, owner_id: &str, id: &str) -> FragmentResult<()>;
}

/// Object key for a fragment's blob: `"{owner_id}/{id}"`.
///
/// Collision-free because ids are unique within an owner.
pub fn blob_object_key(owner_id: &str, id: &str) -> String {
    format!("{}/{}", owner_id, id)
}
