use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::RwLock;

use crate::{
    BlobStore, Fragment, FragmentError, FragmentListing, FragmentResult, MetadataStore,
};

type Key = (String, String);

/// In-memory metadata store for development and testing.
///
/// Lock guards wrap only the map access itself and are dropped before any
/// other await point.
#[derive(Default)]
pub struct MemoryMetadataStore {
    records: Arc<RwLock<HashMap<Key, Fragment>>>,
}

impl MemoryMetadataStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MetadataStore for MemoryMetadataStore {
    async fn put(&self, fragment: &Fragment) -> FragmentResult<()> {
        let key = (fragment.owner_id.clone(), fragment.id.to_string());
        self.records.write().await.insert(key, fragment.clone());
        Ok(())
    }

    async fn get(&self, owner_id: &str, id: &str) -> FragmentResult<Option<Fragment>> {
        let key = (owner_id.to_string(), id.to_string());
        Ok(self.records.read().await.get(&key).cloned())
    }

    async fn list(&self, owner_id: &str, expand: bool) -> FragmentResult<FragmentListing> {
        let records = self.records.read().await;
        let owned = records
            .iter()
            .filter(|((owner, _), _)| owner == owner_id);

        Ok(if expand {
            FragmentListing::Full(owned.map(|(_, fragment)| fragment.clone()).collect())
        } else {
            FragmentListing::Ids(owned.map(|((_, id), _)| id.clone()).collect())
        })
    }

    async fn delete(&self, owner_id: &str, id: &str) -> FragmentResult<()> {
        let key = (owner_id.to_string(), id.to_string());
        match self.records.write().await.remove(&key) {
            Some(_) => Ok(()),
            None => Err(FragmentError::not_found(id)),
        }
    }
}

/// In-memory blob store for development and testing
#[derive(Default)]
pub struct MemoryBlobStore {
    blobs: Arc<RwLock<HashMap<Key, Bytes>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(&self, owner_id: &str, id: &str, data: Bytes) -> FragmentResult<()> {
        let key = (owner_id.to_string(), id.to_string());
        self.blobs.write().await.insert(key, data);
        Ok(())
    }

    async fn get(&self, owner_id: &str, id: &str) -> FragmentResult<Option<Bytes>> {
        let key = (owner_id.to_string(), id.to_string());
        Ok(self.blobs.read().await.get(&key).cloned())
    }

    async fn delete(&self, owner_id: &str, id: &str) -> FragmentResult<()> {
        let key = (owner_id.to_string(), id.to_string());
        match self.blobs.write().await.remove(&key) {
            Some(_) => Ok(()),
            None => Err(FragmentError::not_found(id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_fragment(owner_id: &str, id: &str) -> Fragment {
        let mut fragment = Fragment::new(owner_id, "text/plain").unwrap();
        fragment.id = crate::FragmentId::from_string(id.to_string());
        fragment
    }

    #[tokio::test]
    async fn test_metadata_round_trip() {
        let store = MemoryMetadataStore::new();
        let fragment = test_fragment("userA", "f1");

        store.put(&fragment).await.unwrap();
        let loaded = store.get("userA", "f1").await.unwrap().unwrap();
        assert_eq!(loaded, fragment);
    }

    #[tokio::test]
    async fn test_metadata_get_absent_is_none() {
        let store = MemoryMetadataStore::new();
        assert!(store.get("userX", "missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_metadata_delete_absent_is_an_error() {
        let store = MemoryMetadataStore::new();
        let result = store.delete("userX", "missing").await;
        assert!(matches!(result, Err(FragmentError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_same_id_different_owners_do_not_collide() {
        let store = MemoryMetadataStore::new();
        store.put(&test_fragment("userA", "shared")).await.unwrap();
        store.put(&test_fragment("userB", "shared")).await.unwrap();

        store.delete("userA", "shared").await.unwrap();
        assert!(store.get("userA", "shared").await.unwrap().is_none());
        assert!(store.get("userB", "shared").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_list_is_scoped_to_owner() {
        let store = MemoryMetadataStore::new();
        for id in ["f1", "f2", "f3"] {
            store.put(&test_fragment("userA", id)).await.unwrap();
        }
        store.put(&test_fragment("userB", "f4")).await.unwrap();

        match store.list("userA", false).await.unwrap() {
            FragmentListing::Ids(mut ids) => {
                ids.sort();
                assert_eq!(ids, vec!["f1", "f2", "f3"]);
            }
            other => panic!("expected ids, got {other:?}"),
        }
        assert!(store.list("nobody", false).await.unwrap().is_empty());

        match store.list("userA", true).await.unwrap() {
            FragmentListing::Full(fragments) => assert_eq!(fragments.len(), 3),
            other => panic!("expected full records, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_blob_round_trip() {
        let store = MemoryBlobStore::new();
        let data = Bytes::from_static(b"hello world");

        store.put("userA", "f1", data.clone()).await.unwrap();
        let loaded = store.get("userA", "f1").await.unwrap().unwrap();
        assert_eq!(loaded, data);
    }

    #[tokio::test]
    async fn test_blob_get_absent_is_none() {
        let store = MemoryBlobStore::new();
        assert!(store.get("userB", "notFound").await.unwrap().is_none());
    }
}
