use std::collections::BTreeMap;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::RwLock;

use crate::domain::{BlobStore, StoreError};

/// Blob store that keeps everything in process memory.
///
/// Names are listed in lexicographic order, the same order Azure uses.
#[derive(Default)]
pub struct MemoryStore {
    blobs: RwLock<BTreeMap<String, Bytes>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BlobStore for MemoryStore {
    async fn exists(&self, name: &str) -> Result<bool, StoreError> {
        Ok(self.blobs.read().await.contains_key(name))
    }

    async fn upload(&self, name: &str, content: Bytes) -> Result<(), StoreError> {
        self.blobs.write().await.insert(name.to_owned(), content);
        Ok(())
    }

    async fn download_to(
        &self,
        name: &str,
        sink: &mut (dyn AsyncWrite + Unpin + Send),
    ) -> Result<u64, StoreError> {
        // Clone the handle so the lock is not held while writing into the sink
        let content = self
            .blobs
            .read()
            .await
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(name.to_owned()))?;
        sink.write_all(&content).await?;
        sink.flush().await?;
        Ok(content.len() as u64)
    }

    async fn delete_if_exists(&self, name: &str) -> Result<bool, StoreError> {
        Ok(self.blobs.write().await.remove(name).is_some())
    }

    async fn list(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.blobs.read().await.keys().cloned().collect())
    }
}
