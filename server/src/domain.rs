use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;
use tokio::io::AsyncWrite;

/// Failure reported by a blob store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("blob '{0}' not found")]
    NotFound(String),

    #[error("storage request failed: {0}")]
    RequestFailed(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("sink write failed: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    pub fn request_failed<E>(e: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::RequestFailed(Box::new(e))
    }
}

/// Operations a single blob container must support.
///
/// Implementations must be safe to share between requests. Dropping a returned
/// future aborts the underlying request.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn exists(&self, name: &str) -> Result<bool, StoreError>;

    /// Uploads `content` under `name`, replacing any existing blob.
    async fn upload(&self, name: &str, content: Bytes) -> Result<(), StoreError>;

    /// Streams the blob content into `sink` and returns the number of bytes written.
    async fn download_to(
        &self,
        name: &str,
        sink: &mut (dyn AsyncWrite + Unpin + Send),
    ) -> Result<u64, StoreError>;

    /// Returns `true` if a blob existed and was removed.
    async fn delete_if_exists(&self, name: &str) -> Result<bool, StoreError>;

    async fn list(&self) -> Result<Vec<String>, StoreError>;
}
