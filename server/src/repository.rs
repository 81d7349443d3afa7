use std::future::Future;
use std::sync::Arc;

use bytes::Bytes;
use kernel::{FileName, InvalidFileName};
use tokio::io::AsyncWrite;
use tokio_util::sync::CancellationToken;

use crate::domain::{BlobStore, StoreError};

/// Result of a file upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// No file with this name existed before.
    Created,
    /// An existing file was replaced.
    Overwritten,
    /// The store rejected the request. The error was logged.
    Failed,
}

impl SaveOutcome {
    #[must_use]
    pub fn is_success(self) -> bool {
        !matches!(self, SaveOutcome::Failed)
    }
}

/// Maps file operations onto a blob store.
///
/// Store errors never leave the repository. They are logged and reported as a
/// negative result. The only error a caller sees is [`InvalidFileName`] from [`save`].
///
/// [`save`]: FileRepository::save
pub struct FileRepository {
    store: Arc<dyn BlobStore>,
}

impl FileRepository {
    #[must_use]
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        Self { store }
    }

    /// Uploads `content` under `name`, replacing any existing file.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidFileName`] if `name` is empty or whitespace only. Nothing is
    /// written in that case.
    pub async fn save(
        &self,
        name: &str,
        content: Bytes,
        cancel: &CancellationToken,
    ) -> Result<SaveOutcome, InvalidFileName> {
        let name = FileName::new(name)?;
        let name = name.as_str();

        let Some(existed) = guard("save", name, cancel, self.store.exists(name)).await else {
            return Ok(SaveOutcome::Failed);
        };

        let size = content.len();
        if guard("save", name, cancel, self.store.upload(name, content))
            .await
            .is_none()
        {
            return Ok(SaveOutcome::Failed);
        }

        tracing::info!("file: {name} written: {size} replaced: {existed}");
        Ok(if existed {
            SaveOutcome::Overwritten
        } else {
            SaveOutcome::Created
        })
    }

    /// Lists all file names. Empty both for an empty container and on failure.
    pub async fn list(&self, cancel: &CancellationToken) -> Vec<String> {
        guard("list", "*", cancel, self.store.list())
            .await
            .unwrap_or_default()
    }

    /// Streams the file into `sink`.
    ///
    /// Returns `false` without touching `sink` if the file does not exist. Also returns
    /// `false` if the download fails after the existence check, e.g. because the file
    /// was deleted in between.
    pub async fn fetch<W>(&self, name: &str, sink: &mut W, cancel: &CancellationToken) -> bool
    where
        W: AsyncWrite + Unpin + Send,
    {
        match guard("fetch", name, cancel, self.store.exists(name)).await {
            Some(true) => {}
            Some(false) => {
                tracing::info!("file: {name} not exist");
                return false;
            }
            None => return false,
        }

        match guard("fetch", name, cancel, self.store.download_to(name, sink)).await {
            Some(size) => {
                tracing::info!("file: {name} read: {size}");
                true
            }
            None => false,
        }
    }

    /// Returns `true` only if a file existed and was removed.
    pub async fn delete(&self, name: &str, cancel: &CancellationToken) -> bool {
        match guard("delete", name, cancel, self.store.delete_if_exists(name)).await {
            Some(true) => {
                tracing::info!("file: {name} deleted");
                true
            }
            Some(false) => {
                tracing::info!("file: {name} not exist");
                false
            }
            None => false,
        }
    }
}

/// Runs a store call until it finishes or `cancel` fires.
///
/// Errors and cancellation are logged and turned into `None`.
async fn guard<T, F>(operation: &str, name: &str, cancel: &CancellationToken, call: F) -> Option<T>
where
    F: Future<Output = Result<T, StoreError>>,
{
    tokio::select! {
        biased;
        () = cancel.cancelled() => {
            tracing::warn!(operation, file = name, "storage call cancelled");
            None
        }
        result = call => match result {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::error!(operation, file = name, error = %e, "storage call failed");
                None
            }
        },
    }
}
