use std::sync::Arc;

use async_trait::async_trait;
use azure_core::error::ErrorKind;
use azure_storage::prelude::*;
use azure_storage::{CloudLocation, ConnectionString};
use azure_storage_blobs::prelude::*;
use bytes::Bytes;
use futures::TryStreamExt;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::config::{StartupError, StorageConnection};
use crate::domain::{BlobStore, StoreError};

/// Blob store backed by a single Azure Blob Storage container.
#[derive(Clone)]
pub struct AzureBlobStore {
    container: String,
    client: Arc<ContainerClient>,
}

impl AzureBlobStore {
    /// Builds a client for `container` and creates the container if it is absent.
    pub async fn connect(
        connection: &StorageConnection,
        container: &str,
    ) -> Result<Self, StartupError> {
        let builder = match connection {
            StorageConnection::Memory => {
                return Err(StartupError::Connection(
                    "memory storage has no Azure client".into(),
                ))
            }
            StorageConnection::DevelopmentStorage => ClientBuilder::emulator(),
            StorageConnection::Azure {
                account,
                endpoint,
                connection_string,
            } => {
                let credentials = ConnectionString::new(connection_string)?.storage_credentials()?;
                ClientBuilder::with_location(
                    CloudLocation::Custom {
                        account: account.clone(),
                        uri: endpoint.clone(),
                    },
                    credentials,
                )
            }
        };

        let store = Self {
            container: container.to_owned(),
            client: Arc::new(builder.container_client(container.to_owned())),
        };
        store.ensure_container().await?;
        Ok(store)
    }

    async fn ensure_container(&self) -> Result<(), StartupError> {
        if self.client.exists().await? {
            tracing::debug!("container {} exists", self.container);
            return Ok(());
        }
        match self.client.create().await {
            Ok(_) => {
                tracing::info!("container {} created", self.container);
                Ok(())
            }
            // Another instance may have created it in between
            Err(e) if status_of(&e) == Some(409) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

fn status_of(e: &azure_core::Error) -> Option<u16> {
    match e.kind() {
        ErrorKind::HttpResponse { status, .. } => Some(*status as u16),
        _ => None,
    }
}

fn map_error(e: azure_core::Error, name: &str) -> StoreError {
    if status_of(&e) == Some(404) {
        StoreError::NotFound(name.to_owned())
    } else {
        StoreError::request_failed(e)
    }
}

// A missing blob is not a failure for delete
fn deleted<T>(result: azure_core::Result<T>) -> Result<bool, StoreError> {
    match result {
        Ok(_) => Ok(true),
        Err(e) if status_of(&e) == Some(404) => Ok(false),
        Err(e) => Err(StoreError::request_failed(e)),
    }
}

#[async_trait]
impl BlobStore for AzureBlobStore {
    async fn exists(&self, name: &str) -> Result<bool, StoreError> {
        self.client
            .blob_client(name)
            .exists()
            .await
            .map_err(|e| map_error(e, name))
    }

    async fn upload(&self, name: &str, content: Bytes) -> Result<(), StoreError> {
        self.client
            .blob_client(name)
            .put_block_blob(content)
            .await
            .map_err(|e| map_error(e, name))?;
        Ok(())
    }

    async fn download_to(
        &self,
        name: &str,
        sink: &mut (dyn AsyncWrite + Unpin + Send),
    ) -> Result<u64, StoreError> {
        let mut stream = self.client.blob_client(name).get().into_stream();
        let mut written = 0u64;
        while let Some(response) = stream.try_next().await.map_err(|e| map_error(e, name))? {
            let chunk = response
                .data
                .collect()
                .await
                .map_err(|e| map_error(e, name))?;
            sink.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        sink.flush().await?;
        Ok(written)
    }

    async fn delete_if_exists(&self, name: &str) -> Result<bool, StoreError> {
        deleted(self.client.blob_client(name).delete().await)
    }

    async fn list(&self) -> Result<Vec<String>, StoreError> {
        let mut stream = self.client.list_blobs().into_stream();
        let mut names = Vec::new();
        while let Some(page) = stream
            .try_next()
            .await
            .map_err(StoreError::request_failed)?
        {
            names.extend(page.blobs.blobs().map(|blob| blob.name.clone()));
        }
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use azure_core::StatusCode;
    use rstest::rstest;

    fn http_error(status: StatusCode) -> azure_core::Error {
        azure_core::Error::new(
            ErrorKind::HttpResponse {
                status,
                error_code: None,
            },
            "storage responded with an error",
        )
    }

    #[rstest]
    #[case(StatusCode::NotFound, Some(404))]
    #[case(StatusCode::Conflict, Some(409))]
    #[case(StatusCode::ServiceUnavailable, Some(503))]
    #[trace]
    fn status_of_http_response(#[case] status: StatusCode, #[case] expected: Option<u16>) {
        // Act
        let actual = status_of(&http_error(status));

        // Assert
        assert_eq!(actual, expected);
    }

    #[test]
    fn status_of_io_error_none() {
        // Arrange
        let e = azure_core::Error::message(ErrorKind::Io, "connection reset");

        // Act
        let actual = status_of(&e);

        // Assert
        assert_eq!(actual, None);
    }

    #[test]
    fn map_error_not_found() {
        // Act
        let e = map_error(http_error(StatusCode::NotFound), "a.txt");

        // Assert
        assert!(matches!(e, StoreError::NotFound(name) if name == "a.txt"));
    }

    #[rstest]
    #[case(StatusCode::Conflict)]
    #[case(StatusCode::ServiceUnavailable)]
    #[trace]
    fn map_error_request_failed(#[case] status: StatusCode) {
        // Act
        let e = map_error(http_error(status), "a.txt");

        // Assert
        assert!(matches!(e, StoreError::RequestFailed(_)));
    }

    #[test]
    fn deleted_success_true() {
        // Act
        let result = deleted(Ok(()));

        // Assert
        assert!(matches!(result, Ok(true)));
    }

    #[test]
    fn deleted_missing_blob_false() {
        // Act
        let result = deleted::<()>(Err(http_error(StatusCode::NotFound)));

        // Assert
        assert!(matches!(result, Ok(false)));
    }

    #[rstest]
    #[case(StatusCode::Conflict)]
    #[case(StatusCode::ServiceUnavailable)]
    #[trace]
    fn deleted_other_status_failure(#[case] status: StatusCode) {
        // Act
        let result = deleted::<()>(Err(http_error(status)));

        // Assert
        assert!(matches!(result, Err(StoreError::RequestFailed(_))));
    }
}
