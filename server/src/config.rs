use azure_storage::{ConnectionString, EndpointProtocol};
use thiserror::Error;

pub const DEFAULT_SERVICE: &str = "UseDevelopmentStorage=true";
pub const DEFAULT_CONTAINER: &str = "files";
pub const DEFAULT_PORT: u16 = 5000;

/// Storage service value that selects the in-process store.
pub const MEMORY_SERVICE: &str = "memory";

const DEFAULT_ENDPOINT_SUFFIX: &str = "core.windows.net";

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid storage connection string: {0}")]
    Connection(String),

    #[error("container name must not be empty")]
    EmptyContainer,

    #[error("storage client error: {0}")]
    Storage(#[from] azure_core::Error),

    #[error("socket error: {0}")]
    Io(#[from] std::io::Error),
}

/// Settings read once at process start.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Azure connection string or [`MEMORY_SERVICE`].
    pub service: String,
    pub container: String,
    pub port: u16,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            service: DEFAULT_SERVICE.to_owned(),
            container: DEFAULT_CONTAINER.to_owned(),
            port: DEFAULT_PORT,
        }
    }
}

/// Typed form of the storage service setting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageConnection {
    Memory,
    /// Local Azurite emulator with its well known account.
    DevelopmentStorage,
    Azure {
        account: String,
        /// Blob service root, e.g. `https://acc.blob.core.windows.net`.
        endpoint: String,
        /// Source string the credentials are taken from when the client is built.
        connection_string: String,
    },
}

impl StorageConnection {
    /// Parses a storage service setting.
    ///
    /// Accepts [`MEMORY_SERVICE`] or an Azure connection string. The blob endpoint is
    /// `BlobEndpoint` when present, otherwise it is derived from `AccountName`,
    /// `DefaultEndpointsProtocol` and `EndpointSuffix`.
    pub fn parse(service: &str) -> Result<Self, StartupError> {
        let service = service.trim();
        if service.eq_ignore_ascii_case(MEMORY_SERVICE) {
            return Ok(Self::Memory);
        }

        let parsed = ConnectionString::new(service).map_err(connection_error)?;
        if parsed.use_development_storage == Some(true) {
            return Ok(Self::DevelopmentStorage);
        }
        parsed.storage_credentials().map_err(connection_error)?;

        let (account, endpoint) = match parsed.blob_endpoint {
            Some(uri) => {
                let url = azure_core::Url::parse(uri)
                    .map_err(|e| StartupError::Connection(format!("invalid BlobEndpoint: {e}")))?;
                let account = match parsed.account_name {
                    Some(account) => account.to_owned(),
                    None => account_from_host(&url)?,
                };
                (account, uri.trim_end_matches('/').to_owned())
            }
            None => {
                let account = parsed.account_name.ok_or_else(|| {
                    StartupError::Connection("missing AccountName or BlobEndpoint".into())
                })?;
                let protocol = match parsed.default_endpoints_protocol {
                    Some(EndpointProtocol::Http) => "http",
                    _ => "https",
                };
                let suffix = parsed.endpoint_suffix.unwrap_or(DEFAULT_ENDPOINT_SUFFIX);
                (
                    account.to_owned(),
                    format!("{protocol}://{account}.blob.{suffix}"),
                )
            }
        };

        Ok(Self::Azure {
            account,
            endpoint,
            connection_string: service.to_owned(),
        })
    }
}

fn connection_error(e: azure_core::Error) -> StartupError {
    StartupError::Connection(e.to_string())
}

// https://{account}.blob.{suffix}/
fn account_from_host(url: &azure_core::Url) -> Result<String, StartupError> {
    url.host_str()
        .and_then(|host| host.split('.').next())
        .filter(|label| !label.is_empty())
        .map(ToOwned::to_owned)
        .ok_or_else(|| StartupError::Connection("BlobEndpoint has no host".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("memory")]
    #[case("MEMORY")]
    #[case(" memory ")]
    #[trace]
    fn parse_memory(#[case] service: &str) {
        // Act
        let connection = StorageConnection::parse(service).unwrap();

        // Assert
        assert_eq!(connection, StorageConnection::Memory);
    }

    #[test]
    fn parse_development_storage() {
        // Act
        let connection = StorageConnection::parse("UseDevelopmentStorage=true").unwrap();

        // Assert
        assert_eq!(connection, StorageConnection::DevelopmentStorage);
    }

    #[rstest]
    #[case(
        "DefaultEndpointsProtocol=https;AccountName=acc;AccountKey=a2V5;EndpointSuffix=core.windows.net",
        "acc",
        "https://acc.blob.core.windows.net"
    )]
    #[case(
        "AccountName=acc;AccountKey=a2V5",
        "acc",
        "https://acc.blob.core.windows.net"
    )]
    #[case(
        "AccountName=acc;AccountKey=a2V5;BlobEndpoint=https://acc.blob.core.windows.net/",
        "acc",
        "https://acc.blob.core.windows.net"
    )]
    #[case(
        "BlobEndpoint=https://acc.blob.core.windows.net/;SharedAccessSignature=sv=2022-11-02&ss=b&sig=abc",
        "acc",
        "https://acc.blob.core.windows.net"
    )]
    #[case(
        "DefaultEndpointsProtocol=https;AccountName=acc;AccountKey=a2V5;EndpointSuffix=core.chinacloudapi.cn",
        "acc",
        "https://acc.blob.core.chinacloudapi.cn"
    )]
    #[case(
        "DefaultEndpointsProtocol=http;AccountName=acc;AccountKey=a2V5",
        "acc",
        "http://acc.blob.core.windows.net"
    )]
    #[case(
        "AccountName=devstoreaccount1;AccountKey=a2V5;BlobEndpoint=http://127.0.0.1:10010/devstoreaccount1",
        "devstoreaccount1",
        "http://127.0.0.1:10010/devstoreaccount1"
    )]
    #[trace]
    fn parse_azure_endpoint(
        #[case] service: &str,
        #[case] expected_account: &str,
        #[case] expected_endpoint: &str,
    ) {
        // Act
        let connection = StorageConnection::parse(service).unwrap();

        // Assert
        match connection {
            StorageConnection::Azure {
                account,
                endpoint,
                connection_string,
            } => {
                assert_eq!(account, expected_account);
                assert_eq!(endpoint, expected_endpoint);
                assert_eq!(connection_string, service);
            }
            other => panic!("unexpected connection {other:?}"),
        }
    }

    #[rstest]
    #[case("AccountKey=abc")]
    #[case("AccountName")]
    #[case("AccountName=acc;AccountKey=a2V5;BlobEndpoint=not a url")]
    #[trace]
    fn parse_invalid(#[case] service: &str) {
        // Act
        let result = StorageConnection::parse(service);

        // Assert
        assert!(matches!(result, Err(StartupError::Connection(_))));
    }
}
