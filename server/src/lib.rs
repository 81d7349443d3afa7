use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tower::ServiceBuilder;
use tower_http::{classify::ServerErrorsFailureClass, trace::TraceLayer};
use tracing::Span;

pub mod azure;
pub mod config;
pub mod domain;
pub mod file_reply;
mod handlers;
pub mod memory;
pub mod repository;

#[cfg(test)] // <-- not needed in integration tests
extern crate rstest;

use crate::azure::AzureBlobStore;
use crate::config::{Settings, StartupError, StorageConnection};
use crate::domain::BlobStore;
use crate::handlers::AppState;
use crate::memory::MemoryStore;
use crate::repository::FileRepository;

pub use crate::handlers::{ApiDoc, UploadForm};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub async fn run(settings: Settings) -> Result<(), StartupError> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "filesvc=debug,server=debug,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let store = connect_store(&settings).await?;
    let repository = Arc::new(FileRepository::new(store));

    let socket = SocketAddr::from(([0, 0, 0, 0], settings.port));
    let listener = TcpListener::bind(socket).await?;
    tracing::debug!("listening on {socket}");

    let shutdown = CancellationToken::new();
    let app = create_routes(repository, shutdown.clone());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await?;
    Ok(())
}

/// Builds a ready to use store from the settings.
///
/// For Azure the container is created when it does not exist yet.
pub async fn connect_store(settings: &Settings) -> Result<Arc<dyn BlobStore>, StartupError> {
    if settings.container.trim().is_empty() {
        return Err(StartupError::EmptyContainer);
    }
    let connection = StorageConnection::parse(&settings.service)?;
    let store: Arc<dyn BlobStore> = match connection {
        StorageConnection::Memory => {
            tracing::warn!("using in-memory storage, files are lost on exit");
            Arc::new(MemoryStore::new())
        }
        connection => {
            tracing::info!("using Azure container {}", settings.container);
            Arc::new(AzureBlobStore::connect(&connection, &settings.container).await?)
        }
    };
    Ok(store)
}

/// Creates the HTTP routes. `shutdown` aborts in-flight storage calls when fired.
pub fn create_routes(repository: Arc<FileRepository>, shutdown: CancellationToken) -> Router {
    let state = AppState {
        repository,
        shutdown,
    };
    Router::new()
        .route(
            "/api/file",
            post(handlers::upload_file).get(handlers::get_listing),
        )
        .route(
            "/api/file/id/:file_name",
            get(handlers::get_file).delete(handlers::delete_file),
        )
        .route("/api-docs/openapi.json", get(handlers::openapi))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http().on_failure(
                    |error: ServerErrorsFailureClass, _latency: Duration, _span: &Span| {
                        tracing::error!("Server error: {error}");
                    },
                ))
                .layer(DefaultBodyLimit::disable())
                .into_inner(),
        )
        .with_state(state)
}

/// Completes on Ctrl+C or SIGTERM and fires `shutdown`.
pub async fn shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("signal received, starting graceful shutdown");
    shutdown.cancel();
}
