use std::sync::Arc;

use axum::extract::{Multipart, Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use tokio_util::sync::CancellationToken;
use utoipa::{OpenApi, ToSchema};

use crate::file_reply::FileReply;
use crate::repository::{FileRepository, SaveOutcome};

/// State shared by all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<FileRepository>,
    /// Fired on graceful shutdown.
    pub shutdown: CancellationToken,
}

impl AppState {
    /// Token for a single request.
    ///
    /// It is cancelled on shutdown and, through the drop guard held by the handler,
    /// when the handler future is dropped because the client went away.
    fn request_token(&self) -> CancellationToken {
        self.shutdown.child_token()
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(upload_file, get_listing, get_file, delete_file),
    components(schemas(UploadForm)),
    tags((name = "files", description = "Files stored in the blob container"))
)]
pub struct ApiDoc;

/// Multipart body of an upload. Only describes the form in the API document.
#[derive(ToSchema)]
pub struct UploadForm {
    #[schema(rename = "data", value_type = String, format = Binary)]
    _data: Vec<u8>,
}

/// Uploads a single file from multipart form.
#[utoipa::path(
    post,
    path = "/api/file",
    tag = "files",
    request_body(content_type = "multipart/form-data", content = UploadForm),
    responses(
        (status = 201, description = "File created", headers(("location" = String, description = "File name"))),
        (status = 200, description = "File replaced or not stored"),
        (status = 400, description = "No file in the form or blank file name", body = String)
    ),
)]
pub async fn upload_file(State(state): State<AppState>, mut multipart: Multipart) -> Response {
    let cancel = state.request_token();
    let _guard = cancel.clone().drop_guard();

    let (file_name, content) = loop {
        match multipart.next_field().await {
            Ok(Some(field)) => {
                let Some(file_name) = field.file_name().map(ToOwned::to_owned) else {
                    continue;
                };
                match field.bytes().await {
                    Ok(content) => break (file_name, content),
                    Err(e) => {
                        tracing::error!("file '{file_name}' not read. Error: {e}");
                        return e.into_response();
                    }
                }
            }
            Ok(None) => {
                return (StatusCode::BAD_REQUEST, "form contains no file").into_response();
            }
            Err(e) => {
                tracing::error!("{e}");
                return e.into_response();
            }
        }
    };

    match state.repository.save(&file_name, content, &cancel).await {
        Ok(SaveOutcome::Created) => {
            let location = urlencoding::encode(&file_name).into_owned();
            (StatusCode::CREATED, [(header::LOCATION, location)]).into_response()
        }
        Ok(SaveOutcome::Overwritten | SaveOutcome::Failed) => StatusCode::OK.into_response(),
        Err(e) => {
            tracing::error!("file '{file_name}' rejected. Error: {e}");
            (StatusCode::BAD_REQUEST, e.to_string()).into_response()
        }
    }
}

/// Lists the names of all files
#[utoipa::path(
    get,
    path = "/api/file",
    tag = "files",
    responses(
        (status = 200, description = "File names", body = [String]),
        (status = 204, description = "No files")
    ),
)]
pub async fn get_listing(State(state): State<AppState>) -> Response {
    let cancel = state.request_token();
    let _guard = cancel.clone().drop_guard();

    let names = state.repository.list(&cancel).await;
    if names.is_empty() {
        StatusCode::NO_CONTENT.into_response()
    } else {
        (StatusCode::OK, Json(names)).into_response()
    }
}

/// Gets file binary content by file name
#[utoipa::path(
    get,
    path = "/api/file/id/{file_name}",
    tag = "files",
    responses(
        (status = 200, description = "File binary content", content_type = "application/octet-stream", body = Vec<u8>),
        (status = 404, description = "File not found")
    ),
    params(
        ("file_name" = String, Path, description = "File name")
    ),
)]
pub async fn get_file(Path(file_name): Path<String>, State(state): State<AppState>) -> Response {
    let cancel = state.request_token();
    let _guard = cancel.clone().drop_guard();

    let mut content = Vec::new();
    if state.repository.fetch(&file_name, &mut content, &cancel).await {
        FileReply::new(content, file_name).into_response()
    } else {
        StatusCode::NOT_FOUND.into_response()
    }
}

/// Deletes file by name
#[utoipa::path(
    delete,
    path = "/api/file/id/{file_name}",
    tag = "files",
    responses(
        (status = 200, description = "Whether a file was deleted", body = bool),
    ),
    params(
        ("file_name" = String, Path, description = "File name")
    ),
)]
pub async fn delete_file(
    Path(file_name): Path<String>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let cancel = state.request_token();
    let _guard = cancel.clone().drop_guard();

    Json(state.repository.delete(&file_name, &cancel).await)
}

pub async fn openapi() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}
