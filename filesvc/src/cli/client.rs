use client::{DownloadParams, UploadParams};

pub async fn upload(params: UploadParams) {
    client::upload_file(params).await;
}

pub async fn list(uri: &str) {
    client::list_files(uri).await;
}

pub async fn download(params: DownloadParams) {
    client::download_file(params).await;
}

pub async fn delete(uri: &str, name: &str) {
    client::delete_file(uri, name).await;
}
