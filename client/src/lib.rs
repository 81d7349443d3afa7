use std::path::{Path, PathBuf};

use comfy_table::{presets::UTF8_HORIZONTAL_ONLY, Attribute, Cell, ContentArrangement, Table};
use kernel::FileName;
use reqwest::{multipart, Client, StatusCode};
use resource::Resource;
use tokio::fs::File;
use tokio_util::io::ReaderStream;

pub mod resource;

pub struct UploadParams {
    pub uri: String,
    pub file: String,
}

pub struct DownloadParams {
    pub uri: String,
    pub name: String,
    /// Target path. The last segment of the file name when absent.
    pub output: Option<String>,
}

fn resource(uri: &str) -> Option<Resource> {
    let r = Resource::new(uri);
    if r.is_none() {
        println!("invalid URI: {uri}");
    }
    r
}

fn file_name(name: &str) -> Option<FileName> {
    match FileName::new(name) {
        Ok(n) => Some(n),
        Err(e) => {
            println!("{e}");
            None
        }
    }
}

pub async fn upload_file(params: UploadParams) {
    let Some(resource) = resource(&params.uri) else {
        return;
    };
    let path = PathBuf::from(&params.file);
    let Some(name) = path
        .file_name()
        .and_then(|n| n.to_str())
        .and_then(file_name)
    else {
        println!("cannot take file name from {}", params.file);
        return;
    };

    let f = match File::open(&path).await {
        Ok(f) => f,
        Err(e) => {
            println!("no such file {}: {e}", params.file);
            return;
        }
    };
    let len = match f.metadata().await {
        Ok(meta) => meta.len(),
        Err(e) => {
            println!("cannot read {}: {e}", params.file);
            return;
        }
    };
    let stream = reqwest::Body::wrap_stream(ReaderStream::new(f));
    let part = multipart::Part::stream_with_length(stream, len).file_name(String::from(name));
    let form = multipart::Form::new().part("data", part);

    let client = Client::new();
    match client.post(resource.files()).multipart(form).send().await {
        Ok(x) => {
            let outcome = match x.status() {
                StatusCode::CREATED => "created",
                StatusCode::OK => "replaced",
                _ => "rejected",
            };
            println!("file {} {outcome}. Status: {}", params.file, x.status());
        }
        Err(e) => {
            println!("upload error: {e}");
        }
    }
}

pub async fn list_files(uri: &str) {
    let Some(resource) = resource(uri) else {
        return;
    };

    let client = Client::new();
    let response = match client.get(resource.files()).send().await {
        Ok(r) => r,
        Err(e) => {
            println!("error: {e}");
            return;
        }
    };
    if response.status() == StatusCode::NO_CONTENT {
        println!("no files");
        return;
    }

    match response.json::<Vec<FileName>>().await {
        Ok(names) => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_HORIZONTAL_ONLY)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_width(120)
                .set_header(vec![Cell::new("File").add_attribute(Attribute::Bold)]);

            for name in names {
                table.add_row(vec![Cell::new(name)]);
            }
            println!("{table}");
        }
        Err(e) => println!("JSON decode error: {e}"),
    }
}

pub async fn download_file(params: DownloadParams) {
    let Some(resource) = resource(&params.uri) else {
        return;
    };
    let Some(name) = file_name(&params.name) else {
        return;
    };
    let output = params.output.map_or_else(
        || {
            Path::new(name.as_str())
                .file_name()
                .map_or_else(|| PathBuf::from(name.as_str()), PathBuf::from)
        },
        PathBuf::from,
    );

    let client = Client::new();
    let response = match client.get(resource.file(&name)).send().await {
        Ok(r) => r,
        Err(e) => {
            println!("error: {e}");
            return;
        }
    };
    if response.status() == StatusCode::NOT_FOUND {
        println!("file {name} not found");
        return;
    }
    match response.bytes().await {
        Ok(content) => match tokio::fs::write(&output, &content).await {
            Ok(()) => println!(
                "file {name} saved to {} ({} bytes)",
                output.display(),
                content.len()
            ),
            Err(e) => println!("cannot write {}: {e}", output.display()),
        },
        Err(e) => println!("download error: {e}"),
    }
}

pub async fn delete_file(uri: &str, name: &str) {
    let Some(resource) = resource(uri) else {
        return;
    };
    let Some(name) = file_name(name) else {
        return;
    };

    let client = Client::new();
    match client.delete(resource.file(&name)).send().await {
        Ok(response) => match response.json::<bool>().await {
            Ok(true) => println!("file {name} deleted"),
            Ok(false) => println!("file {name} not deleted"),
            Err(e) => println!("JSON decode error: {e}"),
        },
        Err(e) => println!("error: {e}"),
    }
}
