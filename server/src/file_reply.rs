use axum::{
    body::Body,
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
};

/// Downloaded file content sent as an attachment.
pub struct FileReply {
    data: Vec<u8>,
    name: String,
}

impl FileReply {
    #[must_use]
    pub fn new(data: Vec<u8>, name: String) -> Self {
        Self { data, name }
    }

    fn name_from_path(&self) -> &str {
        let path = &self.name;
        if let Some(ix) = path.rfind(&['\\', '/']) {
            &path[ix + 1..]
        } else {
            path
        }
    }
}

/// Builds an attachment `content-disposition` value (RFC 6266).
///
/// `filename` is a quoted ASCII fallback. Names that cannot be carried there verbatim
/// also get a percent-encoded UTF-8 `filename*`.
fn content_disposition(name: &str) -> String {
    let mut fallback = String::with_capacity(name.len());
    let mut verbatim = true;
    for c in name.chars() {
        match c {
            '"' | '\\' => {
                fallback.push('\\');
                fallback.push(c);
            }
            ' ' | '!'..='~' => fallback.push(c),
            _ => {
                verbatim = false;
                fallback.push('_');
            }
        }
    }

    if verbatim {
        format!(r#"attachment; filename="{fallback}""#)
    } else {
        format!(
            r#"attachment; filename="{fallback}"; filename*=UTF-8''{}"#,
            urlencoding::encode(name)
        )
    }
}

impl IntoResponse for FileReply {
    fn into_response(self) -> Response {
        let attachment = content_disposition(self.name_from_path());
        let len = self.data.len().to_string();
        let mut res = Body::from(self.data).into_response();
        let headers = res.headers_mut();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/octet-stream"),
        );
        if let Ok(val) = HeaderValue::from_str(attachment.as_str()) {
            headers.insert(header::CONTENT_DISPOSITION, val);
        }
        if let Ok(val) = HeaderValue::from_str(len.as_str()) {
            headers.insert(header::CONTENT_LENGTH, val);
        }

        res
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use rstest::rstest;

    #[rstest]
    #[case("", "")]
    #[case("file.ext", "file.ext")]
    #[case("dir/file.ext", "file.ext")]
    #[case("dir\\file.ext", "file.ext")]
    #[case("dir1/dir2/file.ext", "file.ext")]
    #[trace]
    fn name_from_path(#[case] path: &str, #[case] expected: &str) {
        // Arrange
        let reply = FileReply::new(Vec::new(), path.to_owned());

        // Act
        let name = reply.name_from_path();

        // Assert
        assert_eq!(name, expected);
    }

    #[rstest]
    #[case("file1", r#"attachment; filename="file1""#)]
    #[case("a b.txt", r#"attachment; filename="a b.txt""#)]
    #[case(r#"a"b.txt"#, r#"attachment; filename="a\"b.txt""#)]
    #[case(r"a\b.txt", r#"attachment; filename="a\\b.txt""#)]
    #[case(
        "résumé.pdf",
        r#"attachment; filename="r_sum_.pdf"; filename*=UTF-8''r%C3%A9sum%C3%A9.pdf"#
    )]
    #[case(
        "a\nb.txt",
        r#"attachment; filename="a_b.txt"; filename*=UTF-8''a%0Ab.txt"#
    )]
    #[trace]
    fn content_disposition_tests(#[case] name: &str, #[case] expected: &str) {
        // Act
        let actual = content_disposition(name);

        // Assert
        assert_eq!(actual, expected);
    }

    #[rstest]
    #[case(r#"dir/a"b.txt"#)]
    #[case("résumé.pdf")]
    #[case("a\nb.txt")]
    #[trace]
    fn into_response_always_sets_disposition(#[case] name: &str) {
        // Arrange
        let reply = FileReply::new(b"abcd".to_vec(), name.to_owned());

        // Act
        let res = reply.into_response();

        // Assert
        let disposition = res.headers()[header::CONTENT_DISPOSITION].to_str().unwrap();
        assert!(disposition.starts_with("attachment; filename=\""));
    }

    #[test]
    fn into_response_sets_attachment_headers() {
        // Arrange
        let reply = FileReply::new(b"abcd".to_vec(), "docs/file1".to_owned());

        // Act
        let res = reply.into_response();

        // Assert
        assert_eq!(res.status(), StatusCode::OK);
        let headers = res.headers();
        assert_eq!(headers[header::CONTENT_TYPE], "application/octet-stream");
        assert_eq!(
            headers[header::CONTENT_DISPOSITION],
            r#"attachment; filename="file1""#
        );
        assert_eq!(headers[header::CONTENT_LENGTH], "4");
    }
}
