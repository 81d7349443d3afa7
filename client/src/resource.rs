extern crate url;

use self::url::Url;
use core::fmt;
use kernel::{FileName, FILE_API_PATH, FILE_ID_SEGMENT};

const SEP: char = '/';

/// Service base address and the file endpoints below it.
#[derive(Clone)]
pub struct Resource {
    url: Url,
}

impl Resource {
    #[must_use]
    pub fn new(uri: &str) -> Option<Resource> {
        let base = Url::parse(uri).ok()?;
        if base.cannot_be_a_base() {
            return None;
        }
        Some(Resource { url: base })
    }

    /// `{base}/api/file`
    #[must_use]
    pub fn files(&self) -> Url {
        self.with_segments(FILE_API_PATH.split(SEP))
    }

    /// `{base}/api/file/id/{name}` with the name encoded as a single segment.
    #[must_use]
    pub fn file(&self, name: &FileName) -> Url {
        self.with_segments(
            FILE_API_PATH
                .split(SEP)
                .chain([FILE_ID_SEGMENT, name.as_str()]),
        )
    }

    fn with_segments<'a>(&self, segments: impl Iterator<Item = &'a str>) -> Url {
        let mut url = self.url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn new_correct_some() {
        // Act
        let r = Resource::new("http://localhost");

        // Assert
        assert!(r.is_some());
    }

    #[rstest]
    #[case("http/localhost")]
    #[case("mailto:someone@localhost")]
    #[trace]
    fn new_incorrect_none(#[case] uri: &str) {
        // Act
        let r = Resource::new(uri);

        // Assert
        assert!(r.is_none());
    }

    #[rstest]
    #[case("http://localhost", "http://localhost/api/file")]
    #[case("http://localhost/", "http://localhost/api/file")]
    #[case("http://localhost:5000", "http://localhost:5000/api/file")]
    #[case("http://localhost/x", "http://localhost/x/api/file")]
    #[case("http://localhost/x/", "http://localhost/x/api/file")]
    #[trace]
    fn files_tests(#[case] base: &str, #[case] expected: &str) {
        // Arrange
        let r = Resource::new(base).unwrap();

        // Act
        let url = r.files();

        // Assert
        assert_eq!(url.as_str(), expected);
    }

    #[rstest]
    #[case("http://localhost", "a.txt", "http://localhost/api/file/id/a.txt")]
    #[case("http://localhost/", "dir/a.txt", "http://localhost/api/file/id/dir%2Fa.txt")]
    #[case("http://localhost/x", "a b", "http://localhost/x/api/file/id/a%20b")]
    #[case("http://localhost", "q?#", "http://localhost/api/file/id/q%3F%23")]
    #[trace]
    fn file_tests(#[case] base: &str, #[case] name: &str, #[case] expected: &str) {
        // Arrange
        let r = Resource::new(base).unwrap();
        let name = FileName::new(name).unwrap();

        // Act
        let url = r.file(&name);

        // Assert
        assert_eq!(url.as_str(), expected);
    }
}
