#![warn(clippy::unwrap_in_result)]
#![warn(clippy::unwrap_used)]

use std::fmt::{self, Display};

use serde::Deserialize;
use thiserror::Error;

/// Path of the files resource relative to the service root.
pub const FILE_API_PATH: &str = "api/file";

/// Path segment that precedes a file name in single file routes.
pub const FILE_ID_SEGMENT: &str = "id";

/// Raised when a file name cannot be used as a blob name.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("file name must not be empty or whitespace only")]
pub struct InvalidFileName;

/// Name of a file stored in the container.
///
/// The name is both the blob key and the name shown to clients.
/// It is never empty and never consists of whitespace only, which also holds
/// for names read from a file listing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(try_from = "String")]
pub struct FileName(String);

impl FileName {
    /// Validates and wraps a file name.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidFileName`] when `name` is empty or whitespace only.
    pub fn new(name: impl Into<String>) -> Result<Self, InvalidFileName> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(InvalidFileName);
        }
        Ok(Self(name))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for FileName {
    type Error = InvalidFileName;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for FileName {
    type Error = InvalidFileName;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<FileName> for String {
    fn from(value: FileName) -> Self {
        value.0
    }
}

impl AsRef<str> for FileName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for FileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("")]
    #[case(" ")]
    #[case("   ")]
    #[case("\t\n")]
    #[trace]
    fn new_blank_name_rejected(#[case] name: &str) {
        // Act
        let result = FileName::new(name);

        // Assert
        assert_eq!(result, Err(InvalidFileName));
    }

    #[rstest]
    #[case("a.txt")]
    #[case(" padded ")]
    #[case("dir/file.bin")]
    #[trace]
    fn new_name_kept_verbatim(#[case] name: &str) {
        // Act
        let result = FileName::new(name).unwrap();

        // Assert
        assert_eq!(result.as_str(), name);
    }

    #[test]
    fn deserialize_rejects_blank_name() {
        // Act
        let result: Result<FileName, _> = serde_json::from_str(r#""  ""#);

        // Assert
        assert!(result.is_err());
    }

    #[test]
    fn deserialize_listing() {
        // Act
        let names: Vec<FileName> = serde_json::from_str(r#"["file1","dir/file2"]"#).unwrap();

        // Assert
        let names: Vec<&str> = names.iter().map(FileName::as_str).collect();
        assert_eq!(names, vec!["file1", "dir/file2"]);
    }
}
