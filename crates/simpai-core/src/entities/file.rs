use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::CoreError;
use crate::file_type;

/// Serializable stand-in for an uploaded file: name, MIME type and size.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub mime_type: String,
    pub size: u64,
}

impl FileDescriptor {
    #[must_use]
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            size,
        }
    }

    /// Describe a file on disk, inferring its MIME type from the extension.
    ///
    /// Unknown extensions get `application/octet-stream`, which no artifact
    /// kind accepts.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Validation` if the path has no file name.
    pub fn from_path(path: &Path, size: u64) -> Result<Self, CoreError> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| CoreError::Validation(format!("invalid file path: {}", path.display())))?;
        let mime = file_type::infer_mime(path).unwrap_or("application/octet-stream");
        Ok(Self::new(name, mime, size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_mime_as_type() {
        let file = FileDescriptor::new("a.csv", "text/csv", 12);
        let json = serde_json::to_value(&file).unwrap();
        assert_eq!(json["type"], "text/csv");
        assert_eq!(json["size"], 12);
    }

    #[test]
    fn from_path_uses_file_name() {
        let file = FileDescriptor::from_path(Path::new("/tmp/q3/revenue.xlsx"), 2048).unwrap();
        assert_eq!(file.name, "revenue.xlsx");
        assert_eq!(file.mime_type, file_type::MIME_XLSX);
    }

    #[test]
    fn from_path_unknown_extension_is_octet_stream() {
        let file = FileDescriptor::from_path(Path::new("image.png"), 1).unwrap();
        assert_eq!(file.mime_type, "application/octet-stream");
    }
}
