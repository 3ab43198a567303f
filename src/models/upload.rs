use std::path::Path;

use serde::Serialize;

use super::enums::UploadStatus;

/// A file the user picked, before validation.
///
/// `mime_type` is the declared content type, not sniffed from the bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Read a file from disk, declaring its content type from the extension.
    pub async fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        let mime_type = mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        Ok(Self {
            name,
            mime_type,
            bytes,
        })
    }

    pub fn size_bytes(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Serializable view of the staged artifact (no payload).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactInfo {
    pub name: String,
    pub mime_type: String,
    pub size_bytes: u64,
}

impl From<&SelectedFile> for ArtifactInfo {
    fn from(file: &SelectedFile) -> Self {
        Self {
            name: file.name.clone(),
            mime_type: file.mime_type.clone(),
            size_bytes: file.size_bytes(),
        }
    }
}

/// Transient upload state owned by the workflow.
#[derive(Debug, Clone)]
pub struct UploadAttempt {
    pub file: SelectedFile,
    /// Data URL of the file, filled in asynchronously after validation.
    pub preview: Option<String>,
    pub status: UploadStatus,
}

impl UploadAttempt {
    pub fn validated(file: SelectedFile) -> Self {
        Self {
            file,
            preview: None,
            status: UploadStatus::Validated,
        }
    }
}
