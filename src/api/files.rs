//! File endpoints: listing, multipart upload, binary download.

use std::path::{Path, PathBuf};

use notevault_models::{FileInfo, FileListResponse, FileUploadedResponse, MessageResponse};
use reqwest::Method;
use tracing::info;

use super::{ApiClient, Auth, MultipartPart, RequestBody};
use crate::error::{Error, Result};

const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// A file to upload.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Read a file from disk, naming it after the last path component and
    /// guessing its MIME type from the extension.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| Error::InvalidInput(format!("No file name in {}", path.display())))?
            .to_string();

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| Error::InvalidInput(format!("Cannot read {}: {}", path.display(), e)))?;

        let mime_type = mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();

        Ok(Self {
            file_name,
            mime_type,
            bytes,
        })
    }

    fn into_parts(self, folder_id: Option<i64>) -> Vec<MultipartPart> {
        let mut parts = vec![MultipartPart::file(
            "file",
            self.file_name,
            self.mime_type,
            self.bytes,
        )];
        if let Some(folder_id) = folder_id {
            parts.push(MultipartPart::text("folder_id", folder_id.to_string()));
        }
        parts
    }
}

/// A downloaded file.
#[derive(Debug, Clone)]
pub struct DownloadedFile {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl DownloadedFile {
    /// Write the file into `dir` under its own name and return the path.
    /// Only the final component of the name is used.
    pub async fn save_to(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        let name = Path::new(&self.name)
            .file_name()
            .ok_or_else(|| Error::InvalidInput(format!("Unusable file name '{}'", self.name)))?;
        let path = dir.as_ref().join(name);

        tokio::fs::write(&path, &self.bytes)
            .await
            .map_err(|e| Error::Storage(format!("Failed to write {}: {}", path.display(), e)))?;

        info!(path = %path.display(), bytes = self.bytes.len(), "Saved download");
        Ok(path)
    }
}

impl ApiClient {
    pub async fn list_files(&self) -> Result<Vec<FileInfo>> {
        let response: FileListResponse = self.get("/files").await?;
        Ok(response.files)
    }

    /// Upload into `folder_id`, or the root when `None`.
    pub async fn upload_file(&self, file: UploadFile, folder_id: Option<i64>) -> Result<FileInfo> {
        let response: FileUploadedResponse = self
            .send(
                Method::POST,
                "/files",
                RequestBody::Multipart(file.into_parts(folder_id)),
                Auth::Required,
            )
            .await?;
        Ok(response.file)
    }

    /// Fetch the bytes of `file`.
    pub async fn download_file(&self, file: &FileInfo) -> Result<DownloadedFile> {
        let body = self.download(&format!("/files/{}", file.id)).await?;

        let mime_type = body
            .content_type
            .or_else(|| Some(file.mime_type.clone()).filter(|m| !m.is_empty()))
            .unwrap_or_else(|| DEFAULT_MIME_TYPE.to_string());

        Ok(DownloadedFile {
            name: file.name.clone(),
            mime_type,
            bytes: body.bytes,
        })
    }

    pub async fn delete_file(&self, id: i64) -> Result<MessageResponse> {
        self.delete(&format!("/files/{}", id)).await
    }
}
