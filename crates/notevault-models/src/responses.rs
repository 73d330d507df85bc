//! Response envelopes used by the workspace service.

use serde::{Deserialize, Serialize};

use crate::nullable::vec_or_null;
use crate::{FileInfo, Folder, Note};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Error body returned with non-success statuses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderResponse {
    pub folder: Folder,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderListResponse {
    #[serde(default, deserialize_with = "vec_or_null")]
    pub folders: Vec<Folder>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderCreatedResponse {
    #[serde(default)]
    pub message: String,
    pub folder: Folder,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteListResponse {
    #[serde(default, deserialize_with = "vec_or_null")]
    pub notes: Vec<Note>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteResponse {
    #[serde(default)]
    pub message: String,
    pub note: Note,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileListResponse {
    #[serde(default, deserialize_with = "vec_or_null")]
    pub files: Vec<FileInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileUploadedResponse {
    #[serde(default)]
    pub message: String,
    pub file: FileInfo,
}
