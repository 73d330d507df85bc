//! Folder, note and file models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::nullable::vec_or_null;

/// The contents of one location: child folders, notes and files.
///
/// Returned as-is by `/folders/tree` for the root, and embedded in a
/// [`Folder`] when that folder is fetched individually. Empty lists may
/// arrive as `null` or be left out.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FolderTree {
    #[serde(
        default,
        deserialize_with = "vec_or_null",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub folders: Vec<Folder>,
    #[serde(
        default,
        deserialize_with = "vec_or_null",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub notes: Vec<Note>,
    #[serde(
        default,
        deserialize_with = "vec_or_null",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub files: Vec<FileInfo>,
}

impl FolderTree {
    pub fn is_empty(&self) -> bool {
        self.folders.is_empty() && self.notes.is_empty() && self.files.is_empty()
    }
}

/// A folder. `parent_id = None` means the folder lives at the root.
///
/// `children` is only populated when the folder was fetched on its own
/// (it is the current location); folders listed as children of another
/// location come back without their own contents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Folder {
    pub id: i64,
    pub name: String,
    pub parent_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub children: FolderTree,
}

/// A text note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: i64,
    #[serde(rename = "note")]
    pub content: String,
    pub folder_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// Metadata of an uploaded file. The bytes are fetched separately.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileInfo {
    pub id: i64,
    pub name: String,
    #[serde(rename = "size")]
    pub size_bytes: i64,
    pub mime_type: String,
    pub folder_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateFolderRequest<'a> {
    pub name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateNoteRequest<'a> {
    pub note: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<i64>,
}

/// Note update body. `folder_id` is always sent; `null` moves the note
/// to the root.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateNoteRequest<'a> {
    pub note: &'a str,
    pub folder_id: Option<i64>,
}
