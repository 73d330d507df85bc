//! Bindings for the remote workspace service.
//!
//! `client` holds the authenticated request pipeline; the other modules
//! add typed endpoint methods to [`ApiClient`], grouped by resource:
//! - /folders - folder listing, tree, create, delete
//! - /notes - note CRUD
//! - /files - upload (multipart), download (binary), delete
//!
//! Auth endpoints are driven by the session manager.

mod client;
mod files;
mod folders;
mod notes;

pub use client::{ApiClient, Auth, BinaryResponse, MultipartPart, RequestBody, REFRESH_ENDPOINT};
pub use files::{DownloadedFile, UploadFile};
