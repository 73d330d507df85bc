//! Workspace model.
//!
//! Tracks where the user is in the folder hierarchy and what that
//! location contains. Every mutation is followed by a re-fetch of the
//! current location instead of a local patch, so the visible contents
//! always equal the last successful fetch.
//!
//! A failed operation records a transient error message and leaves the
//! previous view, current folder and breadcrumb trail untouched.

use std::future::Future;

use notevault_models::{
    timeline, BreadcrumbTrail, FileInfo, Folder, FolderTree, Location, Note, TimelineItem,
};
use tracing::{debug, info, warn};

use crate::api::{ApiClient, DownloadedFile, UploadFile};
use crate::error::{Error, Result};

/// Input events from the UI. Each maps onto one workspace operation.
#[derive(Debug, Clone)]
pub enum WorkspaceEvent {
    /// Initial load of the root.
    Open,
    NavigateInto { folder_id: i64, name: String },
    Breadcrumb(usize),
    Back,
    Refresh,
    CreateFolder(String),
    DeleteFolder(i64),
    CreateNote(String),
    UpdateNote { note_id: i64, content: String },
    DeleteNote(i64),
    UploadFile(UploadFile),
    DeleteFile(i64),
}

impl WorkspaceEvent {
    pub fn name(&self) -> &'static str {
        match self {
            WorkspaceEvent::Open => "open",
            WorkspaceEvent::NavigateInto { .. } => "navigate_into",
            WorkspaceEvent::Breadcrumb(_) => "breadcrumb",
            WorkspaceEvent::Back => "back",
            WorkspaceEvent::Refresh => "refresh",
            WorkspaceEvent::CreateFolder(_) => "create_folder",
            WorkspaceEvent::DeleteFolder(_) => "delete_folder",
            WorkspaceEvent::CreateNote(_) => "create_note",
            WorkspaceEvent::UpdateNote { .. } => "update_note",
            WorkspaceEvent::DeleteNote(_) => "delete_note",
            WorkspaceEvent::UploadFile(_) => "upload_file",
            WorkspaceEvent::DeleteFile(_) => "delete_file",
        }
    }
}

pub struct Workspace {
    client: ApiClient,
    /// Last fetched root contents.
    root_view: Option<FolderTree>,
    /// Set while inside a folder; `None` at the root.
    current_folder: Option<Folder>,
    trail: BreadcrumbTrail,
    error: Option<String>,
}

impl Workspace {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            root_view: None,
            current_folder: None,
            trail: BreadcrumbTrail::new(),
            error: None,
        }
    }

    // ------------------------------------------------------------------
    // View state
    // ------------------------------------------------------------------

    pub fn location(&self) -> Location {
        self.current_folder
            .as_ref()
            .map_or(Location::Root, |folder| Location::Folder(folder.id))
    }

    pub fn current_folder(&self) -> Option<&Folder> {
        self.current_folder.as_ref()
    }

    pub fn breadcrumbs(&self) -> &BreadcrumbTrail {
        &self.trail
    }

    /// Contents of the current location, `None` before the first
    /// successful load.
    pub fn view(&self) -> Option<&FolderTree> {
        match &self.current_folder {
            Some(folder) => Some(&folder.children),
            None => self.root_view.as_ref(),
        }
    }

    pub fn folders(&self) -> &[Folder] {
        self.view().map(|view| view.folders.as_slice()).unwrap_or(&[])
    }

    pub fn notes(&self) -> &[Note] {
        self.view().map(|view| view.notes.as_slice()).unwrap_or(&[])
    }

    pub fn files(&self) -> &[FileInfo] {
        self.view().map(|view| view.files.as_slice()).unwrap_or(&[])
    }

    /// Notes and files of the current location, oldest first.
    pub fn timeline(&self) -> Vec<TimelineItem<'_>> {
        self.view().map(timeline).unwrap_or_default()
    }

    /// Message of the last failed operation, if not yet dismissed.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn take_error(&mut self) -> Option<String> {
        self.error.take()
    }

    // ------------------------------------------------------------------
    // Events
    // ------------------------------------------------------------------

    /// Apply one UI event.
    pub async fn handle(&mut self, event: WorkspaceEvent) -> Result<()> {
        debug!(event = event.name(), "Workspace event");

        match event {
            WorkspaceEvent::Open => self.load_root().await,
            WorkspaceEvent::NavigateInto { folder_id, name } => {
                self.navigate_into(folder_id, name).await
            }
            WorkspaceEvent::Breadcrumb(index) => self.navigate_to_breadcrumb(index).await,
            WorkspaceEvent::Back => self.go_back().await,
            WorkspaceEvent::Refresh => self.refresh().await,
            WorkspaceEvent::CreateFolder(name) => self.create_folder(&name).await.map(drop),
            WorkspaceEvent::DeleteFolder(id) => self.delete_folder(id).await,
            WorkspaceEvent::CreateNote(content) => self.create_note(&content).await.map(drop),
            WorkspaceEvent::UpdateNote { note_id, content } => {
                self.update_note(note_id, &content).await.map(drop)
            }
            WorkspaceEvent::DeleteNote(id) => self.delete_note(id).await,
            WorkspaceEvent::UploadFile(file) => self.upload_file(file).await.map(drop),
            WorkspaceEvent::DeleteFile(id) => self.delete_file(id).await,
        }
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    /// Open the root: fetch its contents, make it current and reset the
    /// breadcrumbs to Home.
    pub async fn load_root(&mut self) -> Result<()> {
        self.fetch_root().await?;
        self.trail.reset();
        Ok(())
    }

    async fn fetch_root(&mut self) -> Result<()> {
        let client = self.client.clone();
        let tree = self.track(client.folder_tree().await)?;

        self.root_view = Some(tree);
        self.current_folder = None;
        self.error = None;
        Ok(())
    }

    async fn fetch_folder(&mut self, id: i64) -> Result<()> {
        let client = self.client.clone();
        let folder = self.track(client.folder(id).await)?;

        self.current_folder = Some(folder);
        self.error = None;
        Ok(())
    }

    /// Descend into a child folder of the current location.
    pub async fn navigate_into(&mut self, folder_id: i64, name: impl Into<String>) -> Result<()> {
        self.fetch_folder(folder_id).await?;
        self.trail.push(folder_id, name);
        info!(folder_id, depth = self.trail.len(), "Entered folder");
        Ok(())
    }

    /// Jump back to breadcrumb `index`. Afterwards the trail holds
    /// `index + 1` elements and the view shows the location they end in.
    pub async fn navigate_to_breadcrumb(&mut self, index: usize) -> Result<()> {
        let target = self.trail.get(index).map(|crumb| crumb.location);
        let Some(target) = target else {
            let err = Error::InvalidInput(format!(
                "Breadcrumb {} out of range (trail has {})",
                index,
                self.trail.len()
            ));
            return self.track(Err(err));
        };

        self.load(target).await?;
        self.trail.truncate(index);
        debug!(index, location = %target, "Navigated to breadcrumb");
        Ok(())
    }

    /// Go up one breadcrumb. No-op at the root.
    pub async fn go_back(&mut self) -> Result<()> {
        match self.trail.parent_index() {
            Some(index) => self.navigate_to_breadcrumb(index).await,
            None => Ok(()),
        }
    }

    /// Re-fetch the current location.
    pub async fn refresh(&mut self) -> Result<()> {
        self.load(self.location()).await
    }

    /// Fetch `location` without touching the breadcrumbs.
    async fn load(&mut self, location: Location) -> Result<()> {
        match location {
            Location::Root => self.fetch_root().await,
            Location::Folder(id) => self.fetch_folder(id).await,
        }
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    /// Create a folder in the current location.
    pub async fn create_folder(&mut self, name: &str) -> Result<Folder> {
        require_text(name, "Folder name").or_else(|e| self.track(Err(e)))?;

        let client = self.client.clone();
        let parent_id = self.location().folder_id();
        let folder = self
            .apply(client.create_folder(name, parent_id))
            .await?;
        info!(folder_id = folder.id, parent_id = ?parent_id, "Created folder");
        Ok(folder)
    }

    /// Delete a folder and its contents.
    pub async fn delete_folder(&mut self, id: i64) -> Result<()> {
        let client = self.client.clone();
        self.apply(client.delete_folder(id)).await?;
        info!(folder_id = id, "Deleted folder");
        Ok(())
    }

    /// Add a note to the current location.
    pub async fn create_note(&mut self, content: &str) -> Result<Note> {
        require_text(content, "Note").or_else(|e| self.track(Err(e)))?;

        let client = self.client.clone();
        let folder_id = self.location().folder_id();
        let note = self.apply(client.create_note(content, folder_id)).await?;
        info!(note_id = note.id, folder_id = ?folder_id, "Created note");
        Ok(note)
    }

    /// Replace a note's content. The note stays in the current location.
    pub async fn update_note(&mut self, id: i64, content: &str) -> Result<Note> {
        require_text(content, "Note").or_else(|e| self.track(Err(e)))?;

        let client = self.client.clone();
        let folder_id = self.location().folder_id();
        let note = self
            .apply(client.update_note(id, content, folder_id))
            .await?;
        info!(note_id = id, "Updated note");
        Ok(note)
    }

    pub async fn delete_note(&mut self, id: i64) -> Result<()> {
        let client = self.client.clone();
        self.apply(client.delete_note(id)).await?;
        info!(note_id = id, "Deleted note");
        Ok(())
    }

    /// Upload a file into the current location.
    pub async fn upload_file(&mut self, file: UploadFile) -> Result<FileInfo> {
        let client = self.client.clone();
        let folder_id = self.location().folder_id();
        let uploaded = self.apply(client.upload_file(file, folder_id)).await?;
        info!(file_id = uploaded.id, size = uploaded.size_bytes, "Uploaded file");
        Ok(uploaded)
    }

    pub async fn delete_file(&mut self, id: i64) -> Result<()> {
        let client = self.client.clone();
        self.apply(client.delete_file(id)).await?;
        info!(file_id = id, "Deleted file");
        Ok(())
    }

    /// Download a file listed in the current location. The view is not
    /// re-fetched.
    pub async fn download_file(&mut self, id: i64) -> Result<DownloadedFile> {
        let file = self.files().iter().find(|f| f.id == id).cloned();
        let Some(file) = file else {
            return self.track(Err(Error::InvalidInput(format!(
                "File {} is not in the current location",
                id
            ))));
        };

        let client = self.client.clone();
        let result = client.download_file(&file).await;
        self.track(result)
    }

    /// Run a mutation and, if it succeeds, re-fetch the current location.
    async fn apply<T>(&mut self, mutation: impl Future<Output = Result<T>>) -> Result<T> {
        let value = self.track(mutation.await)?;
        self.refresh().await?;
        Ok(value)
    }

    /// Record a failure as the visible error and pass the result through.
    fn track<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            warn!(error = %e, location = %self.location(), "Workspace operation failed");
            self.error = Some(e.to_string());
        }
        result
    }
}

fn require_text(value: &str, what: &str) -> Result<()> {
    if value.trim().is_empty() {
        Err(Error::InvalidInput(format!("{} cannot be empty", what)))
    } else {
        Ok(())
    }
}

impl std::fmt::Debug for Workspace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workspace")
            .field("location", &self.location())
            .field("breadcrumbs", &self.trail.len())
            .field("error", &self.error)
            .finish()
    }
}
