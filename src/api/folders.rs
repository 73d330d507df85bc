//! Folder endpoints.

use notevault_models::{
    CreateFolderRequest, Folder, FolderCreatedResponse, FolderListResponse, FolderResponse,
    FolderTree, MessageResponse,
};

use super::ApiClient;
use crate::error::Result;

impl ApiClient {
    /// All folders of the user, flat.
    pub async fn list_folders(&self) -> Result<Vec<Folder>> {
        let response: FolderListResponse = self.get("/folders").await?;
        Ok(response.folders)
    }

    /// Contents of the root: root-level folders, notes and files.
    pub async fn folder_tree(&self) -> Result<FolderTree> {
        self.get("/folders/tree").await
    }

    /// One folder with its direct children.
    pub async fn folder(&self, id: i64) -> Result<Folder> {
        let response: FolderResponse = self.get(&format!("/folders/{}", id)).await?;
        Ok(response.folder)
    }

    pub async fn create_folder(&self, name: &str, parent_id: Option<i64>) -> Result<Folder> {
        let response: FolderCreatedResponse = self
            .post("/folders", &CreateFolderRequest { name, parent_id })
            .await?;
        Ok(response.folder)
    }

    /// Delete a folder and everything below it.
    pub async fn delete_folder(&self, id: i64) -> Result<MessageResponse> {
        self.delete(&format!("/folders/{}", id)).await
    }
}
