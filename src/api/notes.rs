//! Note endpoints.

use notevault_models::{
    CreateNoteRequest, MessageResponse, Note, NoteListResponse, NoteResponse, UpdateNoteRequest,
};

use super::ApiClient;
use crate::error::Result;

impl ApiClient {
    pub async fn list_notes(&self) -> Result<Vec<Note>> {
        let response: NoteListResponse = self.get("/notes").await?;
        Ok(response.notes)
    }

    pub async fn create_note(&self, content: &str, folder_id: Option<i64>) -> Result<Note> {
        let response: NoteResponse = self
            .post(
                "/notes",
                &CreateNoteRequest {
                    note: content,
                    folder_id,
                },
            )
            .await?;
        Ok(response.note)
    }

    /// Replace a note's content; `folder_id` is where the note lives
    /// afterwards.
    pub async fn update_note(&self, id: i64, content: &str, folder_id: Option<i64>) -> Result<Note> {
        let response: NoteResponse = self
            .put(
                &format!("/notes/{}", id),
                &UpdateNoteRequest {
                    note: content,
                    folder_id,
                },
            )
            .await?;
        Ok(response.note)
    }

    pub async fn delete_note(&self, id: i64) -> Result<MessageResponse> {
        self.delete(&format!("/notes/{}", id)).await
    }
}
