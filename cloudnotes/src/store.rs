mod errors;

use std::sync::Arc;
use async_trait::async_trait;
use data::{NewNote, Note, NoteId, NotePatch};
pub use errors::StoreError;

/// The remote notes table.
///
/// Ids, timestamps and owners are assigned on the remote side; the client
/// only ever sends titles and contents.
#[async_trait]
pub trait NoteStore: Send + Sync + 'static {
    /// All notes visible to the current user, newest first.
    async fn select_all(&self) -> Result<Vec<Note>, StoreError>;

    async fn insert(&self, note: NewNote) -> Result<(), StoreError>;

    async fn update(
        &self,
        id: &NoteId,
        patch: NotePatch,
    ) -> Result<(), StoreError>;

    async fn delete(&self, id: &NoteId) -> Result<(), StoreError>;
}

#[async_trait]
impl<T: NoteStore + ?Sized> NoteStore for Arc<T> {
    async fn select_all(&self) -> Result<Vec<Note>, StoreError> {
        (**self).select_all().await
    }

    async fn insert(&self, note: NewNote) -> Result<(), StoreError> {
        (**self).insert(note).await
    }

    async fn update(
        &self,
        id: &NoteId,
        patch: NotePatch,
    ) -> Result<(), StoreError> {
        (**self).update(id, patch).await
    }

    async fn delete(&self, id: &NoteId) -> Result<(), StoreError> {
        (**self).delete(id).await
    }
}
