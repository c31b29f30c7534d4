//! The notes screen state: the local note list, the create form, the search
//! box and the single edit buffer, plus the operations that move them.
//!
//! The local list is only ever replaced wholesale by a fetch. Writes don't
//! touch it; the change feed (or the next explicit [`NotesView::list`])
//! brings their effect in.

mod errors;

use std::sync::Arc;
use data::{NewNote, Note, NoteDraft, NoteEdit, NoteId};
use futures::{pin_mut, Stream};
use log::{debug, error, trace, warn};
use tokio::sync::{watch, RwLock};
use tokio_stream::StreamExt;
use crate::change_feed::{ChangeEvent, ChangeFeed, ChangeFeedError, ChangeSubscription};
use crate::notifications::{Notification, Notifier};
use crate::search::filter_notes;
use crate::store::{NoteStore, StoreError};
use crate::{NOTE_ADDED_MESSAGE, NOTE_DELETED_MESSAGE, NOTE_UPDATED_MESSAGE};

pub use errors::NotesViewError;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ListState {
    #[default]
    Loading,
    Loaded,
}

pub struct NotesView<S: NoteStore, N: Notifier> {
    inner: Arc<NotesViewInternal<S, N>>,
}

impl<S: NoteStore, N: Notifier> Clone for NotesView<S, N> {
    fn clone(&self) -> Self {
        NotesView {
            inner: self.inner.clone(),
        }
    }
}

struct NotesViewInternal<S: NoteStore, N: Notifier> {
    store: S,
    notifier: N,
    state: RwLock<State>,
    revision: watch::Sender<u64>,
}

#[derive(Default)]
struct State {
    notes: Vec<Note>,
    list_state: ListState,
    draft: NoteDraft,
    search_query: String,
    editing: Option<NoteEdit>,
}

impl<S: NoteStore, N: Notifier> NotesView<S, N> {
    pub fn new(store: S, notifier: N) -> Self {
        NotesView {
            inner: Arc::new(
                NotesViewInternal {
                    store,
                    notifier,
                    state: RwLock::new(State::default()),
                    revision: watch::channel(0).0,
                }
            ),
        }
    }

    /// Fetches the whole list and replaces the local one with it.
    pub async fn list(&self) -> Result<(), NotesViewError> {
        debug!("fetching notes");
        let result = self.inner.store.select_all().await;
        let mut state = self.inner.state.write().await;
        state.list_state = ListState::Loaded;
        let result = match result {
            Ok(notes) => {
                trace!("fetched {} notes", notes.len());
                state.notes = notes;
                Ok(())
            },
            Err(e) => {
                error!("failed to fetch notes: {e}");
                Err(e)
            },
        };
        drop(state);
        self.bump_revision();
        result.map_err(|e| self.report_error(e))
    }

    /// Inserts the draft as a new note. The draft is cleared on success, the
    /// local list is left alone.
    pub async fn create(&self) -> Result<(), NotesViewError> {
        let draft = self.inner.state.read().await.draft.clone();
        if draft.title.is_empty() {
            return Err(NotesViewError::MissingField("title"));
        }
        if draft.content.is_empty() {
            return Err(NotesViewError::MissingField("content"));
        }
        debug!("adding note \"{}\"", draft.title);
        self.inner.store
            .insert(
                NewNote {
                    title: draft.title,
                    content: draft.content,
                }
            )
            .await
            .map_err(|e| {
                error!("failed to add note: {e}");
                self.report_error(e)
            })?;
        self.inner.state.write().await.draft = NoteDraft::default();
        self.bump_revision();
        self.report_success(NOTE_ADDED_MESSAGE);
        Ok(())
    }

    /// Sends the title and content of `edit`. The edit buffer is closed only
    /// on success, so a failed save can be retried.
    pub async fn update(&self, edit: NoteEdit) -> Result<(), NotesViewError> {
        debug!("updating note {}", edit.id);
        self.inner.store
            .update(&edit.id, edit.patch())
            .await
            .map_err(|e| {
                error!("failed to update note {}: {e}", edit.id);
                self.report_error(e)
            })?;
        self.inner.state.write().await.editing = None;
        self.bump_revision();
        self.report_success(NOTE_UPDATED_MESSAGE);
        Ok(())
    }

    /// Runs [`NotesView::update`] on the current edit buffer.
    pub async fn save_edit(&self) -> Result<(), NotesViewError> {
        let edit = self.inner.state.read().await.editing.clone()
            .ok_or(NotesViewError::NotEditing)?;
        self.update(edit).await
    }

    pub async fn delete(&self, id: &NoteId) -> Result<(), NotesViewError> {
        debug!("deleting note {id}");
        self.inner.store
            .delete(id)
            .await
            .map_err(|e| {
                error!("failed to delete note {id}: {e}");
                self.report_error(e)
            })?;
        self.report_success(NOTE_DELETED_MESSAGE);
        Ok(())
    }

    /// Opens the edit buffer on `note`. Whatever was being edited before is
    /// dropped without asking.
    pub async fn start_editing(&self, note: &Note) {
        let mut state = self.inner.state.write().await;
        if let Some(previous) = state.editing.replace(NoteEdit::from(note)) {
            trace!("discarding unsaved edit of note {}", previous.id);
        }
        drop(state);
        self.bump_revision();
    }

    pub async fn cancel_editing(&self) {
        self.inner.state.write().await.editing = None;
        self.bump_revision();
    }

    pub async fn set_edit_title(
        &self,
        title: impl Into<String>,
    ) -> Result<(), NotesViewError> {
        self.modify_edit(|edit| edit.title = title.into()).await
    }

    pub async fn set_edit_content(
        &self,
        content: impl Into<String>,
    ) -> Result<(), NotesViewError> {
        self.modify_edit(|edit| edit.content = content.into()).await
    }

    async fn modify_edit(
        &self,
        modify: impl FnOnce(&mut NoteEdit),
    ) -> Result<(), NotesViewError> {
        let mut state = self.inner.state.write().await;
        let edit = state.editing.as_mut()
            .ok_or(NotesViewError::NotEditing)?;
        modify(edit);
        drop(state);
        self.bump_revision();
        Ok(())
    }

    pub async fn edit_buffer(&self) -> Option<NoteEdit> {
        self.inner.state.read().await.editing.clone()
    }

    pub async fn set_draft_title(&self, title: impl Into<String>) {
        self.inner.state.write().await.draft.title = title.into();
        self.bump_revision();
    }

    pub async fn set_draft_content(&self, content: impl Into<String>) {
        self.inner.state.write().await.draft.content = content.into();
        self.bump_revision();
    }

    pub async fn draft(&self) -> NoteDraft {
        self.inner.state.read().await.draft.clone()
    }

    pub async fn set_search_query(&self, query: impl Into<String>) {
        self.inner.state.write().await.search_query = query.into();
        self.bump_revision();
    }

    pub async fn search_query(&self) -> String {
        self.inner.state.read().await.search_query.clone()
    }

    /// The local list, filtered by the current search query.
    pub async fn visible_notes(&self) -> Vec<Note> {
        let state = self.inner.state.read().await;
        filter_notes(&state.notes, &state.search_query)
    }

    pub async fn notes(&self) -> Vec<Note> {
        self.inner.state.read().await.notes.clone()
    }

    pub async fn find_note(&self, id: &NoteId) -> Option<Note> {
        self.inner.state.read().await.notes
            .iter()
            .find(|note| note.id == *id)
            .cloned()
    }

    pub async fn list_state(&self) -> ListState {
        self.inner.state.read().await.list_state
    }

    pub async fn is_loading(&self) -> bool {
        self.list_state().await == ListState::Loading
    }

    /// Bumped on every state change.
    pub fn revisions(&self) -> watch::Receiver<u64> {
        self.inner.revision.subscribe()
    }

    /// Fetches the list and keeps refetching it on every change event until
    /// the returned guard is dropped.
    pub async fn mount<F: ChangeFeed>(
        &self,
        feed: &F,
    ) -> Result<MountGuard<F::Subscription>, NotesViewError> {
        debug!("mounting notes view");
        let subscription = feed.subscribe()?;
        let listener = tokio::spawn(
            process_changes(self.clone(), subscription.events())
        );
        if let Err(e) = self.list().await {
            debug!("initial fetch failed: {e}");
        }
        Ok(
            MountGuard {
                _subscription: subscription,
                listener: listener.abort_handle(),
            }
        )
    }

    fn bump_revision(&self) {
        self.inner.revision.send_modify(|revision| *revision += 1);
    }

    fn report_success(&self, message: &str) {
        self.inner.notifier.notify(Notification::Success(message.to_owned()));
    }

    fn report_error(&self, e: StoreError) -> NotesViewError {
        self.inner.notifier.notify(Notification::Error(e.to_string()));
        e.into()
    }
}

/// Keeps the change subscription of a mounted view alive.
pub struct MountGuard<Sub: ChangeSubscription> {
    _subscription: Sub,
    listener: tokio::task::AbortHandle,
}

impl<Sub: ChangeSubscription> Drop for MountGuard<Sub> {
    fn drop(&mut self) {
        debug!("unmounting notes view");
        self.listener.abort();
    }
}

async fn process_changes<S: NoteStore, N: Notifier>(
    view: NotesView<S, N>,
    events: impl Stream<Item=Result<ChangeEvent, ChangeFeedError>>,
) {
    pin_mut!(events);
    while let Some(event) = events.next().await {
        match event {
            Ok(event) => trace!(
                "{:?} on \"{}\", refetching notes",
                event.kind,
                event.table,
            ),
            Err(e) => warn!("{e}, refetching notes"),
        }
        // each event gets its own fetch, whichever finishes last wins
        let view = view.clone();
        tokio::spawn(async move {
            let _ = view.list().await;
        });
    }
    debug!("change stream ended");
}
