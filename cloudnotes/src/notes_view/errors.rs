use thiserror::Error;
use crate::change_feed::ChangeFeedError;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum NotesViewError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("no note is being edited")]
    NotEditing,

    #[error("cannot subscribe to note changes: {0}")]
    ChangeFeed(#[from] ChangeFeedError),
}
