use thiserror::Error;
use crate::identity::IdentityError;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{message}")]
    Rejected {
        message: String,
    },

    #[error("note not found")]
    NoteNotFound,

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error("cannot decode backend response: {0}")]
    Decode(#[from] serde_json::Error),
}
