use std::io::Error as IoError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("{message}")]
    Rejected {
        message: String,
    },

    #[error("not signed in")]
    NotSignedIn,

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("session file io error: {0}")]
    Io(#[from] IoError),

    #[error("session file parsing error: {0}")]
    SessionFileParse(#[from] toml::de::Error),

    #[error("session file serialization error: {0}")]
    SessionFileSerialize(#[from] toml::ser::Error),
}
