use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use crate::{NoteId, UserId};

/// A note row as the remote store returns it.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    pub content: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub user_id: UserId,
}

/// Insert payload; id, timestamp and owner are filled in by the store.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct NewNote {
    pub title: String,
    pub content: String,
}

/// Update payload, restricted to the client-mutable fields.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct NotePatch {
    pub title: String,
    pub content: String,
}

/// The edit buffer: a copy of a note being modified before commit.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NoteEdit {
    pub id: NoteId,
    pub title: String,
    pub content: String,
}

impl NoteEdit {
    pub fn patch(&self) -> NotePatch {
        NotePatch {
            title: self.title.clone(),
            content: self.content.clone(),
        }
    }
}

impl From<&Note> for NoteEdit {
    fn from(note: &Note) -> Self {
        NoteEdit {
            id: note.id.clone(),
            title: note.title.clone(),
            content: note.content.clone(),
        }
    }
}

/// Create-form inputs.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct NoteDraft {
    pub title: String,
    pub content: String,
}
