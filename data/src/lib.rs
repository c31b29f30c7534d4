mod note;
mod note_id;
mod session;

pub use note::{Note, NoteDraft, NoteEdit, NewNote, NotePatch};
pub use note_id::{NoteId, NoteIdParseError, UserId};
pub use session::{Session, User};
