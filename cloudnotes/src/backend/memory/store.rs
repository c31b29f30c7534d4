
use std::sync::Mutex;
use async_trait::async_trait;
use data::{NewNote, Note, NoteId, NotePatch, UserId};
use log::{debug, trace};
use rand::SeedableRng;
use rand::rngs::StdRng;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use crate::change_feed::{ChangeHub, ChangeKind};
use crate::DEFAULT_NOTES_TABLE;
use crate::rng::make_uuid;
use crate::store::{NoteStore, StoreError};

/// A notes table living in memory, owned by a single user.
///
/// Assigns ids, owners and timestamps the way the hosted table does and
/// publishes every successful write to its [`ChangeHub`].
pub struct MemoryNoteStore {
    owner: UserId,
    notes: RwLock<Vec<Note>>,
    hub: ChangeHub,
    rng: Mutex<StdRng>,
    clock: Box<dyn Fn() -> OffsetDateTime + Send + Sync>,
}

impl MemoryNoteStore {
    pub fn new(owner: UserId, hub: ChangeHub) -> Self {
        MemoryNoteStore {
            owner,
            notes: RwLock::new(Vec::new()),
            hub,
            rng: Mutex::new(StdRng::from_os_rng()),
            clock: Box::new(OffsetDateTime::now_utc),
        }
    }

    pub fn with_clock(
        mut self,
        clock: impl Fn() -> OffsetDateTime + Send + Sync + 'static,
    ) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Puts rows in as they are, without publishing changes.
    pub async fn seed(&self, notes: impl IntoIterator<Item=Note>) {
        let mut table = self.notes.write().await;
        table.extend(notes);
        sort_newest_first(&mut table);
    }

    pub fn hub(&self) -> &ChangeHub {
        &self.hub
    }

    fn generate_id(&self) -> NoteId {
        let uuid = make_uuid(
            &mut *self.rng.lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
        );
        NoteId::from(uuid)
    }

    fn publish(&self, kind: ChangeKind, note: &Note) {
        self.hub.publish(
            kind,
            DEFAULT_NOTES_TABLE,
            serde_json::to_value(note).unwrap_or_default(),
        );
    }
}

#[async_trait]
impl NoteStore for MemoryNoteStore {
    async fn select_all(&self) -> Result<Vec<Note>, StoreError> {
        let notes = self.notes.read().await.clone();
        trace!("selected {} notes", notes.len());
        Ok(notes)
    }

    async fn insert(&self, note: NewNote) -> Result<(), StoreError> {
        let note = Note {
            id: self.generate_id(),
            title: note.title,
            content: note.content,
            created_at: (self.clock)(),
            user_id: self.owner.clone(),
        };
        debug!("inserting note {}", note.id);
        let mut table = self.notes.write().await;
        table.insert(0, note.clone());
        sort_newest_first(&mut table);
        drop(table);
        self.publish(ChangeKind::Insert, &note);
        Ok(())
    }

    async fn update(
        &self,
        id: &NoteId,
        patch: NotePatch,
    ) -> Result<(), StoreError> {
        debug!("updating note {id}");
        let mut table = self.notes.write().await;
        let note = table.iter_mut()
            .find(|note| note.id == *id)
            .ok_or(StoreError::NoteNotFound)?;
        note.title = patch.title;
        note.content = patch.content;
        let note = note.clone();
        drop(table);
        self.publish(ChangeKind::Update, &note);
        Ok(())
    }

    async fn delete(&self, id: &NoteId) -> Result<(), StoreError> {
        debug!("deleting note {id}");
        let mut table = self.notes.write().await;
        let position = table.iter()
            .position(|note| note.id == *id)
            .ok_or(StoreError::NoteNotFound)?;
        let note = table.remove(position);
        drop(table);
        self.publish(ChangeKind::Delete, &note);
        Ok(())
    }
}

fn sort_newest_first(notes: &mut [Note]) {
    notes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}
