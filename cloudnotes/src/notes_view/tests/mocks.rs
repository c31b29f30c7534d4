use std::collections::VecDeque;
use std::sync::Mutex;
use async_trait::async_trait;
use data::{NewNote, Note, NoteId, NotePatch, UserId};
use time::macros::datetime;
use crate::notifications::{Notification, Notifier};
use crate::store::{NoteStore, StoreError};

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum StoreCall {
    SelectAll,
    Insert(NewNote),
    Update(NoteId, NotePatch),
    Delete(NoteId),
}

/// Answers from a queue of canned results; an empty queue means success
/// (and an empty list for `select_all`).
pub struct TestNoteStore {
    calls: Mutex<Vec<StoreCall>>,
    select_results: Mutex<VecDeque<Result<Vec<Note>, StoreError>>>,
    write_results: Mutex<VecDeque<Result<(), StoreError>>>,
}

impl TestNoteStore {
    pub fn new() -> Self {
        TestNoteStore {
            calls: Mutex::new(Vec::new()),
            select_results: Mutex::new(VecDeque::new()),
            write_results: Mutex::new(VecDeque::new()),
        }
    }

    pub fn with_select(self, result: Result<Vec<Note>, StoreError>) -> Self {
        self.select_results.lock().unwrap().push_back(result);
        self
    }

    pub fn with_write(self, result: Result<(), StoreError>) -> Self {
        self.write_results.lock().unwrap().push_back(result);
        self
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record_write(&self, call: StoreCall) -> Result<(), StoreError> {
        self.calls.lock().unwrap().push(call);
        self.write_results.lock().unwrap()
            .pop_front()
            .unwrap_or(Ok(()))
    }
}

#[async_trait]
impl NoteStore for TestNoteStore {
    async fn select_all(&self) -> Result<Vec<Note>, StoreError> {
        self.calls.lock().unwrap().push(StoreCall::SelectAll);
        self.select_results.lock().unwrap()
            .pop_front()
            .unwrap_or(Ok(Vec::new()))
    }

    async fn insert(&self, note: NewNote) -> Result<(), StoreError> {
        self.record_write(StoreCall::Insert(note))
    }

    async fn update(
        &self,
        id: &NoteId,
        patch: NotePatch,
    ) -> Result<(), StoreError> {
        self.record_write(StoreCall::Update(id.clone(), patch))
    }

    async fn delete(&self, id: &NoteId) -> Result<(), StoreError> {
        self.record_write(StoreCall::Delete(id.clone()))
    }
}

#[derive(Default)]
pub struct TestNotifier {
    notifications: Mutex<Vec<Notification>>,
}

impl TestNotifier {
    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.lock().unwrap().clone()
    }
}

impl Notifier for TestNotifier {
    fn notify(&self, notification: Notification) {
        self.notifications.lock().unwrap().push(notification);
    }
}

pub fn rejected(message: &str) -> StoreError {
    StoreError::Rejected {
        message: message.to_owned(),
    }
}

pub fn groceries() -> Note {
    Note {
        id: "1".parse().unwrap(),
        title: "Groceries".into(),
        content: "milk, eggs".into(),
        created_at: datetime!(2024-01-02 0:00 UTC),
        user_id: UserId("u1".into()),
    }
}

pub fn todo() -> Note {
    Note {
        id: "2".parse().unwrap(),
        title: "Todo".into(),
        content: "ship release".into(),
        created_at: datetime!(2024-01-01 0:00 UTC),
        user_id: UserId("u1".into()),
    }
}
