use std::error::Error;
use std::sync::{Arc, Mutex};
use cloudnotes::notes_view::NotesView;
use cloudnotes::notifications::{Notification, Notifier};
use cloudnotes::store::NoteStore;
use data::Note;
use test_utils::EVENT_WAIT;
use tokio::time::timeout;

#[derive(Default)]
pub struct RecordingNotifier {
    notifications: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Arc<Self> {
        Arc::new(RecordingNotifier::default())
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.lock()
            .expect("notifications lock poisoned")
            .clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.notifications.lock()
            .expect("notifications lock poisoned")
            .push(notification);
    }
}

/// Waits for the view's local list to satisfy `done`.
pub async fn wait_for_notes<S: NoteStore, N: Notifier>(
    view: &NotesView<S, N>,
    done: impl Fn(&[Note]) -> bool,
) -> Result<(), Box<dyn Error>> {
    let mut revisions = view.revisions();
    timeout(
        EVENT_WAIT,
        async {
            while !done(&view.notes().await) {
                if revisions.changed().await.is_err() {
                    break
                }
            }
        },
    ).await?;
    if done(&view.notes().await) {
        Ok(())
    } else {
        Err("the view stopped changing".into())
    }
}

pub fn titles(notes: &[Note]) -> Vec<&str> {
    notes.iter()
        .map(|note| note.title.as_str())
        .collect()
}
