use std::error::Error;
use std::sync::Arc;
use cloudnotes::backend::memory::{MemoryIdentityProvider, MemoryNoteStore};
use cloudnotes::change_feed::ChangeHub;
use cloudnotes::notes_view::{NotesView, NotesViewError};
use cloudnotes::notifications::Notification;
use cloudnotes::session_holder::SessionHolder;
use cloudnotes::store::{NoteStore, StoreError};
use cloudnotes::{NOTE_ADDED_MESSAGE, NOTE_DELETED_MESSAGE, NOTE_UPDATED_MESSAGE};
use data::{NoteDraft, NoteId};
use test_utils::data::{groceries, scenario_notes, TEST_USER};
use test_utils::EVENT_WAIT;
use tokio::time::timeout;
use crate::common::{titles, wait_for_notes, RecordingNotifier};

mod common;

type MemoryView = NotesView<Arc<MemoryNoteStore>, Arc<RecordingNotifier>>;

async fn seeded_view() -> (ChangeHub, Arc<MemoryNoteStore>, Arc<RecordingNotifier>, MemoryView) {
    let hub = ChangeHub::new();
    let store = Arc::new(MemoryNoteStore::new(TEST_USER.id.clone(), hub.clone()));
    store.seed(scenario_notes()).await;
    let notifier = RecordingNotifier::new();
    let view = NotesView::new(store.clone(), notifier.clone());
    (hub, store, notifier, view)
}

#[tokio::test]
async fn mounted_view_lists_and_searches() -> Result<(), Box<dyn Error>> {
    let (hub, _store, _notifier, view) = seeded_view().await;
    let _mounted = view.mount(&hub).await?;
    assert_eq!(view.notes().await, scenario_notes());
    assert!(!view.is_loading().await);

    view.set_search_query("milk").await;
    let visible = view.visible_notes().await;
    assert_eq!(visible.len(), 1);
    assert_eq!(&*visible[0].id, "1");

    view.set_search_query("o").await;
    assert_eq!(titles(&view.visible_notes().await), ["Groceries", "Todo"]);

    view.set_search_query("").await;
    assert_eq!(view.visible_notes().await, scenario_notes());
    Ok(())
}

#[tokio::test]
async fn created_note_arrives_through_the_change_feed() -> Result<(), Box<dyn Error>> {
    let (hub, _store, notifier, view) = seeded_view().await;
    let _mounted = view.mount(&hub).await?;

    view.set_draft_title("X").await;
    view.set_draft_content("Y").await;
    view.create().await?;
    assert_eq!(view.draft().await, NoteDraft::default());
    assert_eq!(
        notifier.notifications(),
        [Notification::Success(NOTE_ADDED_MESSAGE.into())],
    );

    wait_for_notes(&view, |notes| notes.len() == 3).await?;
    assert_eq!(titles(&view.notes().await), ["X", "Groceries", "Todo"]);
    Ok(())
}

#[tokio::test]
async fn without_mounting_writes_wait_for_the_next_list() -> Result<(), Box<dyn Error>> {
    let (_hub, _store, _notifier, view) = seeded_view().await;
    view.list().await?;

    view.set_draft_title("X").await;
    view.set_draft_content("Y").await;
    view.create().await?;
    assert_eq!(view.notes().await, scenario_notes());

    view.list().await?;
    assert_eq!(titles(&view.notes().await), ["X", "Groceries", "Todo"]);
    Ok(())
}

#[tokio::test]
async fn edit_is_saved_and_refetched() -> Result<(), Box<dyn Error>> {
    let (hub, _store, notifier, view) = seeded_view().await;
    let _mounted = view.mount(&hub).await?;

    view.start_editing(&groceries()).await;
    view.set_edit_title("Shopping").await?;
    view.save_edit().await?;
    assert_eq!(view.edit_buffer().await, None);
    assert_eq!(
        notifier.notifications(),
        [Notification::Success(NOTE_UPDATED_MESSAGE.into())],
    );

    wait_for_notes(&view, |notes| notes[0].title == "Shopping").await?;
    let shopping = view.notes().await.remove(0);
    assert_eq!(shopping.content, groceries().content);
    assert_eq!(shopping.created_at, groceries().created_at);
    Ok(())
}

#[tokio::test]
async fn deleted_note_disappears() -> Result<(), Box<dyn Error>> {
    let (hub, _store, notifier, view) = seeded_view().await;
    let _mounted = view.mount(&hub).await?;

    view.delete(&"2".parse()?).await?;
    assert_eq!(
        notifier.notifications(),
        [Notification::Success(NOTE_DELETED_MESSAGE.into())],
    );
    wait_for_notes(&view, |notes| notes.len() == 1).await?;
    assert_eq!(titles(&view.notes().await), ["Groceries"]);
    Ok(())
}

#[tokio::test]
async fn deleting_a_missing_note_reports_and_keeps_the_list() -> Result<(), Box<dyn Error>> {
    let (hub, _store, notifier, view) = seeded_view().await;
    let _mounted = view.mount(&hub).await?;

    let err = view.delete(&"nonexistent".parse::<NoteId>()?).await
        .expect_err("deleting a missing note must fail");
    assert!(
        matches!(err, NotesViewError::Store(StoreError::NoteNotFound)),
        "wrong error type: {err:#?}",
    );
    assert_eq!(
        notifier.notifications(),
        [Notification::Error("note not found".into())],
    );
    assert_eq!(view.notes().await, scenario_notes());
    Ok(())
}

#[tokio::test]
async fn unmounting_stops_the_refetches() -> Result<(), Box<dyn Error>> {
    let (hub, store, _notifier, view) = seeded_view().await;
    let mounted = view.mount(&hub).await?;
    assert_eq!(hub.active_subscriptions(), 1);
    drop(mounted);
    assert_eq!(hub.active_subscriptions(), 0);

    view.set_draft_title("X").await;
    view.set_draft_content("Y").await;
    view.create().await?;
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    assert_eq!(view.notes().await, scenario_notes());
    assert_eq!(store.select_all().await?.len(), 3);
    Ok(())
}

#[tokio::test]
async fn session_holder_follows_the_provider() -> Result<(), Box<dyn Error>> {
    let provider = Arc::new(MemoryIdentityProvider::new());
    let holder = SessionHolder::start(provider.clone()).await?;
    assert!(!holder.is_authenticated());

    let mut session = holder.watch();
    let signed_in = provider.sign_in("alice@example.com").await;
    timeout(EVENT_WAIT, session.changed()).await??;
    assert_eq!(holder.current(), Some(signed_in));

    holder.sign_out().await?;
    timeout(EVENT_WAIT, session.changed()).await??;
    assert_eq!(holder.current(), None);
    Ok(())
}
