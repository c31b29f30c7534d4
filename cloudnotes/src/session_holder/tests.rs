use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use async_stream::stream;
use data::{User, UserId};
use tokio::sync::broadcast;
use crate::identity::SessionChangeKind;
use super::*;

struct TestIdentityProvider {
    initial: Mutex<Option<Result<Option<Session>, IdentityError>>>,
    changes: broadcast::Sender<SessionChange>,
    sign_out_calls: AtomicUsize,
    fail_sign_out: bool,
}

impl TestIdentityProvider {
    fn new(initial: Result<Option<Session>, IdentityError>) -> Self {
        TestIdentityProvider {
            initial: Mutex::new(Some(initial)),
            changes: broadcast::channel(8).0,
            sign_out_calls: AtomicUsize::new(0),
            fail_sign_out: false,
        }
    }

    fn emit(&self, change: SessionChange) {
        self.changes.send(change).expect("nobody is listening");
    }
}

impl IdentityProvider for TestIdentityProvider {
    async fn get_session(&self) -> Result<Option<Session>, IdentityError> {
        self.initial.lock().unwrap()
            .take()
            .expect("get_session called twice")
    }

    fn session_changes(&self) -> impl Stream<Item=SessionChange> + Send + 'static {
        let mut receiver = self.changes.subscribe();
        stream! {
            while let Ok(change) = receiver.recv().await {
                yield change;
            }
        }
    }

    async fn sign_out(&self) -> Result<(), IdentityError> {
        self.sign_out_calls.fetch_add(1, Ordering::Relaxed);
        if self.fail_sign_out {
            Err(IdentityError::Rejected { message: "network down".into() })
        } else {
            Ok(())
        }
    }
}

fn session(email: &str) -> Session {
    Session {
        access_token: format!("token-{email}"),
        refresh_token: None,
        expires_at: None,
        user: User {
            id: UserId(format!("id-{email}")),
            email: Some(email.to_owned()),
        },
    }
}

async fn next_value(
    receiver: &mut watch::Receiver<Option<Session>>,
) -> Option<Session> {
    tokio::time::timeout(Duration::from_secs(5), receiver.changed())
        .await
        .expect("timed out waiting for a session change")
        .expect("session holder went away");
    receiver.borrow_and_update().clone()
}

#[tokio::test]
async fn start_without_session() {
    let provider = Arc::new(TestIdentityProvider::new(Ok(None)));
    let holder = SessionHolder::start(provider).await
        .expect("start failed");
    assert!(!holder.is_authenticated());
    assert_eq!(holder.current(), None);
}

#[tokio::test]
async fn start_with_session() {
    let provider = Arc::new(
        TestIdentityProvider::new(Ok(Some(session("a@example.com"))))
    );
    let holder = SessionHolder::start(provider).await
        .expect("start failed");
    assert!(holder.is_authenticated());
    assert_eq!(holder.current(), Some(session("a@example.com")));
}

#[tokio::test]
async fn start_propagates_provider_error() {
    let provider = Arc::new(
        TestIdentityProvider::new(Err(IdentityError::Rejected { message: "boom".into() }))
    );
    let err = SessionHolder::start(provider).await
        .err()
        .expect("should fail");
    assert!(
        matches!(err, IdentityError::Rejected { ref message } if message == "boom"),
        "wrong error type: {err:#?}",
    );
}

#[tokio::test]
async fn changes_replace_stored_session() {
    let provider = Arc::new(TestIdentityProvider::new(Ok(None)));
    let holder = SessionHolder::start(provider.clone()).await
        .expect("start failed");
    let mut watch = holder.watch();

    provider.emit(SessionChange::signed_in(session("a@example.com")));
    assert_eq!(next_value(&mut watch).await, Some(session("a@example.com")));
    assert_eq!(holder.current(), Some(session("a@example.com")));

    provider.emit(SessionChange::token_refreshed(session("b@example.com")));
    assert_eq!(next_value(&mut watch).await, Some(session("b@example.com")));

    provider.emit(SessionChange::signed_out());
    assert_eq!(next_value(&mut watch).await, None);
    assert!(!holder.is_authenticated());
}

#[tokio::test]
async fn sign_out_delegates_and_waits_for_the_change() {
    let provider = Arc::new(
        TestIdentityProvider::new(Ok(Some(session("a@example.com"))))
    );
    let holder = SessionHolder::start(provider.clone()).await
        .expect("start failed");

    holder.sign_out().await.expect("sign out failed");
    assert_eq!(provider.sign_out_calls.load(Ordering::Relaxed), 1);
    assert!(holder.is_authenticated());

    let mut watch = holder.watch();
    provider.emit(SessionChange {
        kind: SessionChangeKind::SignedOut,
        session: None,
    });
    assert_eq!(next_value(&mut watch).await, None);
}

#[tokio::test]
async fn sign_out_error_is_propagated() {
    let mut provider = TestIdentityProvider::new(Ok(Some(session("a@example.com"))));
    provider.fail_sign_out = true;
    let holder = SessionHolder::start(Arc::new(provider)).await
        .expect("start failed");
    let err = holder.sign_out().await.expect_err("should fail");
    assert!(matches!(err, IdentityError::Rejected { .. }), "wrong error type: {err:#?}");
    assert!(holder.is_authenticated());
}

#[tokio::test]
async fn drop_unsubscribes() {
    let provider = Arc::new(TestIdentityProvider::new(Ok(None)));
    let holder = SessionHolder::start(provider.clone()).await
        .expect("start failed");
    assert_eq!(provider.changes.receiver_count(), 1);
    drop(holder);
    tokio::time::timeout(Duration::from_secs(5), async {
        while provider.changes.receiver_count() != 0 {
            tokio::task::yield_now().await;
        }
    })
        .await
        .expect("listener was not torn down");
}
