
use async_stream::stream;
use data::{Session, User, UserId};
use futures::Stream;
use log::{debug, warn};
use tokio::sync::{broadcast, RwLock};
use crate::SESSION_CHANGES_CAPACITY;
use crate::identity::{IdentityError, IdentityProvider, SessionChange};
use crate::rng::make_uuid;

/// Identity provider that trusts whatever email it is given.
pub struct MemoryIdentityProvider {
    session: RwLock<Option<Session>>,
    changes: broadcast::Sender<SessionChange>,
}

impl MemoryIdentityProvider {
    pub fn new() -> Self {
        MemoryIdentityProvider {
            session: RwLock::new(None),
            changes: broadcast::channel(SESSION_CHANGES_CAPACITY).0,
        }
    }

    pub fn with_session(session: Session) -> Self {
        MemoryIdentityProvider {
            session: RwLock::new(Some(session)),
            changes: broadcast::channel(SESSION_CHANGES_CAPACITY).0,
        }
    }

    pub async fn sign_in(&self, email: &str) -> Session {
        debug!("signing in \"{email}\"");
        let mut rng = rand::rng();
        let session = Session {
            access_token: make_uuid(&mut rng).simple().to_string(),
            refresh_token: Some(make_uuid(&mut rng).simple().to_string()),
            expires_at: None,
            user: User {
                id: UserId(make_uuid(&mut rng).hyphenated().to_string()),
                email: Some(email.to_owned()),
            },
        };
        *self.session.write().await = Some(session.clone());
        self.emit(SessionChange::signed_in(session.clone()));
        session
    }

    /// Swaps the access token of the current session.
    pub async fn refresh(&self) -> Result<Session, IdentityError> {
        let mut current = self.session.write().await;
        let session = current.as_mut()
            .ok_or(IdentityError::NotSignedIn)?;
        session.access_token = make_uuid(&mut rand::rng()).simple().to_string();
        let session = session.clone();
        drop(current);
        self.emit(SessionChange::token_refreshed(session.clone()));
        Ok(session)
    }

    fn emit(&self, change: SessionChange) {
        // no listeners is fine
        let _ = self.changes.send(change);
    }
}

impl Default for MemoryIdentityProvider {
    fn default() -> Self {
        MemoryIdentityProvider::new()
    }
}

impl IdentityProvider for MemoryIdentityProvider {
    async fn get_session(&self) -> Result<Option<Session>, IdentityError> {
        Ok(self.session.read().await.clone())
    }

    fn session_changes(&self) -> impl Stream<Item=SessionChange> + Send + 'static {
        let mut receiver = self.changes.subscribe();
        stream! {
            loop {
                match receiver.recv().await {
                    Ok(change) => yield change,
                    Err(broadcast::error::RecvError::Lagged(n)) =>
                        warn!("missed {n} session changes"),
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    async fn sign_out(&self) -> Result<(), IdentityError> {
        debug!("signing out");
        *self.session.write().await = None;
        self.emit(SessionChange::signed_out());
        Ok(())
    }
}
