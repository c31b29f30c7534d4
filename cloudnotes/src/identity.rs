mod errors;

use data::Session;
use futures::Stream;
pub use errors::IdentityError;

/// The external authentication service.
///
/// Credentials are never validated locally; sign-in itself is provider
/// specific and lives on the concrete implementations.
pub trait IdentityProvider: Send + Sync + 'static {
    fn get_session(
        &self,
    ) -> impl Future<Output=Result<Option<Session>, IdentityError>> + Send;

    /// Subscribes eagerly; the subscription ends when the stream is dropped.
    fn session_changes(&self) -> impl Stream<Item=SessionChange> + Send + 'static;

    fn sign_out(&self) -> impl Future<Output=Result<(), IdentityError>> + Send;
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SessionChangeKind {
    SignedIn,
    SignedOut,
    TokenRefreshed,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SessionChange {
    pub kind: SessionChangeKind,
    pub session: Option<Session>,
}

impl SessionChange {
    pub fn signed_in(session: Session) -> Self {
        SessionChange {
            kind: SessionChangeKind::SignedIn,
            session: Some(session),
        }
    }

    pub fn signed_out() -> Self {
        SessionChange {
            kind: SessionChangeKind::SignedOut,
            session: None,
        }
    }

    pub fn token_refreshed(session: Session) -> Self {
        SessionChange {
            kind: SessionChangeKind::TokenRefreshed,
            session: Some(session),
        }
    }
}
