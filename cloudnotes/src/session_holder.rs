#[cfg(test)] mod tests;

use std::sync::Arc;
use data::Session;
use futures::{pin_mut, Stream};
use log::{debug, trace};
use tokio::sync::watch;
use tokio_stream::StreamExt;
use crate::identity::{IdentityError, IdentityProvider, SessionChange};

/// Keeps the current identity in sync with the identity provider.
///
/// No session means the user has to authenticate first; everything that
/// needs an identity gets it from here explicitly.
pub struct SessionHolder<P: IdentityProvider> {
    provider: Arc<P>,
    session: Arc<watch::Sender<Option<Session>>>,
    listener: tokio::task::AbortHandle,
}

impl<P: IdentityProvider> Drop for SessionHolder<P> {
    fn drop(&mut self) {
        debug!("session holder dropped, unsubscribing from session changes");
        self.listener.abort();
    }
}

impl<P: IdentityProvider> SessionHolder<P> {
    pub async fn start(provider: Arc<P>) -> Result<Self, IdentityError> {
        // subscribed first, so a change racing the initial read is applied after it
        let changes = provider.session_changes();
        let session = provider.get_session().await?;
        debug!(
            "initial session: {}",
            describe(session.as_ref()),
        );
        let sender = Arc::new(watch::channel(session).0);
        let listener = tokio::spawn(
            process_changes(sender.clone(), changes)
        );
        Ok(
            SessionHolder {
                provider,
                session: sender,
                listener: listener.abort_handle(),
            }
        )
    }

    pub fn current(&self) -> Option<Session> {
        self.session.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.borrow().is_some()
    }

    pub fn watch(&self) -> watch::Receiver<Option<Session>> {
        self.session.subscribe()
    }

    /// The stored session is left alone; the provider's sign-out change
    /// clears it.
    pub async fn sign_out(&self) -> Result<(), IdentityError> {
        debug!("signing out {}", describe(self.session.borrow().as_ref()));
        self.provider.sign_out().await
    }

    pub fn provider(&self) -> &Arc<P> {
        &self.provider
    }
}

async fn process_changes(
    session: Arc<watch::Sender<Option<Session>>>,
    changes: impl Stream<Item=SessionChange>,
) {
    pin_mut!(changes);
    while let Some(change) = changes.next().await {
        trace!(
            "session change {:?}: {}",
            change.kind,
            describe(change.session.as_ref()),
        );
        session.send_replace(change.session);
    }
    debug!("session change stream ended");
}

fn describe(session: Option<&Session>) -> String {
    match session {
        Some(session) => format!(
            "user \"{}\"",
            session.email().unwrap_or(&session.user.id),
        ),
        None => "no session".to_owned(),
    }
}
