
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use async_stream::stream;
use futures::Stream;
use log::{debug, trace};
use tokio::sync::broadcast;
use crate::CHANGE_FEED_CAPACITY;
use crate::change_feed::{ChangeEvent, ChangeFeed, ChangeFeedError, ChangeKind, ChangeSubscription};

/// In-process change transport.
///
/// Stores publish here after every successful write; every live
/// subscription sees every event.
#[derive(Clone)]
pub struct ChangeHub {
    inner: Arc<ChangeHubInternal>,
}

struct ChangeHubInternal {
    events: broadcast::Sender<ChangeEvent>,
    active_subscriptions: AtomicUsize,
}

impl ChangeHub {
    pub fn new() -> Self {
        Self::with_capacity(CHANGE_FEED_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        ChangeHub {
            inner: Arc::new(
                ChangeHubInternal {
                    events: sender,
                    active_subscriptions: AtomicUsize::new(0),
                }
            ),
        }
    }

    pub fn publish(
        &self,
        kind: ChangeKind,
        table: &str,
        payload: serde_json::Value,
    ) {
        trace!("publishing {kind:?} on \"{table}\"");
        // no subscribers is fine, nobody is watching
        let _ = self.inner.events.send(
            ChangeEvent {
                kind,
                table: table.to_owned(),
                payload,
            }
        );
    }

    pub fn active_subscriptions(&self) -> usize {
        self.inner.active_subscriptions.load(Ordering::Acquire)
    }
}

impl Default for ChangeHub {
    fn default() -> Self {
        ChangeHub::new()
    }
}

impl ChangeFeed for ChangeHub {
    type Subscription = ChangeHubSubscription;

    fn subscribe(&self) -> Result<ChangeHubSubscription, ChangeFeedError> {
        let count = self.inner.active_subscriptions.fetch_add(1, Ordering::AcqRel) + 1;
        debug!("subscribed to changes, {count} active subscriptions");
        Ok(
            ChangeHubSubscription {
                hub: self.inner.clone(),
            }
        )
    }
}

pub struct ChangeHubSubscription {
    hub: Arc<ChangeHubInternal>,
}

impl Drop for ChangeHubSubscription {
    fn drop(&mut self) {
        let count = self.hub.active_subscriptions.fetch_sub(1, Ordering::AcqRel) - 1;
        debug!("unsubscribed from changes, {count} active subscriptions");
    }
}

impl ChangeSubscription for ChangeHubSubscription {
    fn events(&self) -> impl Stream<Item=Result<ChangeEvent, ChangeFeedError>> + Send + 'static {
        let mut receiver = self.hub.events.subscribe();

        stream! {
            loop {
                match receiver.recv().await {
                    Ok(event) => yield Ok(event),
                    Err(broadcast::error::RecvError::Lagged(n)) =>
                        yield Err(ChangeFeedError::Overflow(n)),
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }
}
