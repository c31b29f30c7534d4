//! Live change transport for the notes table.
//!
//! A [`ChangeFeed`] hands out [`ChangeSubscription`] guards; the guard
//! yields the change events and unsubscribes when dropped. Payloads are
//! passed through untouched, consumers only care that *something* changed.

mod errors;
mod hub;

use futures::Stream;
use serde::{Deserialize, Serialize};
pub use errors::ChangeFeedError;
pub use hub::{ChangeHub, ChangeHubSubscription};

pub trait ChangeFeed: Send + Sync + Clone + 'static {
    type Subscription: ChangeSubscription;

    fn subscribe(&self) -> Result<Self::Subscription, ChangeFeedError>;
}

pub trait ChangeSubscription: Send + Sync + 'static {
    fn events(&self) -> impl Stream<Item=Result<ChangeEvent, ChangeFeedError>> + Send + 'static;
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ChangeEvent {
    pub kind: ChangeKind,
    pub table: String,
    pub payload: serde_json::Value,
}
