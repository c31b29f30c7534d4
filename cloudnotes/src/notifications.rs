use std::sync::Arc;
use log::{error, info};

/// A transient user-facing message.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Notification {
    Success(String),
    Error(String),
}

impl Notification {
    pub fn message(&self) -> &str {
        match self {
            Notification::Success(message) | Notification::Error(message) => message,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Notification::Error(_))
    }
}

pub trait Notifier: Send + Sync + 'static {
    fn notify(&self, notification: Notification);
}

/// Reports notifications through the logger.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: Notification) {
        match notification {
            Notification::Success(message) => info!("{message}"),
            Notification::Error(message) => error!("{message}"),
        }
    }
}

impl<T: Notifier + ?Sized> Notifier for Arc<T> {
    fn notify(&self, notification: Notification) {
        (**self).notify(notification)
    }
}
