use cloudnotes::notifications::{Notification, Notifier};

/// Prints notifications for the user: successes to stdout, errors to stderr.
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn notify(&self, notification: Notification) {
        match notification {
            Notification::Success(message) => println!("{message}"),
            Notification::Error(message) => eprintln!("error: {message}"),
        }
    }
}
