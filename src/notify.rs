//! User-facing notifications (success / warning / error).
//!
//! Every failure that reaches the user is reported here exactly once, at the
//! point where it is detected. Delivery is fire-and-forget: a notifier never
//! fails back into the caller.

use std::sync::mpsc;

use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Warning,
    Error,
}

/// A single transient message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);

    fn success(&self, message: &str) {
        self.notify(Notice {
            level: NoticeLevel::Success,
            message: message.to_string(),
        });
    }

    fn warning(&self, message: &str) {
        self.notify(Notice {
            level: NoticeLevel::Warning,
            message: message.to_string(),
        });
    }

    fn error(&self, message: &str) {
        self.notify(Notice {
            level: NoticeLevel::Error,
            message: message.to_string(),
        });
    }
}

/// Writes notices to the log. Used by the CLI, where the terminal is the UI.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Success => info!(notice = %notice.message, "User notification"),
            NoticeLevel::Warning => warn!(notice = %notice.message, "User notification"),
            NoticeLevel::Error => error!(notice = %notice.message, "User notification"),
        }
    }
}

/// Forwards notices over a channel so a UI loop (or a test) can drain them.
pub struct ChannelNotifier {
    tx: mpsc::Sender<Notice>,
}

impl ChannelNotifier {
    pub fn new() -> (Self, mpsc::Receiver<Notice>) {
        let (tx, rx) = mpsc::channel();
        (Self { tx }, rx)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, notice: Notice) {
        if self.tx.send(notice).is_err() {
            debug!("Notice receiver dropped, discarding notice");
        }
    }
}
