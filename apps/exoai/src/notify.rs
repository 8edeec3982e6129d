//! # Fallback Notifications
//!
//! Side channel the degradation policy uses to tell the user that data is
//! substituted. Notifications never block and never fail; a notifier that
//! cannot deliver simply drops the notice.

use exoai_core::primitives::OFFLINE_NOTICE;
use tokio::sync::mpsc;

/// One fallback event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Operation that fell back (`"predict"`, `"dataset"`, ...).
    pub operation: &'static str,
    /// User-facing text.
    pub message: String,
    /// Transport failure that triggered the fallback.
    pub cause: String,
}

impl Notice {
    /// The standard "backend offline" notice.
    pub fn offline(operation: &'static str, cause: impl ToString) -> Self {
        Self {
            operation,
            message: OFFLINE_NOTICE.to_string(),
            cause: cause.to_string(),
        }
    }
}

/// Receiver of fallback notices.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: &Notice);
}

/// Emits notices as `tracing` warnings.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notice: &Notice) {
        tracing::warn!(
            operation = notice.operation,
            cause = %notice.cause,
            "{}",
            notice.message
        );
    }
}

/// Prints notices to stderr, for interactive CLI use.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: &Notice) {
        eprintln!("! {} ({})", notice.message, notice.operation);
    }
}

/// Forwards notices into a channel for a UI event loop to drain.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<Notice>,
}

impl ChannelNotifier {
    /// Create a notifier and the receiving end of its channel.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notice>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, notice: &Notice) {
        // Receiver gone means nobody is listening any more.
        let _ = self.tx.send(notice.clone());
    }
}
