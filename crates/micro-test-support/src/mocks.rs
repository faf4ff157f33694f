//! Fake notifiers for alerting tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use micro_telemetry::{AlertMessage, Delivery, Notifier, NotifyError};

/// An alert captured by [`RecordingNotifier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedAlert {
    /// Target channel.
    pub channel: String,
    /// Display name.
    pub username: String,
    /// Rendered text.
    pub text: String,
}

/// Notifier that accepts every message and keeps a copy.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    alerts: Arc<Mutex<Vec<RecordedAlert>>>,
}

impl RecordingNotifier {
    /// Alerts posted so far, oldest first.
    #[must_use]
    pub fn alerts(&self) -> Vec<RecordedAlert> {
        self.alerts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Notifier for RecordingNotifier {
    fn post_message(&self, message: &AlertMessage<'_>) -> Result<Delivery, NotifyError> {
        self.alerts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(RecordedAlert {
                channel: message.channel.to_string(),
                username: message.username.to_string(),
                text: message.text.to_string(),
            });
        Ok(Delivery {
            channel: Some(message.channel.to_string()),
            ts: Some("0.000001".to_string()),
        })
    }
}

/// Notifier whose remote side rejects every call.
#[derive(Debug, Clone, Default)]
pub struct FailingNotifier {
    attempts: Arc<AtomicUsize>,
}

impl FailingNotifier {
    /// Number of delivery attempts made.
    #[must_use]
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl Notifier for FailingNotifier {
    fn post_message(&self, _message: &AlertMessage<'_>) -> Result<Delivery, NotifyError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(NotifyError::Api {
            error: "invalid_auth".to_string(),
        })
    }
}
