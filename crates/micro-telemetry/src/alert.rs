//! Remote alerting for error-level events.
//!
//! # Design
//! - Only `ERROR` events are forwarded; that is the highest tracing level.
//! - Delivery is synchronous with the emitting call site and is never retried.
//! - Delivery failures are reported locally and never reach the caller.
//! - A thread-local guard keeps alert delivery from alerting about itself.

use std::cell::Cell;
use std::fmt::{self, Write as _};

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber, debug, warn};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;

use crate::error::Result;
use crate::notifier::{AlertMessage, Notifier};
use crate::slack::SlackNotifier;

/// Environment variable holding the Slack bot token.
pub const SLACK_BOT_TOKEN_ENV: &str = "SLACK_BOT_TOKEN";
/// Environment variable holding the target channel.
pub const SLACK_CHANNEL_ENV: &str = "SLACK_CHANNEL";
/// Environment variable holding the display name for posted alerts.
pub const SLACK_USERNAME_ENV: &str = "SLACK_USERNAME";

thread_local! {
    static SUPPRESSED: Cell<bool> = const { Cell::new(false) };
}

/// Mark the current thread as a delivery thread; its events are never forwarded.
pub(crate) fn suppress_alerts_on_current_thread() {
    SUPPRESSED.with(|flag| flag.set(true));
}

struct SuppressGuard {
    previous: bool,
}

impl SuppressGuard {
    fn enter() -> Self {
        let previous = SUPPRESSED.with(|flag| flag.replace(true));
        Self { previous }
    }
}

impl Drop for SuppressGuard {
    fn drop(&mut self) {
        SUPPRESSED.with(|flag| flag.set(self.previous));
    }
}

/// Credentials required to attach the alert layer.
#[derive(Clone, PartialEq, Eq)]
pub struct AlertSettings {
    /// Bot token used to authenticate with the chat API.
    pub token: String,
    /// Channel alerts are posted to.
    pub channel: String,
    /// Display name alerts are posted under.
    pub username: String,
}

impl AlertSettings {
    /// Collect credentials through `lookup`.
    ///
    /// Returns `None` unless all three values are present and non-empty, so
    /// services without alerting credentials still start.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Option<Self> {
        let read = |key: &str| lookup(key).filter(|value| !value.is_empty());
        Some(Self {
            token: read(SLACK_BOT_TOKEN_ENV)?,
            channel: read(SLACK_CHANNEL_ENV)?,
            username: read(SLACK_USERNAME_ENV)?,
        })
    }

    /// Collect credentials from the process environment.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }
}

impl fmt::Debug for AlertSettings {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("AlertSettings")
            .field("token", &"<redacted>")
            .field("channel", &self.channel)
            .field("username", &self.username)
            .finish()
    }
}

/// `tracing` layer that forwards error events to a [`Notifier`].
pub struct AlertLayer<N> {
    notifier: N,
    channel: String,
    username: String,
}

impl<N: Notifier> AlertLayer<N> {
    /// Build a layer posting to `channel` as `username`.
    pub fn new(notifier: N, channel: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            notifier,
            channel: channel.into(),
            username: username.into(),
        }
    }

    /// Access the underlying notifier.
    pub const fn notifier(&self) -> &N {
        &self.notifier
    }

    fn forward(&self, text: &str) {
        let outcome = {
            let _guard = SuppressGuard::enter();
            self.notifier.post_message(&AlertMessage {
                channel: &self.channel,
                username: &self.username,
                text,
            })
        };

        match outcome {
            Ok(delivery) => debug!(
                channel = ?delivery.channel,
                ts = ?delivery.ts,
                "alert delivered"
            ),
            Err(err) => warn!(error = %err, "alert delivery failed"),
        }
    }
}

impl AlertLayer<SlackNotifier> {
    /// Build a Slack-backed layer from collected credentials.
    ///
    /// # Errors
    ///
    /// Returns an error if the Slack delivery thread cannot be started.
    pub fn slack(settings: &AlertSettings) -> Result<Self> {
        let notifier = SlackNotifier::new(&settings.token)?;
        Ok(Self::new(
            notifier,
            settings.channel.clone(),
            settings.username.clone(),
        ))
    }
}

impl<S, N> Layer<S> for AlertLayer<N>
where
    S: Subscriber,
    N: Notifier,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() != Level::ERROR {
            return;
        }
        if SUPPRESSED.with(Cell::get) {
            return;
        }
        self.forward(&render_event(event));
    }
}

/// Render an event as its message followed by `key=value` fields.
#[must_use]
pub fn render_event(event: &Event<'_>) -> String {
    let mut visitor = AlertText::default();
    event.record(&mut visitor);
    visitor.finish()
}

#[derive(Default)]
struct AlertText {
    message: String,
    fields: String,
}

impl AlertText {
    fn finish(self) -> String {
        if self.message.is_empty() {
            self.fields.trim_start().to_string()
        } else {
            self.message + &self.fields
        }
    }
}

impl Visit for AlertText {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            let _ = write!(self.fields, " {}={value}", field.name());
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{value:?}");
        } else {
            let _ = write!(self.fields, " {}={value:?}", field.name());
        }
    }
}
