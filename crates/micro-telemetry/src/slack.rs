//! Slack Web API transport for alerts.
//!
//! # Design
//! - The blocking `reqwest` client lives on its own thread, so posting works
//!   the same from inside or outside a tokio runtime.
//! - Callers still block until the thread answers; no queueing, no retry.
//! - Events emitted on the delivery thread never re-enter the alert layer.

use std::fmt;
use std::io;
use std::sync::mpsc::{self, Sender, SyncSender};
use std::thread;
use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::alert::suppress_alerts_on_current_thread;
use crate::error::{Result, TelemetryError};
use crate::notifier::{AlertMessage, Delivery, Notifier, NotifyError};

/// Public Slack Web API host.
pub const DEFAULT_API_BASE: &str = "https://slack.com";

const POST_MESSAGE_PATH: &str = "/api/chat.postMessage";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const DELIVERY_THREAD_NAME: &str = "slack-notifier";

/// Posts alerts with `chat.postMessage` using a bot token.
pub struct SlackNotifier {
    jobs: Sender<DeliveryJob>,
    endpoint: String,
}

struct DeliveryJob {
    payload: PostMessage,
    reply: SyncSender<std::result::Result<Delivery, NotifyError>>,
}

#[derive(Debug, Serialize)]
struct PostMessage {
    channel: String,
    username: String,
    text: String,
}

#[derive(Debug, Deserialize)]
struct PostMessageResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    channel: Option<String>,
    #[serde(default)]
    ts: Option<String>,
}

impl SlackNotifier {
    /// Connect to the public Slack API.
    ///
    /// # Errors
    ///
    /// Returns an error if the delivery thread or its HTTP client cannot be
    /// started.
    pub fn new(token: &str) -> Result<Self> {
        Self::with_api_base(token, DEFAULT_API_BASE)
    }

    /// Connect to a Slack-compatible API rooted at `api_base`.
    ///
    /// # Errors
    ///
    /// Returns an error if the delivery thread or its HTTP client cannot be
    /// started.
    pub fn with_api_base(token: &str, api_base: &str) -> Result<Self> {
        let endpoint = format!("{}{POST_MESSAGE_PATH}", api_base.trim_end_matches('/'));
        let (jobs, queue) = mpsc::channel::<DeliveryJob>();
        let (ready_tx, ready_rx) = mpsc::sync_channel(1);

        let worker_endpoint = endpoint.clone();
        let token = token.to_string();
        thread::Builder::new()
            .name(DELIVERY_THREAD_NAME.to_string())
            .spawn(move || {
                suppress_alerts_on_current_thread();
                let client = match Client::builder().timeout(REQUEST_TIMEOUT).build() {
                    Ok(client) => {
                        let _ = ready_tx.send(Ok(()));
                        client
                    }
                    Err(source) => {
                        let _ = ready_tx.send(Err(source));
                        return;
                    }
                };
                for job in queue {
                    let result = deliver(&client, &worker_endpoint, &token, &job.payload);
                    let _ = job.reply.send(result);
                }
            })
            .map_err(|source| TelemetryError::DeliveryThread { source })?;

        ready_rx
            .recv()
            .map_err(|_| TelemetryError::DeliveryThread {
                source: io::Error::other("delivery thread exited during startup"),
            })?
            .map_err(|source| TelemetryError::ClientBuild { source })?;

        Ok(Self { jobs, endpoint })
    }

    /// Full URL messages are posted to.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl fmt::Debug for SlackNotifier {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("SlackNotifier")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl Notifier for SlackNotifier {
    fn post_message(&self, message: &AlertMessage<'_>) -> std::result::Result<Delivery, NotifyError> {
        let (reply, response) = mpsc::sync_channel(1);
        let job = DeliveryJob {
            payload: PostMessage {
                channel: message.channel.to_string(),
                username: message.username.to_string(),
                text: message.text.to_string(),
            },
            reply,
        };
        self.jobs.send(job).map_err(|_| NotifyError::Disconnected)?;
        response.recv().map_err(|_| NotifyError::Disconnected)?
    }
}

fn deliver(
    client: &Client,
    endpoint: &str,
    token: &str,
    payload: &PostMessage,
) -> std::result::Result<Delivery, NotifyError> {
    let response = client
        .post(endpoint)
        .bearer_auth(token)
        .json(payload)
        .send()
        .and_then(reqwest::blocking::Response::error_for_status)
        .map_err(|source| NotifyError::Transport { source })?;

    let body: PostMessageResponse = response
        .json()
        .map_err(|source| NotifyError::Transport { source })?;

    if body.ok {
        Ok(Delivery {
            channel: body.channel,
            ts: body.ts,
        })
    } else {
        Err(NotifyError::Api {
            error: body.error.unwrap_or_else(|| "unknown_error".to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn message() -> AlertMessage<'static> {
        AlertMessage {
            channel: "#alerts",
            username: "billing-service",
            text: "payment sync failed",
        }
    }

    #[test]
    fn posts_message_with_bearer_token() -> anyhow::Result<()> {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/api/chat.postMessage")
                .header("authorization", "Bearer xoxb-test")
                .json_body(json!({
                    "channel": "#alerts",
                    "username": "billing-service",
                    "text": "payment sync failed"
                }));
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({"ok": true, "channel": "C123", "ts": "1700000000.000100"}));
        });

        let notifier = SlackNotifier::with_api_base("xoxb-test", &server.base_url())?;
        let delivery = notifier.post_message(&message())?;

        mock.assert();
        assert_eq!(delivery.channel.as_deref(), Some("C123"));
        assert_eq!(delivery.ts.as_deref(), Some("1700000000.000100"));
        Ok(())
    }

    #[test]
    fn api_rejection_maps_to_api_error() -> anyhow::Result<()> {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/api/chat.postMessage");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({"ok": false, "error": "channel_not_found"}));
        });

        let notifier = SlackNotifier::with_api_base("xoxb-test", &server.base_url())?;
        let err = notifier
            .post_message(&message())
            .expect_err("rejected post should fail");
        assert!(matches!(err, NotifyError::Api { ref error } if error == "channel_not_found"));
        Ok(())
    }

    #[test]
    fn http_failure_maps_to_transport_error() -> anyhow::Result<()> {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/api/chat.postMessage");
            then.status(503);
        });

        let notifier = SlackNotifier::with_api_base("xoxb-test", &server.base_url())?;
        let err = notifier
            .post_message(&message())
            .expect_err("5xx should fail");
        assert!(matches!(err, NotifyError::Transport { .. }));
        Ok(())
    }

    #[test]
    fn endpoint_joins_base_without_double_slash() -> anyhow::Result<()> {
        let notifier = SlackNotifier::with_api_base("xoxb-test", "http://127.0.0.1:9/")?;
        assert_eq!(notifier.endpoint(), "http://127.0.0.1:9/api/chat.postMessage");
        Ok(())
    }
}
