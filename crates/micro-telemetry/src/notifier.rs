//! Delivery contract between the alert layer and a remote chat channel.

use std::error::Error;
use std::fmt::{self, Display, Formatter};

/// A rendered alert addressed to a channel under a display name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertMessage<'a> {
    /// Target channel identifier.
    pub channel: &'a str,
    /// Display name the message is posted under.
    pub username: &'a str,
    /// Rendered log record.
    pub text: &'a str,
}

/// Acknowledgement returned by the remote API after a successful post.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Delivery {
    /// Channel the message landed in, as reported by the remote side.
    pub channel: Option<String>,
    /// Remote message timestamp/identifier.
    pub ts: Option<String>,
}

/// Blocking transport used by [`crate::AlertLayer`].
///
/// Implementations must not panic; every failure is returned so the caller
/// can contain it.
pub trait Notifier: Send + Sync + 'static {
    /// Post a message, blocking until the remote side answers.
    ///
    /// # Errors
    ///
    /// Returns an error when the transport fails or the remote API rejects
    /// the call.
    fn post_message(&self, message: &AlertMessage<'_>) -> Result<Delivery, NotifyError>;
}

/// Failure to deliver a single alert.
#[derive(Debug)]
pub enum NotifyError {
    /// The HTTP exchange failed.
    Transport {
        /// Underlying HTTP client error.
        source: reqwest::Error,
    },
    /// The remote API answered but rejected the call.
    Api {
        /// Error code reported by the API (for example `channel_not_found`).
        error: String,
    },
    /// The delivery worker is gone.
    Disconnected,
}

impl Display for NotifyError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport { .. } => formatter.write_str("alert transport failed"),
            Self::Api { error } => write!(formatter, "alert rejected by remote api: {error}"),
            Self::Disconnected => formatter.write_str("alert delivery worker disconnected"),
        }
    }
}

impl Error for NotifyError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Transport { source } => Some(source),
            Self::Api { .. } | Self::Disconnected => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notify_error_display_includes_api_code() {
        let api = NotifyError::Api {
            error: "channel_not_found".to_string(),
        };
        assert_eq!(
            api.to_string(),
            "alert rejected by remote api: channel_not_found"
        );
        assert!(api.source().is_none());
        assert_eq!(
            NotifyError::Disconnected.to_string(),
            "alert delivery worker disconnected"
        );
    }
}
