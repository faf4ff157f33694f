#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! Telemetry primitives shared across micro services.
//!
//! This crate centralises logging setup and the remote alerting sink so every
//! service reports errors the same way.
//!
//! Layout: `init.rs` (subscriber installation), `alert.rs` (`AlertLayer`),
//! `notifier.rs` (delivery contract), `slack.rs` (Slack Web API transport).

pub mod alert;
pub mod error;
pub mod init;
pub mod notifier;
pub mod slack;

pub use alert::{AlertLayer, AlertSettings};
pub use error::{Result, TelemetryError};
pub use init::{LogFormat, LogLevel, LoggingConfig, init_logging, init_logging_with_alerts};
pub use notifier::{AlertMessage, Delivery, NotifyError, Notifier};
pub use slack::SlackNotifier;
