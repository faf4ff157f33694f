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

//! Typed get/set over the shared `config` table.
//!
//! Layout: `codec.rs` (string encodings for typed values), `error.rs`
//! (`ConfigError`), `service.rs` (`ConfigService`).

pub mod codec;
pub mod error;
pub mod service;

pub use codec::{SettingCodec, TIMESTAMP_FORMAT, Text, Timestamp, TimestampError};
pub use error::{ConfigError, ConfigResult};
pub use micro_data::DEFAULT_CONFIG_URL;
pub use service::{CONFIG_URL_ENV, ConfigService};
