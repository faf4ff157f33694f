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

//! Micro service bootstrap wiring.
//!
//! Layout: `bootstrap.rs` (environment loading and service wiring),
//! `lifecycle.rs` (termination signals), `cli.rs` (the `micro` command).

/// Application bootstrap and environment loading.
pub mod bootstrap;
/// Command-line surface over the settings store.
pub mod cli;
/// Application error types.
pub mod error;
/// Termination signal handling.
pub mod lifecycle;

pub use bootstrap::{AppContext, BootstrapDependencies, bootstrap, bootstrap_with};
pub use error::{AppError, AppResult};
pub use lifecycle::{Termination, install_signal_handlers, wait_for_termination};
