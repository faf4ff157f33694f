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
    clippy::cargo,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! `micro` binary: bootstraps logging, signals and the settings store, then
//! runs one command.

use clap::Parser;
use micro_app::cli::Cli;
use micro_app::{AppResult, bootstrap};

/// Parses arguments, bootstraps, and runs the selected command.
#[tokio::main(flavor = "current_thread")]
async fn main() -> AppResult<()> {
    let cli = Cli::parse();
    let context = bootstrap().await?;
    cli.run(context).await
}
