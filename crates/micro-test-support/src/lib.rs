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

//! Shared test helpers used across integration suites.
//! Layout: fixtures.rs (temp stores, env lookups), postgres.rs (external
//! database opt-in), mocks.rs (fake notifiers), capture.rs (event recorder).

pub mod capture;
pub mod fixtures;
pub mod mocks;
pub mod postgres;
