//! HTTP plumbing and vendor clients for web backends
//!
//! This crate is the **Imperative Shell** of the webhelpers workspace. Pure
//! helpers (tag inspection, ORDER BY, pagination, response parsing, URL signing)
//! live in [`webhelpers_core`] and are re-exported as [`pure`].
//!
//! - [`request`]: one-shot HTTP exchange with optional JSON decoding
//! - [`mock`]: in-process HTTP server with a single canned route, for tests
//! - [`cloudstorage`]: object upload/delete ([`cloudstorage::gcs::GcsClient`])
//! - [`imagecompressor`]: Kraken, reSmush and Tinify clients
//! - [`diskstorage`]: in-memory buffer, file writes and downloads
//!
//! Clients are configured with an ordered list of options applied over
//! built-in defaults (see [`option`]). Once built, a client never changes and
//! can be shared between tasks.
//!
//! Errors are split in two categories callers branch on: [`ErrorKind::Internal`]
//! for local configuration or marshaling faults, and [`ErrorKind::External`]
//! when the remote service explicitly rejected the request. Transport errors
//! are surfaced unwrapped.

pub use webhelpers_core as pure;

pub mod cloudstorage;
pub mod diskstorage;
mod error;
pub mod imagecompressor;
pub mod mock;
pub mod option;
mod prelude;
pub mod request;

pub use error::{Error, ErrorKind, Result};

#[cfg(test)]
pub(crate) fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}
