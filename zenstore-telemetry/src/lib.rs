//! Observability utilities for zenstore.
//!
//! Every zenstore crate reports through `tracing`; this crate installs the
//! subscriber that turns those events into log lines.

#![warn(missing_docs, clippy::pedantic)]

pub mod tracing_support;

pub use tracing_support::{DEFAULT_FILTER, init, init_from_config, resolve_filter};
