//! Configuration management for zenstore repositories.
//!
//! [`StoreConfig`] controls where unplaced registrations land and how config
//! nodes are built by default. The [`loader`] module reads it from JSON and
//! layers environment overrides on top.

#![warn(missing_docs, clippy::pedantic)]

mod error;
pub mod loader;
pub mod schema;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ENV_DEFAULT_GROUP, ENV_LOG, ENV_POPULATE_FULL_SIGNATURE};
pub use schema::{StoreConfig, group_segments};
