//! Deferred registration of structured-config targets.
//!
//! This crate bundles the zenstore crates behind feature flags. Targets
//! generated with `#[target]` name `::zenstore_builds` by default; when only
//! this facade is a dependency, point the macro at the re-export instead:
//! `#[target(crate = "zenstore::builds")]`.

#![warn(missing_docs, clippy::pedantic)]

/// Re-export shared primitives for convenience.
pub use zenstore_primitives as primitives;

/// Targets, signatures and config nodes (enabled by `builds` feature).
#[cfg(feature = "builds")]
pub use zenstore_builds as builds;

/// The (group, name) repository (enabled by `repository` feature).
#[cfg(feature = "repository")]
pub use zenstore_repository as repository;

/// The curried store builder (enabled by `builder` feature).
#[cfg(feature = "builder")]
pub use zenstore_builder as builder;

/// Configuration management (enabled by `config` feature).
#[cfg(feature = "config")]
pub use zenstore_config as config;

/// Tracing subscriber setup (enabled by `telemetry` feature).
#[cfg(feature = "telemetry")]
pub use zenstore_telemetry as telemetry;

/// The items most registrations need.
#[cfg(feature = "builder")]
pub mod prelude {
    pub use zenstore_builder::{StoreBuilder, StoreError, store, store_target};
    pub use zenstore_builds::{ConfigNode, Fields, FnTarget, Instance, Target, fields, target};
    pub use zenstore_repository::Repository;
}
