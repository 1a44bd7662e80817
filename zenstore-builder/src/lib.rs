//! Deferred registration of targets into a zenstore repository.
//!
//! A [`StoreBuilder`] accumulates keyword state across any number of
//! [`StoreBuilder::with_overrides`] calls. Each call returns a new builder,
//! so a partially configured builder can seed several registrations. The
//! keys `name`, `group` and `package` place the entry; `zen_partial`,
//! `populate_full_signature` and `zen_meta` shape the node; every other key
//! becomes an argument override. Later calls win per key.
//!
//! [`StoreBuilder::finalize`] supplies the target, builds its config node
//! and publishes it, returning the very `Arc` it was given.
//!
//! ```
//! use std::sync::Arc;
//!
//! use zenstore_builder::store;
//! use zenstore_builds::{fields, target};
//! use zenstore_repository::Repository;
//!
//! #[target]
//! fn func(a: i64, b: i64) -> (i64, i64) {
//!     (a, b)
//! }
//!
//! let repo = Repository::new();
//! let func = Arc::new(func_target());
//!
//! let out = store(&repo)
//!     .with_overrides(fields! { a: -22 })
//!     .and_then(|b| b.with_overrides(fields! { a: 1, b: -22 }))
//!     .and_then(|b| b.finalize(Arc::clone(&func), fields! { b: 2 }))
//!     .unwrap();
//!
//! assert!(Arc::ptr_eq(&out, &func));
//! assert_eq!(repo.get(None, "func").unwrap().node().arguments(), &fields! { a: 1, b: 2 });
//! ```

#![warn(missing_docs, clippy::pedantic)]

mod builder;
mod error;
mod pending;

pub use builder::{StoreBuilder, store, store_target};
pub use error::{StoreError, StoreResult};
pub use pending::{
    GROUP, NAME, PACKAGE, POPULATE_FULL_SIGNATURE, PendingRegistration, ZEN_META, ZEN_PARTIAL,
};
