//! Hierarchical storage for published config nodes.
//!
//! Entries are keyed by a `/`-separated group path and a name. Publication
//! never overwrites: a second node under an existing key is rejected and the
//! stored entry is left as it was.

#![warn(missing_docs, clippy::pedantic)]

pub mod repository;

pub use repository::{Repository, RepositoryEntry, RepositoryError, RepositoryResult};
pub use zenstore_config::StoreConfig;
