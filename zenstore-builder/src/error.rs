//! Errors raised while building or finalizing a registration.

use thiserror::Error;
use zenstore_builds::BuildsError;
use zenstore_repository::RepositoryError;

/// Result alias for builder operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors produced by [`crate::StoreBuilder`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// A placement field or build option had the wrong type.
    ///
    /// Raised by the call that supplied the value, before any target is
    /// involved.
    #[error("`{field}` must be {expected}, got: {found}")]
    InvalidFieldType {
        /// Name of the offending field.
        field: &'static str,
        /// What the field accepts.
        expected: &'static str,
        /// JSON rendering of the rejected value.
        found: String,
    },

    /// The node builder rejected the target's arguments.
    #[error(transparent)]
    Builds(#[from] BuildsError),

    /// The repository refused the publication.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
