//! Shared error definitions for zenstore primitives.

use thiserror::Error;

/// Result alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while manipulating primitive types.
#[derive(Debug, Error)]
pub enum Error {
    /// A keyword map was built from a JSON value that is not an object.
    #[error("keyword fields must be a JSON object, got: {found}")]
    NotAnObject {
        /// Rendering of the rejected value.
        found: String,
    },
}
