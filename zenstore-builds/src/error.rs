//! Errors produced while building and instantiating config nodes.

use thiserror::Error;

/// Result alias for node operations.
pub type BuildsResult<T> = Result<T, BuildsError>;

/// Errors produced by [`crate::builds`] and instantiation.
#[derive(Debug, Error)]
pub enum BuildsError {
    /// Keyword arguments that the target does not accept.
    #[error("unexpected keyword argument(s) for `{target}`: {}", .names.join(", "))]
    UnknownArgument {
        /// Path of the target.
        target: String,
        /// Offending names, sorted.
        names: Vec<String>,
    },

    /// A field name reserved for config bookkeeping was used.
    #[error("the field name `{name}` is reserved")]
    ReservedField {
        /// The reserved name.
        name: String,
    },

    /// A meta field shadows one of the target's parameters.
    #[error("meta field `{name}` collides with a parameter of `{target}`")]
    MetaCollision {
        /// Path of the target.
        target: String,
        /// Name shared by the meta field and the parameter.
        name: String,
    },

    /// A required parameter was bound neither by the node nor the caller.
    #[error("`{target}` is missing required argument `{name}`")]
    MissingArgument {
        /// Path of the target.
        target: String,
        /// Name of the unbound parameter.
        name: String,
    },

    /// An argument value could not be converted to the parameter's type.
    #[error("invalid value for argument `{name}`: {reason}")]
    InvalidArgument {
        /// Name of the parameter.
        name: String,
        /// Conversion failure.
        reason: String,
    },

    /// A partial node was instantiated where a value was expected.
    #[error("config for `{target}` is partial; call the returned partial instead")]
    PartialInstance {
        /// Path of the target.
        target: String,
    },

    /// A partial was requested from a node that is not partial.
    #[error("config node is not partial")]
    NotPartial,

    /// The target itself failed.
    #[error("target execution failed: {reason}")]
    Execution {
        /// Human-readable error returned by the target.
        reason: String,
    },
}

impl BuildsError {
    /// Creates an execution error from the supplied reason.
    #[must_use]
    pub fn execution(reason: impl Into<String>) -> Self {
        Self::Execution {
            reason: reason.into(),
        }
    }
}
