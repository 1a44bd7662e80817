//! Config node construction and instantiation.
//!
//! A [`Target`] is anything that can be called with keyword arguments and
//! declares its name and [`Signature`]. [`builds`] pairs a target with
//! argument overrides into an immutable [`ConfigNode`], rejecting arguments
//! the target does not accept. [`ConfigNode::instantiate`] later layers more
//! overrides on top and performs the call.
//!
//! Ordinary functions become targets through the [`target`] attribute:
//!
//! ```
//! use std::sync::Arc;
//!
//! use zenstore_builds::{BuildOptions, builds, fields, target};
//!
//! #[target]
//! fn pair(a: i64, b: i64) -> (i64, i64) {
//!     (a, b)
//! }
//!
//! let node = builds(Arc::new(pair_target()), fields! { a: 1 }, &BuildOptions::new()).unwrap();
//! let value = node.instantiate(&fields! { b: 2 }).unwrap().into_value().unwrap();
//! assert_eq!(value, serde_json::json!([1, 2]));
//! ```

#![warn(missing_docs, clippy::pedantic)]

extern crate self as zenstore_builds;

mod error;
mod node;
mod target;

pub use error::{BuildsError, BuildsResult};
pub use node::{BuildOptions, ConfigNode, Instance, PartialCall, builds, is_reserved};
pub use target::{FnTarget, Parameter, Signature, Target};
/// Derives a [`FnTarget`] constructor for a plain function.
pub use zenstore_macros::target;
pub use zenstore_primitives::{Fields, NodeId, fields};

#[doc(hidden)]
pub mod __private {
    //! Support code for the `#[target]` expansion.

    pub use serde_json::Value;

    use serde::Serialize;
    use serde::de::DeserializeOwned;

    use crate::{BuildsError, BuildsResult, Fields};

    /// Removes `name` from the bound arguments and converts it to `T`.
    ///
    /// # Errors
    ///
    /// Returns [`BuildsError::InvalidArgument`] when the value does not
    /// deserialize into `T`.
    pub fn take_argument<T: DeserializeOwned>(arguments: &mut Fields, name: &str) -> BuildsResult<T> {
        let value = arguments.remove(name).unwrap_or(Value::Null);
        serde_json::from_value(value).map_err(|err| BuildsError::InvalidArgument {
            name: name.to_owned(),
            reason: err.to_string(),
        })
    }

    /// Converts a function's return value into JSON.
    ///
    /// # Errors
    ///
    /// Returns [`BuildsError::Execution`] when the value cannot be serialized.
    pub fn to_output<R: Serialize>(output: R) -> BuildsResult<Value> {
        serde_json::to_value(output).map_err(|err| BuildsError::execution(err.to_string()))
    }
}
