//! Core shared types for zenstore registrations.

#![warn(missing_docs, clippy::pedantic)]

mod error;
mod fields;
mod ids;

/// Error type and result alias shared across the workspace.
pub use error::{Error, Result};
/// Keyword-argument map with last-wins merging.
pub use fields::Fields;
/// Unique identifier for a published config node.
pub use ids::NodeId;

#[doc(hidden)]
pub use serde_json as __serde_json;

/// Builds a [`Fields`] map from `key: value` pairs.
///
/// Values are converted with [`serde_json::json!`], so any literal or
/// serialisable expression is accepted.
///
/// ```
/// use zenstore_primitives::fields;
///
/// let fields = fields! { a: 1, name: "dunk" };
/// assert_eq!(fields.len(), 2);
/// ```
#[macro_export]
macro_rules! fields {
    () => {
        $crate::Fields::new()
    };
    ($($key:ident : $value:expr),+ $(,)?) => {{
        let mut fields = $crate::Fields::new();
        $(
            fields.insert(stringify!($key), $crate::__serde_json::json!($value));
        )+
        fields
    }};
}
