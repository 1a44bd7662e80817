//! Config node identifier types.

use std::fmt::{self, Display, Formatter};

use uuid::Uuid;

/// Unique identifier assigned to a config node when it is built.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct NodeId(Uuid);

impl NodeId {
    /// Generates a random node identifier.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}
