//! Repository of config nodes keyed by group and name.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};
use zenstore_builds::ConfigNode;
use zenstore_config::{StoreConfig, group_segments};

/// Result alias for repository operations.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// A published node together with the key it lives under.
#[derive(Clone, Debug)]
pub struct RepositoryEntry {
    group: String,
    name: String,
    node: Arc<ConfigNode>,
}

impl RepositoryEntry {
    /// Returns the group path; empty for the root group.
    #[must_use]
    pub fn group(&self) -> &str {
        &self.group
    }

    /// Returns the entry name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the stored node.
    #[must_use]
    pub fn node(&self) -> &ConfigNode {
        &self.node
    }

    /// Returns the package label attached to the node.
    #[must_use]
    pub fn package(&self) -> Option<&str> {
        self.node.package()
    }
}

#[derive(Default)]
struct GroupNode {
    groups: BTreeMap<String, GroupNode>,
    entries: BTreeMap<String, RepositoryEntry>,
}

impl GroupNode {
    fn find(&self, segments: &[&str]) -> Option<&GroupNode> {
        segments
            .iter()
            .try_fold(self, |group, segment| group.groups.get(*segment))
    }

    fn len(&self) -> usize {
        self.entries.len() + self.groups.values().map(GroupNode::len).sum::<usize>()
    }

    fn collect_keys(&self, keys: &mut Vec<String>) {
        keys.extend(self.entries.values().map(|entry| display_key(&entry.group, &entry.name)));
        for group in self.groups.values() {
            group.collect_keys(keys);
        }
    }
}

/// Hierarchical map from `(group, name)` to published config nodes.
///
/// The repository is shared by reference: publication goes through `&self`
/// and is backed by a `RefCell`, so a repository cannot cross threads.
#[derive(Default)]
pub struct Repository {
    config: StoreConfig,
    root: RefCell<GroupNode>,
}

impl fmt::Debug for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys = Vec::new();
        self.root.borrow().collect_keys(&mut keys);
        f.debug_struct("Repository")
            .field("default_group", &self.config.default_group)
            .field("registered", &keys)
            .finish()
    }
}

impl Repository {
    /// Creates an empty repository with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty repository using `config`.
    #[must_use]
    pub fn with_config(config: StoreConfig) -> Self {
        Self {
            config,
            root: RefCell::default(),
        }
    }

    /// Returns the configuration the repository was created with.
    #[must_use]
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Returns the group used when none is given.
    #[must_use]
    pub fn default_group(&self) -> &str {
        &self.config.default_group
    }

    /// Publishes `node` under `(group, name)`.
    ///
    /// Missing intermediate groups are created. Nothing is stored when the
    /// call fails.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::InvalidKey`] for malformed keys and
    /// [`RepositoryError::KeyCollision`] when the key is already taken.
    pub fn insert(&self, group: &str, name: &str, node: ConfigNode) -> RepositoryResult<RepositoryEntry> {
        validate_name(name)?;
        let segments = split_group(group)?;

        let mut root = self.root.borrow_mut();
        let parent = segments
            .iter()
            .fold(&mut *root, |parent, segment| {
                parent.groups.entry((*segment).to_owned()).or_default()
            });

        if let Some(existing) = parent.entries.get(name) {
            warn!(
                group,
                name,
                existing = %existing.node.id(),
                "refusing to overwrite published config"
            );
            return Err(RepositoryError::KeyCollision {
                group: group.to_owned(),
                name: name.to_owned(),
            });
        }

        let entry = RepositoryEntry {
            group: group.to_owned(),
            name: name.to_owned(),
            node: Arc::new(node),
        };
        parent.entries.insert(name.to_owned(), entry.clone());
        info!(
            group,
            name,
            node_id = %entry.node.id(),
            package = entry.package().unwrap_or_default(),
            "published config"
        );
        Ok(entry)
    }

    /// Looks up the entry stored under `(group, name)`.
    ///
    /// `None` selects the default group.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::NotFound`] when no entry exists and
    /// [`RepositoryError::InvalidKey`] for a malformed group path.
    pub fn get(&self, group: Option<&str>, name: &str) -> RepositoryResult<RepositoryEntry> {
        let group = group.unwrap_or(self.default_group());
        let segments = split_group(group)?;
        let root = self.root.borrow();
        root.find(&segments)
            .and_then(|parent| parent.entries.get(name))
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound {
                group: group.to_owned(),
                name: name.to_owned(),
            })
    }

    /// Returns `true` when `(group, name)` holds an entry.
    #[must_use]
    pub fn contains(&self, group: Option<&str>, name: &str) -> bool {
        self.get(group, name).is_ok()
    }

    /// Lists the entry names directly inside `group`, sorted.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::GroupNotFound`] when the group does not exist.
    pub fn names(&self, group: Option<&str>) -> RepositoryResult<Vec<String>> {
        self.with_group(group, |node| node.entries.keys().cloned().collect())
    }

    /// Lists the child groups of `group`, sorted.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::GroupNotFound`] when the group does not exist.
    pub fn groups(&self, group: Option<&str>) -> RepositoryResult<Vec<String>> {
        self.with_group(group, |node| node.groups.keys().cloned().collect())
    }

    /// Total number of entries across all groups.
    #[must_use]
    pub fn len(&self) -> usize {
        self.root.borrow().len()
    }

    /// Returns `true` when nothing has been published.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes every entry and group.
    pub fn clear(&self) {
        *self.root.borrow_mut() = GroupNode::default();
        info!("repository cleared");
    }

    fn with_group<T>(
        &self,
        group: Option<&str>,
        read: impl FnOnce(&GroupNode) -> T,
    ) -> RepositoryResult<T> {
        let group = group.unwrap_or(self.default_group());
        let segments = split_group(group)?;
        let root = self.root.borrow();
        root.find(&segments)
            .map(read)
            .ok_or_else(|| RepositoryError::GroupNotFound {
                group: group.to_owned(),
            })
    }
}

fn split_group(group: &str) -> RepositoryResult<Vec<&str>> {
    group_segments(group).map_err(|_| RepositoryError::InvalidKey {
        key: group.to_owned(),
        reason: "group path segments cannot be empty".into(),
    })
}

fn validate_name(name: &str) -> RepositoryResult<()> {
    if name.is_empty() {
        return Err(RepositoryError::InvalidKey {
            key: String::new(),
            reason: "name cannot be empty".into(),
        });
    }
    if name.contains('/') {
        return Err(RepositoryError::InvalidKey {
            key: name.to_owned(),
            reason: "name cannot contain `/`; use the group to nest entries".into(),
        });
    }
    Ok(())
}

fn display_key(group: &str, name: &str) -> String {
    if group.is_empty() {
        name.to_owned()
    } else {
        format!("{group}/{name}")
    }
}

/// Errors produced by repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// An entry already exists under the key.
    #[error("config `{}` is already registered", display_key(.group, .name))]
    KeyCollision {
        /// Group path of the key.
        group: String,
        /// Entry name of the key.
        name: String,
    },

    /// No entry exists under the key.
    #[error("config `{}` is not registered", display_key(.group, .name))]
    NotFound {
        /// Group path of the key.
        group: String,
        /// Entry name of the key.
        name: String,
    },

    /// The group does not exist.
    #[error("group `{group}` does not exist")]
    GroupNotFound {
        /// Requested group path.
        group: String,
    },

    /// A group path or name is malformed.
    #[error("invalid repository key `{key}`: {reason}")]
    InvalidKey {
        /// The offending key.
        key: String,
        /// Human-readable reason for rejection.
        reason: String,
    },
}
