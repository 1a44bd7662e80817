//! Strongly typed configuration schema.

use serde::{Deserialize, Serialize};

use crate::{ConfigError, ConfigResult};

/// Splits a `/`-separated group path into its segments.
///
/// The empty path is the root group and has no segments.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidGroupPath`] when any segment is empty, as in
/// `"a/"`, `"/a"` or `"a//b"`.
pub fn group_segments(group: &str) -> ConfigResult<Vec<&str>> {
    if group.is_empty() {
        return Ok(Vec::new());
    }
    let segments: Vec<&str> = group.split('/').collect();
    if segments.iter().any(|segment| segment.is_empty()) {
        return Err(ConfigError::InvalidGroupPath {
            group: group.to_owned(),
        });
    }
    Ok(segments)
}

/// Settings shared by a repository and every builder publishing into it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// Group used when a registration or lookup names none. Empty is the root.
    ///
    /// Explicit `group` fields must be non-empty, so the root group only
    /// receives registrations while this is empty. Lookups can always read
    /// the root with `Some("")`.
    pub default_group: String,
    /// Whether nodes record every defaulted parameter of their target unless
    /// a registration says otherwise.
    pub populate_full_signature: bool,
    /// Tracing filter directive used when neither the caller nor `RUST_LOG`
    /// supplies one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_filter: Option<String>,
}

impl StoreConfig {
    /// Creates the default configuration (root group, sparse nodes).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the default group.
    #[must_use]
    pub fn with_default_group(mut self, group: impl Into<String>) -> Self {
        self.default_group = group.into();
        self
    }

    /// Sets the default for `populate_full_signature`.
    #[must_use]
    pub fn with_populate_full_signature(mut self, enabled: bool) -> Self {
        self.populate_full_signature = enabled;
        self
    }

    /// Checks that [`StoreConfig::default_group`] is a usable group path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidGroupPath`] for malformed paths.
    pub fn validate(&self) -> ConfigResult<()> {
        group_segments(&self.default_group).map(|_| ())
    }

    /// Sets the fallback tracing filter.
    #[must_use]
    pub fn with_log_filter(mut self, filter: impl Into<String>) -> Self {
        self.log_filter = Some(filter.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_root_group() {
        let config = StoreConfig::new();
        assert_eq!(config.default_group, "");
        assert!(!config.populate_full_signature);
        assert!(config.log_filter.is_none());
    }

    #[test]
    fn missing_keys_use_defaults() {
        let config: StoreConfig =
            serde_json::from_str(r#"{ "default_group": "models" }"#).expect("parse");
        assert_eq!(config, StoreConfig::new().with_default_group("models"));
    }

    #[test]
    fn splits_group_paths() {
        assert!(group_segments("").expect("root").is_empty());
        assert_eq!(group_segments("a/b").expect("nested"), ["a", "b"]);
        for malformed in ["a/", "/a", "a//b", "/x//"] {
            let err = group_segments(malformed).expect_err("malformed");
            assert!(matches!(err, ConfigError::InvalidGroupPath { group } if group == malformed));
        }
    }

    #[test]
    fn validate_checks_default_group() {
        assert!(StoreConfig::new().with_default_group("models/vision").validate().is_ok());
        assert!(StoreConfig::new().with_default_group("a/").validate().is_err());
    }
}
