//! Configuration loader implementations.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::{ConfigError, ConfigResult, StoreConfig};

/// Overrides [`StoreConfig::default_group`].
pub const ENV_DEFAULT_GROUP: &str = "ZENSTORE_DEFAULT_GROUP";
/// Overrides [`StoreConfig::populate_full_signature`]; accepts `true`/`false`/`1`/`0`.
pub const ENV_POPULATE_FULL_SIGNATURE: &str = "ZENSTORE_POPULATE_FULL_SIGNATURE";
/// Overrides [`StoreConfig::log_filter`].
pub const ENV_LOG: &str = "ZENSTORE_LOG";

/// Parses a configuration document.
///
/// # Errors
///
/// Returns [`ConfigError::Parse`] when the text is not valid JSON or contains
/// unknown keys, and [`ConfigError::InvalidGroupPath`] for a malformed
/// default group.
pub fn from_json_str(text: &str) -> ConfigResult<StoreConfig> {
    parse(text, "<string>")
}

/// Reads and parses a configuration file.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] when the file cannot be read, otherwise the
/// same errors as [`from_json_str`].
pub fn from_path(path: impl AsRef<Path>) -> ConfigResult<StoreConfig> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config = parse(&text, &path.display().to_string())?;
    debug!(path = %path.display(), "loaded zenstore configuration");
    Ok(config)
}

fn parse(text: &str, origin: &str) -> ConfigResult<StoreConfig> {
    let config: StoreConfig = serde_json::from_str(text).map_err(|source| ConfigError::Parse {
        origin: origin.to_owned(),
        source,
    })?;
    config.validate()?;
    Ok(config)
}

/// Layers environment overrides onto `config`.
///
/// Variables are resolved through `lookup` so callers decide where they come
/// from; [`from_env`] uses the process environment.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidBoolean`] when
/// [`ENV_POPULATE_FULL_SIGNATURE`] holds something other than a boolean, and
/// [`ConfigError::InvalidGroupPath`] when the resulting default group is
/// malformed.
pub fn apply_env<F>(mut config: StoreConfig, lookup: F) -> ConfigResult<StoreConfig>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(group) = lookup(ENV_DEFAULT_GROUP) {
        debug!(group = %group, "default group overridden from environment");
        config.default_group = group;
    }

    if let Some(raw) = lookup(ENV_POPULATE_FULL_SIGNATURE) {
        config.populate_full_signature =
            parse_bool(&raw).ok_or_else(|| ConfigError::InvalidBoolean {
                variable: ENV_POPULATE_FULL_SIGNATURE,
                value: raw.clone(),
            })?;
    }

    if let Some(filter) = lookup(ENV_LOG) {
        config.log_filter = Some(filter);
    }

    config.validate()?;
    Ok(config)
}

/// Layers the process environment onto `config`.
///
/// # Errors
///
/// See [`apply_env`].
pub fn from_env(config: StoreConfig) -> ConfigResult<StoreConfig> {
    apply_env(config, |key| std::env::var(key).ok())
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn parses_full_document() {
        let config = from_json_str(
            r#"{ "default_group": "models", "populate_full_signature": true, "log_filter": "debug" }"#,
        )
        .expect("parse");

        assert_eq!(config.default_group, "models");
        assert!(config.populate_full_signature);
        assert_eq!(config.log_filter.as_deref(), Some("debug"));
    }

    #[test]
    fn rejects_unknown_keys() {
        let err = from_json_str(r#"{ "overwrite": true }"#).expect_err("unknown key");
        assert!(err.to_string().contains("zenstore configuration"));
    }

    #[test]
    fn environment_overrides_file_values() {
        let base = StoreConfig::new().with_default_group("file");
        let config = apply_env(
            base,
            env(&[
                (ENV_DEFAULT_GROUP, "env"),
                (ENV_POPULATE_FULL_SIGNATURE, "on"),
                (ENV_LOG, "zenstore=trace"),
            ]),
        )
        .expect("apply");

        assert_eq!(config.default_group, "env");
        assert!(config.populate_full_signature);
        assert_eq!(config.log_filter.as_deref(), Some("zenstore=trace"));
    }

    #[test]
    fn absent_variables_leave_config_untouched() {
        let base = StoreConfig::new().with_default_group("file");
        let config = apply_env(base.clone(), env(&[])).expect("apply");
        assert_eq!(config, base);
    }

    #[test]
    fn malformed_boolean_is_rejected() {
        let err = apply_env(
            StoreConfig::new(),
            env(&[(ENV_POPULATE_FULL_SIGNATURE, "sometimes")]),
        )
        .expect_err("should fail");
        assert!(err.to_string().contains("expected a boolean"));
        assert!(matches!(err, ConfigError::InvalidBoolean { value, .. } if value == "sometimes"));
    }

    #[test]
    fn malformed_default_group_is_rejected_at_load() {
        let err = from_json_str(r#"{ "default_group": "a/" }"#).expect_err("file group");
        assert!(matches!(err, ConfigError::InvalidGroupPath { group } if group == "a/"));

        let err = apply_env(StoreConfig::new(), env(&[(ENV_DEFAULT_GROUP, "/x//")]))
            .expect_err("env group");
        assert!(matches!(err, ConfigError::InvalidGroupPath { group } if group == "/x//"));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = from_path("/nonexistent/zenstore.json").expect_err("missing file");
        assert!(err.to_string().contains("/nonexistent/zenstore.json"));
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
