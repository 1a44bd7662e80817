//! Structured tracing helpers.

use anyhow::{Context, Result, anyhow};
use tracing_subscriber::EnvFilter;
use zenstore_config::StoreConfig;

/// Filter used when no directive is configured anywhere.
pub const DEFAULT_FILTER: &str = "info";

/// Picks the filter directive to install.
///
/// Precedence: `explicit`, then `env` (the value of `RUST_LOG`), then the
/// configured `log_filter`, then [`DEFAULT_FILTER`]. Blank values are skipped.
#[must_use]
pub fn resolve_filter(explicit: Option<&str>, env: Option<&str>, config: Option<&str>) -> String {
    [explicit, env, config]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|directive| !directive.is_empty())
        .unwrap_or(DEFAULT_FILTER)
        .to_owned()
}

/// Installs a global fmt subscriber.
///
/// `filter` takes precedence over `RUST_LOG`.
///
/// # Errors
///
/// Returns an error when the directive does not parse or a global subscriber
/// is already installed.
pub fn init(filter: Option<&str>) -> Result<()> {
    install(filter, None)
}

/// Installs a global fmt subscriber using the config's `log_filter` as the
/// fallback directive.
///
/// # Errors
///
/// See [`init`].
pub fn init_from_config(config: &StoreConfig) -> Result<()> {
    install(None, config.log_filter.as_deref())
}

fn install(explicit: Option<&str>, config: Option<&str>) -> Result<()> {
    let env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let directive = resolve_filter(explicit, env.as_deref(), config);
    let filter = EnvFilter::try_new(&directive)
        .with_context(|| format!("invalid log filter `{directive}`"))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .map_err(|err| anyhow!("failed to install tracing subscriber: {err}"))?;

    tracing::debug!(filter = %directive, "tracing initialised");
    Ok(())
}
