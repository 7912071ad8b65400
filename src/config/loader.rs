//! Configuration Loader - File Loading and Validation
//!
//! Handles loading `config.toml`, validating all parameters,
//! and providing clear error messages for misconfiguration.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use super::AppConfig;

/// Load and validate configuration from a TOML file.
///
/// # Errors
/// Returns detailed error if:
/// - File doesn't exist or can't be read
/// - TOML parsing fails
/// - Validation rules are violated
pub fn load_config(path: impl AsRef<Path>) -> Result<AppConfig> {
  let path = path.as_ref();

  let content = std::fs::read_to_string(path)
    .with_context(|| format!("Failed to read config file: {}", path.display()))?;

  let config = parse_config(&content)
    .with_context(|| format!("Invalid config file: {}", path.display()))?;

  info!(
    owner = %config.store.owner,
    repo = %config.store.repo,
    branch = %config.store.branch,
    index = %config.store.index_path,
    "Configuration loaded successfully"
  );

  Ok(config)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<AppConfig> {
  let config: AppConfig = toml::from_str(content).context("Failed to parse config TOML")?;
  validate_config(&config)?;
  Ok(config)
}

/// Validate all configuration parameters.
///
/// Checks for:
/// - Non-empty repository coordinates
/// - http(s) base URLs
/// - Relative, non-escaping repository paths
/// - A positive upload limit
fn validate_config(config: &AppConfig) -> Result<()> {
  let store = &config.store;

  // Repository coordinates
  for (name, value) in [
    ("store.owner", &store.owner),
    ("store.repo", &store.repo),
    ("store.branch", &store.branch),
  ] {
    anyhow::ensure!(!value.trim().is_empty(), "{name} must not be empty");
    anyhow::ensure!(
      !value.contains('/'),
      "{name} must be a single path segment, got {value:?}"
    );
  }

  // Base URLs
  for (name, value) in [("store.api_base", &store.api_base), ("store.raw_base", &store.raw_base)] {
    anyhow::ensure!(
      value.starts_with("https://") || value.starts_with("http://"),
      "{name} must be an http(s) URL, got {value:?}"
    );
  }

  // Repository paths
  for (name, value) in [
    ("store.index_path", &store.index_path),
    ("media.images", &config.media.images),
    ("media.videos", &config.media.videos),
    ("media.audio", &config.media.audio),
  ] {
    validate_repo_path(name, value)?;
  }

  // Upload limit
  anyhow::ensure!(
    config.media.max_file_size > 0,
    "media.max_file_size must be positive"
  );

  Ok(())
}

fn validate_repo_path(name: &str, value: &str) -> Result<()> {
  anyhow::ensure!(!value.trim().is_empty(), "{name} must not be empty");
  anyhow::ensure!(
    !value.starts_with('/'),
    "{name} must be relative to the repository root, got {value:?}"
  );
  anyhow::ensure!(
    value.split('/').all(|seg| seg != ".." && seg != "."),
    "{name} must not contain '.' or '..' segments, got {value:?}"
  );
  Ok(())
}
