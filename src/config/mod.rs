//! Configuration Module - TOML-based Client Configuration
//!
//! Loads and validates configuration from `config.toml`.
//! Repository coordinates, media folders, the upload size limit and
//! the index path are externalized here - nothing is hardcoded in
//! the domain layer. Configuration is immutable once loaded.

pub mod loader;

use std::path::PathBuf;

use serde::Deserialize;

use crate::domain::media::MediaCategory;

/// Top-level client configuration.
///
/// Loaded from `config.toml` at startup. Only `store.owner` and
/// `store.repo` have no defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
  /// Logging output.
  #[serde(default)]
  pub logging: LoggingConfig,
  /// Remote repository coordinates.
  pub store: StoreConfig,
  /// Media folders and size limit.
  #[serde(default)]
  pub media: MediaConfig,
  /// Where the access token is kept.
  #[serde(default)]
  pub credentials: CredentialsConfig,
}

impl AppConfig {
  /// Configuration for `owner/repo` with every other value defaulted.
  pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
    Self {
      logging: LoggingConfig::default(),
      store: StoreConfig {
        api_base: default_api_base(),
        raw_base: default_raw_base(),
        owner: owner.into(),
        repo: repo.into(),
        branch: default_branch(),
        index_path: default_index_path(),
      },
      media: MediaConfig::default(),
      credentials: CredentialsConfig::default(),
    }
  }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
  /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins.
  #[serde(default = "default_log_level")]
  pub level: String,
  /// Emit JSON lines instead of human-readable output.
  #[serde(default)]
  pub json: bool,
}

impl Default for LoggingConfig {
  fn default() -> Self {
    Self {
      level: default_log_level(),
      json: false,
    }
  }
}

/// Repository coordinates.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
  /// REST API base URL.
  #[serde(default = "default_api_base")]
  pub api_base: String,
  /// Raw content host used to build public media URLs.
  #[serde(default = "default_raw_base")]
  pub raw_base: String,
  /// Repository owner (user or organization).
  pub owner: String,
  /// Repository name.
  pub repo: String,
  /// Branch that receives commits.
  #[serde(default = "default_branch")]
  pub branch: String,
  /// Repository path of the post index document.
  #[serde(default = "default_index_path")]
  pub index_path: String,
}

/// Media upload configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MediaConfig {
  /// Folder for image uploads.
  #[serde(default = "default_images")]
  pub images: String,
  /// Folder for video uploads.
  #[serde(default = "default_videos")]
  pub videos: String,
  /// Folder for audio uploads.
  #[serde(default = "default_audio")]
  pub audio: String,
  /// Largest accepted upload in bytes (inclusive).
  #[serde(default = "default_max_file_size")]
  pub max_file_size: u64,
}

impl MediaConfig {
  /// Repository folder for a media category.
  pub fn folder_for(&self, category: MediaCategory) -> &str {
    match category {
      MediaCategory::Image => &self.images,
      MediaCategory::Video => &self.videos,
      MediaCategory::Audio => &self.audio,
    }
  }
}

impl Default for MediaConfig {
  fn default() -> Self {
    Self {
      images: default_images(),
      videos: default_videos(),
      audio: default_audio(),
      max_file_size: default_max_file_size(),
    }
  }
}

/// Credential storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CredentialsConfig {
  /// File holding the access token.
  #[serde(default = "default_credential_path")]
  pub path: PathBuf,
}

impl Default for CredentialsConfig {
  fn default() -> Self {
    Self {
      path: default_credential_path(),
    }
  }
}

// Default value functions for serde

fn default_log_level() -> String {
  "info".to_string()
}

fn default_api_base() -> String {
  "https://api.github.com".to_string()
}

fn default_raw_base() -> String {
  "https://raw.githubusercontent.com".to_string()
}

fn default_branch() -> String {
  "main".to_string()
}

fn default_index_path() -> String {
  "posts/posts.json".to_string()
}

fn default_images() -> String {
  "media/images".to_string()
}

fn default_videos() -> String {
  "media/videos".to_string()
}

fn default_audio() -> String {
  "media/audio".to_string()
}

fn default_max_file_size() -> u64 {
  37 * 1024 * 1024 // 37 MB, under the API's ~50 MB request cap
}

fn default_credential_path() -> PathBuf {
  PathBuf::from(".repoblog/token")
}
