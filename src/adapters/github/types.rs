//! Contents API Request/Response Types
//!
//! Serialization types for the repository contents endpoints.
//! Only the fields this client reads are modelled; everything else
//! in the responses is ignored.

use serde::{Deserialize, Serialize};

/// File returned by `GET /repos/{owner}/{repo}/contents/{path}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentResponse {
  /// Blob sha, used as the concurrency token.
  pub sha: String,
  /// Base64 body, line-wrapped.
  #[serde(default)]
  pub content: String,
  /// Encoding of `content` (`base64`, or `none` for oversized blobs).
  #[serde(default)]
  pub encoding: Option<String>,
  /// Repository-relative path.
  #[serde(default)]
  pub path: Option<String>,
}

/// Body of `PUT /repos/{owner}/{repo}/contents/{path}`.
#[derive(Debug, Clone, Serialize)]
pub struct PutContentRequest<'a> {
  /// Commit message.
  pub message: &'a str,
  /// Base64 file body.
  pub content: String,
  /// Target branch.
  pub branch: &'a str,
  /// Sha of the blob being replaced; omitted when creating.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub sha: Option<&'a str>,
}

/// Response to a successful PUT.
#[derive(Debug, Clone, Deserialize)]
pub struct PutContentResponse {
  /// The written file.
  pub content: ContentMeta,
}

/// File metadata inside a PUT response.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentMeta {
  /// New blob sha.
  pub sha: String,
  /// Repository-relative path.
  #[serde(default)]
  pub path: Option<String>,
  /// Public raw download URL.
  #[serde(default)]
  pub download_url: Option<String>,
}

/// API error response.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiError {
  /// Error message.
  pub message: Option<String>,
  /// Link to the relevant API docs.
  #[serde(default)]
  pub documentation_url: Option<String>,
}
