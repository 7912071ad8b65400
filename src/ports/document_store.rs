//! Document Store Port - Compare-and-Swap Repository Files
//!
//! Defines the trait for reading and writing single files in the
//! hosting repository. Every fetch returns the store's concurrency
//! token; every overwrite must present the token it last saw, and
//! the store rejects the write if the file has moved on.
//!
//! HTTP statuses are classified once, by the adapter, into
//! `StoreResponse`. Transport failures (DNS, TLS, broken bodies)
//! come back as `Err`.

use async_trait::async_trait;
use serde::Deserialize;

use super::credential_store::Credential;

/// Store-assigned version of a file (the blob `sha`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConcurrencyToken(String);

impl ConcurrencyToken {
  pub fn new(token: impl Into<String>) -> Self {
    Self(token.into())
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl std::fmt::Display for ConcurrencyToken {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(&self.0)
  }
}

/// How a request is authenticated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Access {
  /// No credential held; only public reads work.
  #[default]
  Anonymous,
  /// Bearer token.
  Token(Credential),
}

impl Access {
  /// The held credential, if any.
  pub fn credential(&self) -> Option<&Credential> {
    match self {
      Self::Anonymous => None,
      Self::Token(credential) => Some(credential),
    }
  }
}

/// Account behind a credential, as reported by the "who am I" endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Identity {
  /// Account login name.
  pub login: String,
  /// Numeric account id.
  #[serde(default)]
  pub id: Option<u64>,
  /// Display name.
  #[serde(default)]
  pub name: Option<String>,
  /// Profile page.
  #[serde(default)]
  pub html_url: Option<String>,
}

/// A fetched file: decoded bytes plus the token for this version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteDocument {
  pub bytes: Vec<u8>,
  pub token: ConcurrencyToken,
}

/// A create-or-overwrite request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutRequest {
  /// Raw payload; the adapter applies the transport encoding.
  pub bytes: Vec<u8>,
  /// Commit message.
  pub message: String,
  /// Token of the version being replaced. `None` means "create new".
  pub expected: Option<ConcurrencyToken>,
}

/// Result of an accepted write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutReceipt {
  /// Token of the newly written version.
  pub token: ConcurrencyToken,
  /// Public download URL, when the store reports one.
  pub download_url: Option<String>,
}

/// Outcome of a store call that reached the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreResponse<T> {
  /// 2xx with a decoded body.
  Ok(T),
  /// 404.
  NotFound,
  /// 401: the credential was rejected.
  Unauthorized,
  /// 409: the expected token no longer matches.
  Conflict {
    /// Store-provided explanation.
    message: Option<String>,
  },
  /// Any other non-success status.
  Failed {
    /// HTTP status code.
    status: u16,
    /// Store-provided error message.
    message: Option<String>,
  },
}

impl<T> StoreResponse<T> {
  /// Map the success payload, leaving every other outcome as is.
  pub fn map<U>(self, f: impl FnOnce(T) -> U) -> StoreResponse<U> {
    match self {
      Self::Ok(value) => StoreResponse::Ok(f(value)),
      Self::NotFound => StoreResponse::NotFound,
      Self::Unauthorized => StoreResponse::Unauthorized,
      Self::Conflict { message } => StoreResponse::Conflict { message },
      Self::Failed { status, message } => StoreResponse::Failed { status, message },
    }
  }

  /// Fallible `map`: an `Err` from `f` replaces the whole response.
  pub fn try_map<U, E>(self, f: impl FnOnce(T) -> Result<U, E>) -> Result<StoreResponse<U>, E> {
    Ok(match self {
      Self::Ok(value) => StoreResponse::Ok(f(value)?),
      Self::NotFound => StoreResponse::NotFound,
      Self::Unauthorized => StoreResponse::Unauthorized,
      Self::Conflict { message } => StoreResponse::Conflict { message },
      Self::Failed { status, message } => StoreResponse::Failed { status, message },
    })
  }

  pub fn is_ok(&self) -> bool {
    matches!(self, Self::Ok(_))
  }
}

/// Trait for repository-backed document stores.
///
/// Implementors talk to the hosting provider (or stand in for it).
/// No implementation retries, caches, or merges: a stale token is
/// reported as `Conflict` and left to the caller.
#[async_trait]
pub trait DocumentStore: Send + Sync + 'static {
  /// Look up the account that owns `credential`.
  async fn whoami(&self, credential: &Credential) -> anyhow::Result<StoreResponse<Identity>>;

  /// Fetch a file by repository-relative path.
  async fn fetch(
    &self,
    path: &str,
    access: &Access,
  ) -> anyhow::Result<StoreResponse<RemoteDocument>>;

  /// Create or overwrite a file.
  ///
  /// When `request.expected` is set, the write succeeds only if it
  /// matches the file's current token.
  async fn put(
    &self,
    path: &str,
    request: &PutRequest,
    credential: &Credential,
  ) -> anyhow::Result<StoreResponse<PutReceipt>>;
}
