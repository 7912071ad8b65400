//! Credential Store Port - Durable Access Token Storage
//!
//! The access token survives restarts in client-side storage. The
//! store only persists and erases it; validation happens against
//! the remote identity endpoint.

use async_trait::async_trait;

/// An access token for the hosting provider.
///
/// `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
  pub fn new(token: impl Into<String>) -> Self {
    Self(token.into())
  }

  /// The raw token, for building the `Authorization` header.
  pub fn expose(&self) -> &str {
    &self.0
  }
}

impl std::fmt::Debug for Credential {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str("Credential(***)")
  }
}

/// Trait for durable credential storage providers.
#[async_trait]
pub trait CredentialStore: Send + Sync + 'static {
  /// Load the stored credential, `None` if nothing is stored.
  async fn load(&self) -> anyhow::Result<Option<Credential>>;

  /// Persist `credential`, replacing any previous one.
  async fn save(&self, credential: &Credential) -> anyhow::Result<()>;

  /// Erase the stored credential. Erasing an empty store is not an error.
  async fn clear(&self) -> anyhow::Result<()>;
}
