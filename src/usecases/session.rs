//! Session Use Case - Sign-in Lifecycle
//!
//! Wraps the credential calls of `BlogClient` into the three things a
//! user actually does:
//! 1. Resume: check a stored token at startup, drop it if revoked
//! 2. Connect: store a new token and keep it only if it validates
//! 3. Logout: forget the token

use tracing::{info, warn};

use crate::error::BlogError;
use crate::ports::{CredentialStore, DocumentStore, Identity};
use crate::usecases::blog_client::BlogClient;

/// Where the session stands after a sign-in step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
  /// A valid credential is held for this account.
  SignedIn(Identity),
  /// No credential is held.
  SignedOut,
}

impl SessionState {
  pub const fn is_signed_in(&self) -> bool {
    matches!(self, Self::SignedIn(_))
  }
}

/// Validate a previously stored credential.
///
/// A credential the store rejects is erased and the session reports
/// `SignedOut`. Transport and other failures propagate and leave the
/// credential in place, since they say nothing about its validity.
pub async fn resume<S: DocumentStore, C: CredentialStore>(
  client: &mut BlogClient<S, C>,
) -> Result<SessionState, BlogError> {
  if !client.has_credential() {
    return Ok(SessionState::SignedOut);
  }

  match client.validate_credential().await {
    Ok(identity) => Ok(SessionState::SignedIn(identity)),
    Err(BlogError::InvalidCredential) => {
      warn!("Stored credential is no longer valid, erasing it");
      client.clear_credential().await?;
      Ok(SessionState::SignedOut)
    }
    Err(e) => Err(e),
  }
}

/// Store `token` and validate it.
///
/// On any validation failure the token is erased again and the
/// validation error is returned.
pub async fn connect<S: DocumentStore, C: CredentialStore>(
  client: &mut BlogClient<S, C>,
  token: &str,
) -> Result<Identity, BlogError> {
  client.set_credential(token).await?;

  match client.validate_credential().await {
    Ok(identity) => {
      info!(login = %identity.login, "Signed in");
      Ok(identity)
    }
    Err(e) => {
      if let Err(clear) = client.clear_credential().await {
        warn!(error = %clear, "Failed to erase rejected credential");
      }
      Err(e)
    }
  }
}

/// Erase the held credential.
pub async fn logout<S: DocumentStore, C: CredentialStore>(
  client: &mut BlogClient<S, C>,
) -> Result<(), BlogError> {
  client.clear_credential().await?;
  info!("Signed out");
  Ok(())
}
