//! Process-local credential store.

use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;

use crate::ports::{Credential, CredentialStore};

/// Credential store that forgets everything on exit.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
  slot: Mutex<Option<Credential>>,
}

impl MemoryCredentialStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Start with `token` already stored.
  pub fn with_token(token: &str) -> Self {
    Self {
      slot: Mutex::new(Some(Credential::new(token))),
    }
  }

  /// What is stored right now.
  pub fn current(&self) -> Option<Credential> {
    self.slot
      .lock()
      .unwrap_or_else(std::sync::PoisonError::into_inner)
      .clone()
  }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
  async fn load(&self) -> Result<Option<Credential>> {
    Ok(self.current())
  }

  async fn save(&self, credential: &Credential) -> Result<()> {
    *self.slot.lock().unwrap_or_else(std::sync::PoisonError::into_inner) = Some(credential.clone());
    Ok(())
  }

  async fn clear(&self) -> Result<()> {
    *self.slot.lock().unwrap_or_else(std::sync::PoisonError::into_inner) = None;
    Ok(())
  }
}
