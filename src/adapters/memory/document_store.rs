//! In-memory document store with the same compare-and-swap rules as
//! the contents API. Backs tests and offline dry runs.

use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::RwLock;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use anyhow::{Result, anyhow};
use async_trait::async_trait;

use crate::ports::{
  Access, ConcurrencyToken, Credential, DocumentStore, Identity, PutReceipt, PutRequest,
  RemoteDocument, StoreResponse,
};

#[derive(Debug, Clone)]
struct StoredFile {
  bytes: Vec<u8>,
  token: ConcurrencyToken,
}

/// Process-local repository.
///
/// Writes follow the remote rules: overwriting requires the current
/// token, creating requires no token, and unknown credentials are
/// refused. Reads never require a credential.
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
  files: RwLock<HashMap<String, StoredFile>>,
  /// Token secret -> account.
  identities: RwLock<HashMap<String, Identity>>,
  /// Base for synthesized download URLs.
  download_base: Option<String>,
  generation: AtomicU64,
  reads: AtomicUsize,
  writes: AtomicUsize,
}

impl InMemoryDocumentStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Report `<base>/<path>` as the download URL of written files.
  #[must_use]
  pub fn with_download_base(mut self, base: impl Into<String>) -> Self {
    self.download_base = Some(base.into());
    self
  }

  /// Accept `token` as the credential of `login`.
  #[must_use]
  pub fn with_identity(self, token: &str, login: &str) -> Self {
    self.identities
      .write()
      .unwrap_or_else(std::sync::PoisonError::into_inner)
      .insert(
        token.to_string(),
        Identity {
          login: login.to_string(),
          id: None,
          name: None,
          html_url: None,
        },
      );
    self
  }

  /// Place a file directly, bypassing token checks (an external writer).
  pub fn seed(&self, path: &str, bytes: impl Into<Vec<u8>>) -> ConcurrencyToken {
    let bytes = bytes.into();
    let token = self.next_token(path, &bytes);
    self.files_mut().insert(
      path.to_string(),
      StoredFile {
        bytes,
        token: token.clone(),
      },
    );
    token
  }

  /// Current contents of `path`.
  pub fn contents(&self, path: &str) -> Option<Vec<u8>> {
    self.files_ref().get(path).map(|f| f.bytes.clone())
  }

  /// Current token of `path`.
  pub fn token_of(&self, path: &str) -> Option<ConcurrencyToken> {
    self.files_ref().get(path).map(|f| f.token.clone())
  }

  /// Stored paths, sorted.
  pub fn paths(&self) -> Vec<String> {
    let mut paths: Vec<String> = self.files_ref().keys().cloned().collect();
    paths.sort();
    paths
  }

  /// Number of fetch and whoami calls served.
  pub fn read_count(&self) -> usize {
    self.reads.load(Ordering::Relaxed)
  }

  /// Number of put calls received, accepted or not.
  pub fn write_count(&self) -> usize {
    self.writes.load(Ordering::Relaxed)
  }

  /// Total calls received.
  pub fn request_count(&self) -> usize {
    self.read_count() + self.write_count()
  }

  fn next_token(&self, path: &str, bytes: &[u8]) -> ConcurrencyToken {
    let generation = self.generation.fetch_add(1, Ordering::Relaxed);
    let mut hasher = DefaultHasher::new();
    path.hash(&mut hasher);
    bytes.hash(&mut hasher);
    generation.hash(&mut hasher);
    ConcurrencyToken::new(format!("{:016x}{generation:08x}", hasher.finish()))
  }

  fn identity_for(&self, credential: &Credential) -> Option<Identity> {
    self.identities
      .read()
      .unwrap_or_else(std::sync::PoisonError::into_inner)
      .get(credential.expose())
      .cloned()
  }

  fn files_ref(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, StoredFile>> {
    self.files.read().unwrap_or_else(std::sync::PoisonError::into_inner)
  }

  fn files_mut(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, StoredFile>> {
    self.files.write().unwrap_or_else(std::sync::PoisonError::into_inner)
  }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
  async fn whoami(&self, credential: &Credential) -> Result<StoreResponse<Identity>> {
    self.reads.fetch_add(1, Ordering::Relaxed);
    Ok(match self.identity_for(credential) {
      Some(identity) => StoreResponse::Ok(identity),
      None => StoreResponse::Unauthorized,
    })
  }

  async fn fetch(&self, path: &str, _access: &Access) -> Result<StoreResponse<RemoteDocument>> {
    self.reads.fetch_add(1, Ordering::Relaxed);
    Ok(match self.files_ref().get(path) {
      Some(file) => StoreResponse::Ok(RemoteDocument {
        bytes: file.bytes.clone(),
        token: file.token.clone(),
      }),
      None => StoreResponse::NotFound,
    })
  }

  async fn put(
    &self,
    path: &str,
    request: &PutRequest,
    credential: &Credential,
  ) -> Result<StoreResponse<PutReceipt>> {
    self.writes.fetch_add(1, Ordering::Relaxed);

    if self.identity_for(credential).is_none() {
      return Ok(StoreResponse::Unauthorized);
    }
    if path.is_empty() || path.starts_with('/') {
      return Err(anyhow!("invalid repository path {path:?}"));
    }

    let token = self.next_token(path, &request.bytes);
    let mut files = self.files_mut();

    match (files.get(path), &request.expected) {
      (Some(_), None) => {
        return Ok(StoreResponse::Failed {
          status: 422,
          message: Some("Invalid request.\n\n\"sha\" wasn't supplied.".to_string()),
        });
      }
      (Some(current), Some(expected)) if current.token != *expected => {
        return Ok(StoreResponse::Conflict {
          message: Some(format!("{path} does not match {expected}")),
        });
      }
      (None, Some(expected)) => {
        return Ok(StoreResponse::Conflict {
          message: Some(format!("{path} does not exist at {expected}")),
        });
      }
      _ => {}
    }

    files.insert(
      path.to_string(),
      StoredFile {
        bytes: request.bytes.clone(),
        token: token.clone(),
      },
    );

    Ok(StoreResponse::Ok(PutReceipt {
      token,
      download_url: self
        .download_base
        .as_ref()
        .map(|base| format!("{}/{path}", base.trim_end_matches('/'))),
    }))
  }
}
