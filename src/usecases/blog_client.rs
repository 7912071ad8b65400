//! Blog Client - Repository Store Client
//!
//! The one stateful piece of the system. Holds the access credential,
//! reads and rewrites the post index with compare-and-swap semantics,
//! and commits media uploads under collision-resistant names.
//!
//! Every call goes straight to the document store: no retries, no
//! caching, no merge on conflict.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, instrument, warn};

use crate::config::{AppConfig, MediaConfig, StoreConfig};
use crate::domain::media::{self, MediaFile};
use crate::domain::post::{IdMinter, Post, PostIndex};
use crate::error::{BlogError, FailureKind, Operation};
use crate::ports::{
  Access, ConcurrencyToken, Credential, CredentialStore, DocumentStore, Identity, PutReceipt,
  PutRequest, StoreResponse,
};

/// A decoded text document and the token of the version read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextDocument {
  pub content: String,
  pub token: ConcurrencyToken,
}

/// The post index as read, with its concurrency token.
///
/// `token` is `None` when the index does not exist yet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostListing {
  pub posts: Vec<Post>,
  pub token: Option<ConcurrencyToken>,
}

/// A committed media file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedMedia {
  /// Repository-relative path actually written.
  pub path: String,
  /// Publicly fetchable URL.
  pub public_url: String,
  /// Token of the new file.
  pub token: ConcurrencyToken,
}

/// Client for a blog stored in a hosting repository.
///
/// Constructed once per process with explicit store handles; the
/// credential is read from `credentials` at construction and changes
/// only through `set_credential` / `clear_credential`.
pub struct BlogClient<S: DocumentStore, C: CredentialStore> {
  /// Remote document store.
  store: Arc<S>,
  /// Durable credential storage.
  credentials: Arc<C>,
  /// Credential currently held.
  access: Access,
  /// Repository coordinates.
  store_config: StoreConfig,
  /// Media folders and size limit.
  media: MediaConfig,
  /// Post id source.
  ids: IdMinter,
}

impl<S: DocumentStore, C: CredentialStore> BlogClient<S, C> {
  /// Create a client, loading any stored credential.
  pub async fn new(store: Arc<S>, credentials: Arc<C>, config: &AppConfig) -> Result<Self, BlogError> {
    let access = match credentials.load().await.map_err(BlogError::CredentialStorage)? {
      Some(credential) => Access::Token(credential),
      None => Access::Anonymous,
    };

    debug!(
      owner = %config.store.owner,
      repo = %config.store.repo,
      signed_in = matches!(access, Access::Token(_)),
      "Blog client ready"
    );

    Ok(Self {
      store,
      credentials,
      access,
      store_config: config.store.clone(),
      media: config.media.clone(),
      ids: IdMinter::new(),
    })
  }

  // ── Credential ──────────────────────────────────────────

  /// True iff a credential is held.
  pub const fn has_credential(&self) -> bool {
    matches!(self.access, Access::Token(_))
  }

  /// Persist and hold `token`. No network traffic.
  pub async fn set_credential(&mut self, token: &str) -> Result<(), BlogError> {
    let token = token.trim();
    if token.is_empty() {
      return Err(BlogError::EmptyCredential);
    }

    let credential = Credential::new(token);
    self.credentials
      .save(&credential)
      .await
      .map_err(BlogError::CredentialStorage)?;
    self.access = Access::Token(credential);
    Ok(())
  }

  /// Erase the credential from storage and memory. No network traffic.
  pub async fn clear_credential(&mut self) -> Result<(), BlogError> {
    self.access = Access::Anonymous;
    self.credentials
      .clear()
      .await
      .map_err(BlogError::CredentialStorage)
  }

  fn credential(&self) -> Result<&Credential, BlogError> {
    self.access.credential().ok_or(BlogError::AuthenticationRequired)
  }

  /// Check the held credential against the identity endpoint.
  ///
  /// A 401 maps to `InvalidCredential`; any other failure is a
  /// `Failed` error carrying the status or transport cause.
  #[instrument(skip(self))]
  pub async fn validate_credential(&self) -> Result<Identity, BlogError> {
    let credential = self.credential()?;

    let response = self
      .store
      .whoami(credential)
      .await
      .map_err(|e| BlogError::failed(Operation::ValidateToken, FailureKind::Transport(e)))?;

    match response {
      StoreResponse::Ok(identity) => {
        info!(login = %identity.login, "Credential valid");
        Ok(identity)
      }
      StoreResponse::Unauthorized => {
        warn!("Credential rejected by the store");
        Err(BlogError::InvalidCredential)
      }
      other => settle(Operation::ValidateToken, other),
    }
  }

  // ── Documents ───────────────────────────────────────────

  /// Fetch a text document. A missing document is `Ok(None)`.
  #[instrument(skip(self))]
  pub async fn read_document(&self, path: &str) -> Result<Option<TextDocument>, BlogError> {
    let response = self
      .store
      .fetch(path, &self.access)
      .await
      .map_err(|e| BlogError::failed(Operation::GetFile, FailureKind::Transport(e)))?;

    let remote = match response {
      StoreResponse::NotFound => {
        debug!("Document does not exist");
        return Ok(None);
      }
      other => settle(Operation::GetFile, other)?,
    };

    let content = String::from_utf8(remote.bytes).map_err(|_| {
      BlogError::failed(
        Operation::GetFile,
        FailureKind::Malformed(format!("{path} is not valid UTF-8")),
      )
    })?;

    Ok(Some(TextDocument {
      content,
      token: remote.token,
    }))
  }

  /// Write a text document.
  ///
  /// Pass the token from the last read to overwrite; pass `None` to
  /// create. A stale token fails with a conflict error.
  #[instrument(skip(self, content, token), fields(bytes = content.len(), update = token.is_some()))]
  pub async fn write_document(
    &self,
    path: &str,
    content: &str,
    message: &str,
    token: Option<&ConcurrencyToken>,
  ) -> Result<PutReceipt, BlogError> {
    let credential = self.credential()?;
    let request = PutRequest {
      bytes: content.as_bytes().to_vec(),
      message: message.to_string(),
      expected: token.cloned(),
    };
    self.put(Operation::SaveFile, path, &request, credential).await
  }

  /// Upload a media file under `<folder>/<ms>-<suffix>.<ext>`.
  ///
  /// Size and type are checked before any request is made; a file
  /// exactly at the limit is accepted.
  #[instrument(skip(self, file), fields(name = %file.name, size = file.size()))]
  pub async fn upload_media(
    &self,
    file: &MediaFile,
    declared_type: &str,
  ) -> Result<UploadedMedia, BlogError> {
    let credential = self.credential()?;
    let category = media::screen(file.size(), declared_type, self.media.max_file_size)?;

    let file_name = media::storage_file_name(
      now_millis(),
      &media::random_suffix(&mut rand::thread_rng()),
      &media::extension_for(&file.name, declared_type),
    );
    let path = format!("{}/{file_name}", self.media.folder_for(category));

    let request = PutRequest {
      bytes: file.bytes.clone(),
      message: format!("Upload media: {file_name}"),
      expected: None,
    };
    let receipt = self.put(Operation::UploadMedia, &path, &request, credential).await?;

    info!(%path, %category, "Media uploaded");
    Ok(UploadedMedia {
      public_url: receipt
        .download_url
        .unwrap_or_else(|| self.media_url(&path)),
      path,
      token: receipt.token,
    })
  }

  async fn put(
    &self,
    operation: Operation,
    path: &str,
    request: &PutRequest,
    credential: &Credential,
  ) -> Result<PutReceipt, BlogError> {
    let response = self
      .store
      .put(path, request, credential)
      .await
      .map_err(|e| BlogError::failed(operation, FailureKind::Transport(e)))?;
    settle(operation, response)
  }

  // ── Posts ───────────────────────────────────────────────

  /// Read the post index. A missing index is an empty blog.
  #[instrument(skip(self))]
  pub async fn list_posts(&self) -> Result<PostListing, BlogError> {
    let (index, token) = self.load_index().await?;
    Ok(PostListing {
      posts: index.into_posts(),
      token,
    })
  }

  /// Find a post by id. Absent posts are `Ok(None)`.
  #[instrument(skip(self))]
  pub async fn get_post(&self, id: &str) -> Result<Option<Post>, BlogError> {
    let (index, _) = self.load_index().await?;
    Ok(index.find(id).cloned())
  }

  /// Create a post at the front of the index.
  ///
  /// Reads the index and its token, prepends the new record and writes
  /// back with that token. If another writer got in between, the store
  /// rejects the write and the conflict is returned as is.
  #[instrument(skip(self, content, media), fields(media = media.len()))]
  pub async fn create_post(
    &self,
    title: Option<&str>,
    content: &str,
    media: Vec<String>,
  ) -> Result<Post, BlogError> {
    self.credential()?;
    if content.trim().is_empty() {
      return Err(BlogError::MissingContent);
    }

    let (mut index, token) = self.load_index().await?;

    let created_at = Utc::now();
    let id = self.ids.mint(millis_of(created_at), index.newest_id());
    let post = Post::new(id, title, content, media, created_at);

    index.prepend(post.clone());
    let json = index.to_json().map_err(|e| {
      BlogError::failed(Operation::SaveFile, FailureKind::Malformed(e.to_string()))
    })?;

    let message = format!(
      "Add post: {}",
      post.title.as_deref().unwrap_or_else(|| post.id.as_str())
    );
    self.write_document(&self.store_config.index_path, &json, &message, token.as_ref())
      .await?;

    info!(id = %post.id, posts = index.len(), "Post created");
    Ok(post)
  }

  /// Read and parse the index. Every failure is reported as `get posts`.
  async fn load_index(&self) -> Result<(PostIndex, Option<ConcurrencyToken>), BlogError> {
    let document = self
      .read_document(&self.store_config.index_path)
      .await
      .map_err(|e| match e {
        BlogError::Failed { kind, .. } => BlogError::failed(Operation::GetPosts, kind),
        other => other,
      })?;
    let Some(document) = document else {
      return Ok((PostIndex::default(), None));
    };

    let index = PostIndex::from_json(&document.content).map_err(|e| {
      BlogError::failed(Operation::GetPosts, FailureKind::Malformed(e.to_string()))
    })?;
    debug!(posts = index.len(), "Index loaded");
    Ok((index, Some(document.token)))
  }

  // ── URLs ────────────────────────────────────────────────

  /// Public raw-content URL of a stored file. Pure; no network call.
  pub fn media_url(&self, path: &str) -> String {
    let store = &self.store_config;
    format!(
      "{}/{}/{}/{}/{}",
      store.raw_base.trim_end_matches('/'),
      store.owner,
      store.repo,
      store.branch,
      path.trim_start_matches('/')
    )
  }

  /// Largest accepted upload in bytes.
  pub const fn max_file_size(&self) -> u64 {
    self.media.max_file_size
  }
}

/// Turn a non-success store response into the operation's error.
fn settle<T>(operation: Operation, response: StoreResponse<T>) -> Result<T, BlogError> {
  let kind = match response {
    StoreResponse::Ok(value) => return Ok(value),
    StoreResponse::NotFound => FailureKind::status(404, Some("Not Found".to_string())),
    StoreResponse::Unauthorized => FailureKind::status(401, Some("Bad credentials".to_string())),
    StoreResponse::Conflict { message } => FailureKind::Conflict(
      message.unwrap_or_else(|| "document changed since it was read".to_string()),
    ),
    StoreResponse::Failed { status, message } => FailureKind::status(status, message),
  };
  Err(BlogError::failed(operation, kind))
}

fn millis_of(at: chrono::DateTime<Utc>) -> u64 {
  u64::try_from(at.timestamp_millis()).unwrap_or_default()
}

fn now_millis() -> u64 {
  millis_of(Utc::now())
}
