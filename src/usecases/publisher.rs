//! Publisher Use Case - Compose and Publish a Post
//!
//! A `Draft` collects title, body and media files. Files are screened
//! when staged, so an oversized or unsupported file is refused up front
//! instead of halfway through a publish.
//!
//! Publish flow:
//! 1. Trim title and content, require content
//! 2. Upload staged files one at a time, in staging order
//! 3. Create the post with the uploaded paths
//!
//! The first failed upload aborts the publish before the index is
//! touched. Files already uploaded by then stay in the repository.

use tracing::{info, instrument};

use crate::domain::media::{self, MediaCategory, MediaFile, MediaRejection};
use crate::domain::post::Post;
use crate::error::BlogError;
use crate::ports::{CredentialStore, DocumentStore};
use crate::usecases::blog_client::{BlogClient, UploadedMedia};

/// A file accepted for upload.
#[derive(Debug, Clone)]
pub struct StagedMedia {
  pub file: MediaFile,
  pub declared_type: String,
  pub category: MediaCategory,
}

/// A post being composed.
#[derive(Debug, Clone)]
pub struct Draft {
  pub title: String,
  pub content: String,
  staged: Vec<StagedMedia>,
  /// Upload size limit in bytes.
  limit: u64,
}

impl Draft {
  pub fn new(title: impl Into<String>, content: impl Into<String>, limit: u64) -> Self {
    Self {
      title: title.into(),
      content: content.into(),
      staged: Vec::new(),
      limit,
    }
  }

  /// Screen `file` and add it to the upload list.
  ///
  /// Uses the same size and type rules as `BlogClient::upload_media`.
  pub fn stage(&mut self, file: MediaFile, declared_type: &str) -> Result<(), MediaRejection> {
    let category = media::screen(file.size(), declared_type, self.limit)?;
    self.staged.push(StagedMedia {
      file,
      declared_type: declared_type.to_string(),
      category,
    });
    Ok(())
  }

  /// Remove the staged file at `index`, if any.
  pub fn unstage(&mut self, index: usize) -> Option<StagedMedia> {
    (index < self.staged.len()).then(|| self.staged.remove(index))
  }

  pub fn staged(&self) -> &[StagedMedia] {
    &self.staged
  }
}

/// Outcome of a successful publish.
#[derive(Debug, Clone)]
pub struct Published {
  pub post: Post,
  pub uploads: Vec<UploadedMedia>,
}

/// Upload the draft's media, then create the post.
#[instrument(skip(client, draft), fields(staged = draft.staged.len()))]
pub async fn publish<S: DocumentStore, C: CredentialStore>(
  client: &BlogClient<S, C>,
  draft: Draft,
) -> Result<Published, BlogError> {
  let title = draft.title.trim();
  let content = draft.content.trim();
  if content.is_empty() {
    return Err(BlogError::MissingContent);
  }

  let total = draft.staged.len();
  let mut uploads = Vec::with_capacity(total);
  for (n, staged) in draft.staged.iter().enumerate() {
    info!(file = %staged.file.name, "Uploading media {}/{}", n + 1, total);
    uploads.push(client.upload_media(&staged.file, &staged.declared_type).await?);
  }

  let paths = uploads.iter().map(|u| u.path.clone()).collect();
  let post = client
    .create_post((!title.is_empty()).then_some(title), content, paths)
    .await?;

  info!(id = %post.id, media = uploads.len(), "Post published");
  Ok(Published { post, uploads })
}
