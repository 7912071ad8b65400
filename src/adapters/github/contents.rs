//! GitHub Contents Store - Adapter for the Document Store Port
//!
//! Implements `DocumentStore` on top of the repository contents API
//! using the shared `GithubClient`. File bodies travel as base64 and
//! the blob `sha` serves as the concurrency token.

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Url;
use tracing::{debug, info, instrument, warn};

use super::client::{GithubClient, classify};
use super::codec;
use super::types::{ContentResponse, PutContentRequest, PutContentResponse};
use crate::config::StoreConfig;
use crate::ports::{
  Access, ConcurrencyToken, Credential, DocumentStore, Identity, PutReceipt, PutRequest,
  RemoteDocument, StoreResponse,
};

/// Repository contents store backed by the shared GitHub client.
pub struct GithubContents {
  /// Shared HTTP client.
  client: Arc<GithubClient>,
  /// Repository owner.
  owner: String,
  /// Repository name.
  repo: String,
  /// Branch read from and committed to.
  branch: String,
}

impl GithubContents {
  /// Create a store for the repository named in `config`.
  pub fn new(client: Arc<GithubClient>, config: &StoreConfig) -> Self {
    Self {
      client,
      owner: config.owner.clone(),
      repo: config.repo.clone(),
      branch: config.branch.clone(),
    }
  }

  /// `/repos/{owner}/{repo}/contents/{path}`
  fn contents_url(&self, path: &str) -> Result<Url> {
    let head = ["repos", self.owner.as_str(), self.repo.as_str(), "contents"];
    let tail = path.split('/').filter(|seg| !seg.is_empty());
    self.client.endpoint(head.into_iter().chain(tail))
  }
}

#[async_trait]
impl DocumentStore for GithubContents {
  #[instrument(skip_all)]
  async fn whoami(&self, credential: &Credential) -> Result<StoreResponse<Identity>> {
    let url = self.client.endpoint(["user"])?;
    let response = self
      .client
      .get(url, &Access::Token(credential.clone()))
      .await?;

    let outcome = classify::<Identity>(response).await?;
    if let StoreResponse::Ok(identity) = &outcome {
      debug!(login = %identity.login, "Identity resolved");
    }
    Ok(outcome)
  }

  #[instrument(skip(self, access), fields(repo = %self.repo, branch = %self.branch))]
  async fn fetch(&self, path: &str, access: &Access) -> Result<StoreResponse<RemoteDocument>> {
    let mut url = self.contents_url(path)?;
    url.query_pairs_mut().append_pair("ref", &self.branch);

    let response = self.client.get(url, access).await?;

    classify::<ContentResponse>(response)
      .await?
      .try_map(|body| {
        if body.encoding.as_deref().is_some_and(|e| e != "base64") {
          warn!(encoding = ?body.encoding, "File body not inlined by the contents API");
          anyhow::bail!("{path} is too large to fetch through the contents API");
        }

        let bytes = codec::decode(&body.content)
          .with_context(|| format!("Failed to decode base64 body of {path}"))?;

        debug!(bytes = bytes.len(), sha = %body.sha, "File fetched");
        Ok(RemoteDocument {
          bytes,
          token: ConcurrencyToken::new(body.sha),
        })
      })
  }

  #[instrument(
    skip(self, request, credential),
    fields(repo = %self.repo, bytes = request.bytes.len(), update = request.expected.is_some())
  )]
  async fn put(
    &self,
    path: &str,
    request: &PutRequest,
    credential: &Credential,
  ) -> Result<StoreResponse<PutReceipt>> {
    let url = self.contents_url(path)?;

    let body = PutContentRequest {
      message: &request.message,
      content: codec::encode(&request.bytes),
      branch: &self.branch,
      sha: request.expected.as_ref().map(ConcurrencyToken::as_str),
    };

    let response = self.client.put_json(url, &body, credential).await?;

    let outcome = classify::<PutContentResponse>(response).await?.map(|written| PutReceipt {
      token: ConcurrencyToken::new(written.content.sha),
      download_url: written.content.download_url,
    });

    match &outcome {
      StoreResponse::Ok(receipt) => info!(sha = %receipt.token, "File committed"),
      StoreResponse::Conflict { message } => {
        warn!(message = ?message, "Write rejected: file changed since it was read");
      }
      other => warn!(outcome = ?other, "Write rejected"),
    }

    Ok(outcome)
  }
}
