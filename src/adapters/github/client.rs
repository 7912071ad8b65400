//! GitHub HTTP Client - Authenticated REST API Client
//!
//! Wraps reqwest with bearer authentication and status classification
//! for every GitHub REST call. Requests are sent once: no retries, no
//! caching, and no explicit timeout beyond the transport defaults.

use anyhow::{Context, Result, anyhow};
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::types::ApiError;
use crate::ports::{Access, Credential, StoreResponse};

/// Media type for the v3 REST API.
const API_ACCEPT: &str = "application/vnd.github.v3+json";

/// Configuration for the GitHub HTTP client.
#[derive(Debug, Clone)]
pub struct GithubClientConfig {
  /// Base URL for the REST API.
  pub api_base: String,
  /// `User-Agent` header (required by the API).
  pub user_agent: String,
}

impl Default for GithubClientConfig {
  fn default() -> Self {
    Self {
      api_base: "https://api.github.com".to_string(),
      user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
    }
  }
}

/// HTTP client for the GitHub REST API.
pub struct GithubClient {
  /// Underlying HTTP client.
  http: Client,
  /// Parsed API base URL.
  api_base: Url,
}

impl GithubClient {
  /// Create a new GitHub client.
  pub fn new(config: GithubClientConfig) -> Result<Self> {
    let api_base = Url::parse(&config.api_base)
      .with_context(|| format!("Invalid API base URL: {}", config.api_base))?;
    anyhow::ensure!(!api_base.cannot_be_a_base(), "API base URL cannot be a base: {api_base}");

    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(API_ACCEPT));

    let http = Client::builder()
      .user_agent(config.user_agent)
      .default_headers(headers)
      .build()
      .context("Failed to build HTTP client")?;

    Ok(Self { http, api_base })
  }

  /// Build an endpoint URL from path segments.
  ///
  /// Each segment is percent-encoded, so repository paths with spaces
  /// or reserved characters stay intact.
  pub fn endpoint<'a, I>(&self, segments: I) -> Result<Url>
  where
    I: IntoIterator<Item = &'a str>,
  {
    let mut url = self.api_base.clone();
    url
      .path_segments_mut()
      .map_err(|()| anyhow!("API base URL cannot be a base"))?
      .pop_if_empty()
      .extend(segments);
    Ok(url)
  }

  /// Execute a GET request.
  pub async fn get(&self, url: Url, access: &Access) -> Result<Response> {
    let request = self.http.get(url.clone());
    self.execute(authorize(request, access.credential()), "GET", &url).await
  }

  /// Execute a PUT request with a JSON body.
  pub async fn put_json<T: Serialize + ?Sized>(
    &self,
    url: Url,
    body: &T,
    credential: &Credential,
  ) -> Result<Response> {
    let request = self.http.put(url.clone()).json(body);
    self.execute(authorize(request, Some(credential)), "PUT", &url).await
  }

  /// Send a request once and log the outcome.
  async fn execute(&self, request: RequestBuilder, method: &str, url: &Url) -> Result<Response> {
    debug!(method, path = url.path(), "Sending request");

    match request.send().await {
      Ok(response) => {
        debug!(method, path = url.path(), status = %response.status(), "Response received");
        Ok(response)
      }
      Err(e) => {
        warn!(method, path = url.path(), error = %e, "Request failed");
        Err(e).with_context(|| format!("{method} {} failed", url.path()))
      }
    }
  }
}

/// Attach the bearer header when a credential is held.
fn authorize(request: RequestBuilder, credential: Option<&Credential>) -> RequestBuilder {
  match credential {
    Some(credential) => request.bearer_auth(credential.expose()),
    None => request,
  }
}

/// Classify a response by status and decode the success body.
///
/// 404, 401 and 409 get their own variants; every other non-success
/// status becomes `Failed` with the API's `message` when it sent one.
pub async fn classify<T: DeserializeOwned>(response: Response) -> Result<StoreResponse<T>> {
  let status = response.status();

  if status.is_success() {
    let body = response
      .json::<T>()
      .await
      .context("Failed to decode response body")?;
    return Ok(StoreResponse::Ok(body));
  }

  Ok(match status {
    StatusCode::NOT_FOUND => StoreResponse::NotFound,
    StatusCode::UNAUTHORIZED => StoreResponse::Unauthorized,
    StatusCode::CONFLICT => StoreResponse::Conflict {
      message: error_message(response).await,
    },
    _ => StoreResponse::Failed {
      status: status.as_u16(),
      message: error_message(response).await,
    },
  })
}

/// Extract the API's `message` from an error body, if any.
async fn error_message(response: Response) -> Option<String> {
  let body = response.text().await.ok()?;
  serde_json::from_str::<ApiError>(&body)
    .ok()
    .and_then(|e| e.message)
}
