//! GitHub REST API Adapter
//!
//! Implements the document store port against the GitHub v3 REST API:
//! the `/user` identity endpoint and the repository contents endpoints.
//!
//! Sub-modules:
//! - `client`: HTTP client with bearer auth and status classification
//! - `codec`: base64 transport encoding of file bodies
//! - `contents`: `DocumentStore` implementation
//! - `types`: API request/response type definitions

pub mod client;
pub mod codec;
pub mod contents;
pub mod types;

pub use client::{GithubClient, GithubClientConfig};
pub use contents::GithubContents;
