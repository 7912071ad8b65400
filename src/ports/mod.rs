//! Ports Layer - Hexagonal Architecture Boundaries
//!
//! Defines the interfaces (traits) that the usecases layer
//! requires from the outside world. Adapters implement these traits.
//!
//! Port categories:
//! - `DocumentStore`: Repository files with compare-and-swap writes
//! - `CredentialStore`: Durable access token storage

pub mod credential_store;
pub mod document_store;

pub use credential_store::{Credential, CredentialStore};
pub use document_store::{
  Access, ConcurrencyToken, DocumentStore, Identity, PutReceipt, PutRequest, RemoteDocument,
  StoreResponse,
};
