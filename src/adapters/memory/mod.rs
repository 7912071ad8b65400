//! In-Memory Adapters - Process-local Stand-ins
//!
//! Implement both ports without network or disk. The document store
//! enforces the same token rules as the remote API, which makes it
//! suitable for exercising conflict handling in tests.

pub mod credential_store;
pub mod document_store;

pub use credential_store::MemoryCredentialStore;
pub use document_store::InMemoryDocumentStore;
