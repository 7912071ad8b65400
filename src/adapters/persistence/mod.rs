//! Persistence Adapters - Local File Storage
//!
//! Implements the credential store port with a single token file.
//! No database dependency; the blog's own data lives in the remote
//! repository.

pub mod credentials;

pub use credentials::FileCredentialStore;
