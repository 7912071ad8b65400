//! Use Cases Layer - Application Logic
//!
//! Orchestrates domain logic with port interfaces to implement the
//! blog's workflows.
//!
//! Use cases:
//! - `BlogClient`: Credential, documents, media uploads, post index
//! - `session`: Resume, connect and logout
//! - `publisher`: Draft composition and sequential publish

pub mod blog_client;
pub mod publisher;
pub mod session;

pub use blog_client::{BlogClient, PostListing, TextDocument, UploadedMedia};
pub use publisher::{Draft, Published, StagedMedia, publish};
pub use session::SessionState;
