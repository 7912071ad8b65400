//! Domain layer - Blog records and media rules.
//!
//! Pure data and naming logic for the repository-backed blog.
//! No network or disk access here (hexagonal architecture inner ring).

pub mod media;
pub mod post;

// Re-export core types for convenience
pub use media::{MediaCategory, MediaFile, MediaRejection};
pub use post::{IdMinter, Post, PostId, PostIndex};
