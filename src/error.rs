//! Blog client error taxonomy.
//!
//! Every network-side failure carries the operation that failed so the
//! message reads `Failed to <operation>: <reason>`. Missing documents are
//! not errors; reads return `None` instead.

use thiserror::Error;

use crate::domain::media::MediaRejection;

/// Store operation named in failure messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ValidateToken,
    GetFile,
    SaveFile,
    UploadMedia,
    GetPosts,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ValidateToken => write!(f, "validate token"),
            Self::GetFile => write!(f, "get file"),
            Self::SaveFile => write!(f, "save file"),
            Self::UploadMedia => write!(f, "upload media"),
            Self::GetPosts => write!(f, "get posts"),
        }
    }
}

/// What went wrong inside a failed operation.
#[derive(Debug, Error)]
pub enum FailureKind {
    /// The request never produced an HTTP response.
    #[error("{0}")]
    Transport(#[source] anyhow::Error),

    /// Non-success status. `message` is the store's own text or `HTTP <code>`.
    #[error("{message}")]
    Status { status: u16, message: String },

    /// The store rejected a stale concurrency token.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The response or stored document could not be decoded.
    #[error("malformed document: {0}")]
    Malformed(String),
}

impl FailureKind {
    /// Status failure, falling back to `HTTP <code>` without a store message.
    pub fn status(status: u16, message: Option<String>) -> Self {
        let message = message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| format!("HTTP {status}"));
        Self::Status { status, message }
    }
}

/// Errors surfaced by `BlogClient` and the flows built on it.
#[derive(Debug, Error)]
pub enum BlogError {
    /// A write-class call was made with no credential held.
    #[error("Authentication required")]
    AuthenticationRequired,

    /// The store rejected the held credential.
    #[error("Invalid token")]
    InvalidCredential,

    /// A blank token was offered.
    #[error("Please enter a token")]
    EmptyCredential,

    /// A post was submitted without body text.
    #[error("Content is required")]
    MissingContent,

    /// A media file failed size or type screening.
    #[error(transparent)]
    Rejected(#[from] MediaRejection),

    /// A store call failed.
    #[error("Failed to {operation}: {kind}")]
    Failed {
        operation: Operation,
        #[source]
        kind: FailureKind,
    },

    /// Durable credential storage could not be read or written.
    #[error("Failed to persist credential: {0}")]
    CredentialStorage(#[source] anyhow::Error),
}

impl BlogError {
    pub(crate) fn failed(operation: Operation, kind: FailureKind) -> Self {
        Self::Failed { operation, kind }
    }

    /// True when a write was refused because the document changed.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::Failed {
                kind: FailureKind::Conflict(_),
                ..
            }
        )
    }

    /// HTTP status carried by a failed operation, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Failed {
                kind: FailureKind::Status { status, .. },
                ..
            } => Some(*status),
            Self::Failed {
                kind: FailureKind::Conflict(_),
                ..
            } => Some(409),
            _ => None,
        }
    }

    /// The operation a failure belongs to.
    pub fn operation(&self) -> Option<Operation> {
        match self {
            Self::Failed { operation, .. } => Some(*operation),
            _ => None,
        }
    }
}
