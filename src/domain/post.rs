//! Post records and the newest-first post index.
//!
//! The index is a single JSON array stored in the repository. Records are
//! only ever prepended, so newest-first ordering is a stored invariant and
//! no sort happens at read time.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ────────────────────────────────────────────
// Identifiers
// ────────────────────────────────────────────

/// String-typed post identifier.
///
/// Minted from epoch milliseconds but kept as a string on the wire so
/// large values never lose precision in JSON consumers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(String);

impl PostId {
    /// Wrap an existing identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric value of the identifier, if it is a millisecond stamp.
    pub fn millis(&self) -> Option<u64> {
        self.0.parse().ok()
    }
}

impl std::fmt::Display for PostId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Issues strictly increasing post ids.
///
/// Ids are `max(now_ms, last_issued + 1, newest_in_index + 1)`, so two
/// posts created in the same millisecond still get distinct ids and a
/// new id never sorts below one already stored.
#[derive(Debug, Default)]
pub struct IdMinter {
    last: AtomicU64,
}

impl IdMinter {
    /// Create a minter with no issued ids.
    pub const fn new() -> Self {
        Self {
            last: AtomicU64::new(0),
        }
    }

    /// Mint the next id for a post created at `now_ms`.
    ///
    /// `newest_existing` is the largest id already present in the index.
    pub fn mint(&self, now_ms: u64, newest_existing: Option<u64>) -> PostId {
        let floor = newest_existing.map_or(0, |n| n.saturating_add(1));
        let mut prev = self.last.load(Ordering::Relaxed);
        loop {
            let next = now_ms.max(floor).max(prev.saturating_add(1));
            match self
                .last
                .compare_exchange_weak(prev, next, Ordering::AcqRel, Ordering::Relaxed)
            {
                Ok(_) => return PostId(next.to_string()),
                Err(current) => prev = current,
            }
        }
    }
}

// ────────────────────────────────────────────
// Records
// ────────────────────────────────────────────

/// A single blog post as stored in the index document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    /// Unique identifier, increasing by creation time.
    pub id: PostId,
    /// Optional display title (`null` when absent).
    pub title: Option<String>,
    /// Body text.
    pub content: String,
    /// Relative repository paths of attached media, in upload order.
    #[serde(default)]
    pub media: Vec<String>,
    /// Creation time, ISO 8601 with millisecond precision.
    #[serde(with = "iso_millis")]
    pub created_at: DateTime<Utc>,
    /// Fields written by other tools, kept intact on rewrite.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Post {
    /// Build a new record. Blank titles are stored as `null`.
    pub fn new(
        id: PostId,
        title: Option<&str>,
        content: impl Into<String>,
        media: Vec<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            title: title
                .filter(|t| !t.trim().is_empty())
                .map(ToString::to_string),
            content: content.into(),
            media,
            created_at,
            extra: serde_json::Map::new(),
        }
    }

    /// Title for display, `Untitled` when none or a blank one is stored.
    pub fn display_title(&self) -> &str {
        self.title
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or("Untitled")
    }
}

/// The ordered post sequence, newest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostIndex {
    posts: Vec<Post>,
}

impl PostIndex {
    /// Parse the stored index document.
    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }

    /// Serialize as pretty-printed JSON (2-space indent).
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Insert a post at position 0.
    pub fn prepend(&mut self, post: Post) {
        self.posts.insert(0, post);
    }

    /// Linear scan for a post by id.
    pub fn find(&self, id: &str) -> Option<&Post> {
        self.posts.iter().find(|p| p.id.as_str() == id)
    }

    /// Largest numeric id present, used as the floor for new ids.
    pub fn newest_id(&self) -> Option<u64> {
        self.posts.iter().filter_map(|p| p.id.millis()).max()
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn into_posts(self) -> Vec<Post> {
        self.posts
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }
}

impl From<Vec<Post>> for PostIndex {
    fn from(posts: Vec<Post>) -> Self {
        Self { posts }
    }
}

/// `createdAt` codec: always writes `YYYY-MM-DDTHH:MM:SS.mmmZ`, reads any RFC 3339.
mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(at: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&at.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
