//! Media categories, upload screening and storage file naming.
//!
//! Uploaded files land at `<folder>/<epoch-ms>-<suffix>.<ext>`. The
//! timestamp plus a 9-character base-36 suffix keeps concurrent writers
//! from colliding without any coordination.

use rand::Rng;
use thiserror::Error;

/// Length of the random filename suffix.
pub const SUFFIX_LEN: usize = 9;

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Media category, decided by the declared MIME type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaCategory {
    Image,
    Video,
    Audio,
}

impl MediaCategory {
    /// Category for a declared type such as `image/png`.
    ///
    /// Returns `None` for unparsable types and anything outside
    /// image/video/audio.
    pub fn from_declared_type(declared: &str) -> Option<Self> {
        let parsed: mime::Mime = declared.trim().parse().ok()?;
        match parsed.type_() {
            mime::IMAGE => Some(Self::Image),
            mime::VIDEO => Some(Self::Video),
            mime::AUDIO => Some(Self::Audio),
            _ => None,
        }
    }
}

impl std::fmt::Display for MediaCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Image => write!(f, "image"),
            Self::Video => write!(f, "video"),
            Self::Audio => write!(f, "audio"),
        }
    }
}

/// A binary file selected for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFile {
    /// Original file name, used only for its extension.
    pub name: String,
    /// Raw payload.
    pub bytes: Vec<u8>,
}

impl MediaFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    /// Payload size in bytes.
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Why a file was refused before any upload was attempted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MediaRejection {
    #[error("File too large. Maximum size is {}", human_size(.limit))]
    TooLarge { size: u64, limit: u64 },

    #[error("Unsupported media type: {0}")]
    Unsupported(String),
}

/// Check size then declared type. A file exactly at `limit` passes.
pub fn screen(
    size: u64,
    declared_type: &str,
    limit: u64,
) -> Result<MediaCategory, MediaRejection> {
    if size > limit {
        return Err(MediaRejection::TooLarge { size, limit });
    }
    MediaCategory::from_declared_type(declared_type)
        .ok_or_else(|| MediaRejection::Unsupported(declared_type.to_string()))
}

/// Lower-cased extension of `name`.
///
/// Falls back to the declared subtype (`image/png` gives `png`) when the
/// name has no extension.
pub fn extension_for(name: &str, declared_type: &str) -> String {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => ext.to_lowercase(),
        _ => declared_type
            .parse::<mime::Mime>()
            .map(|m| m.subtype().as_str().to_lowercase())
            .unwrap_or_else(|_| "bin".to_string()),
    }
}

/// Random lowercase base-36 suffix.
pub fn random_suffix<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..SUFFIX_LEN)
        .map(|_| char::from(BASE36[rng.gen_range(0..BASE36.len())]))
        .collect()
}

/// `<epoch-ms>-<suffix>.<ext>`
pub fn storage_file_name(now_ms: u64, suffix: &str, ext: &str) -> String {
    format!("{now_ms}-{suffix}.{ext}")
}

/// Render a byte count as whole megabytes, or bytes below 1 MiB.
fn human_size(bytes: &u64) -> String {
    const MIB: u64 = 1024 * 1024;
    let bytes = *bytes;
    if bytes >= MIB {
        format!("{} MB", (bytes + MIB / 2) / MIB)
    } else {
        format!("{bytes} bytes")
    }
}
