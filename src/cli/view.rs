//! Plain-text rendering of posts for the terminal.

use std::fmt::Write as _;
use std::path::Path;

use chrono::{DateTime, Utc};

use crate::domain::post::Post;

/// Characters of body text shown in a list line.
pub const PREVIEW_LEN: usize = 150;

/// How a stored media path is presented, decided by its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
    Audio,
    Download,
}

impl MediaKind {
    pub fn from_path(path: &str) -> Self {
        match extension(path).as_deref() {
            Some("jpg" | "jpeg" | "png" | "gif" | "webp" | "svg") => Self::Image,
            Some("mp4" | "webm" | "mov" | "avi") => Self::Video,
            Some("mp3" | "wav" | "ogg" | "m4a" | "aac") => Self::Audio,
            _ => Self::Download,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
            Self::Audio => "audio",
            Self::Download => "download",
        }
    }
}

fn extension(path: &str) -> Option<String> {
    Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
}

/// Declared MIME type for a local file, guessed from its extension.
///
/// Anything outside the image/video/audio tables is
/// `application/octet-stream`, which upload screening refuses.
pub fn guess_media_type(name: &str) -> &'static str {
    match extension(name).as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        Some("mp4") => "video/mp4",
        Some("webm") => "video/webm",
        Some("mov") => "video/quicktime",
        Some("avi") => "video/x-msvideo",
        Some("mp3") => "audio/mpeg",
        Some("wav") => "audio/wav",
        Some("ogg") => "audio/ogg",
        Some("m4a") => "audio/mp4",
        Some("aac") => "audio/aac",
        _ => "application/octet-stream",
    }
}

/// Cut `text` to `max` characters, appending `...` when cut.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max).collect();
    format!("{}...", cut.trim())
}

/// `May 1, 2024`
pub fn short_date(at: &DateTime<Utc>) -> String {
    at.format("%b %-d, %Y").to_string()
}

/// `May 1, 2024 at 02:30 PM`
pub fn long_date(at: &DateTime<Utc>) -> String {
    at.format("%B %-d, %Y at %I:%M %p").to_string()
}

/// One list entry: id, date, title and preview.
pub fn list_line(post: &Post) -> String {
    format!(
        "{}  {}  {}\n    {}",
        post.id,
        short_date(&post.created_at),
        post.display_title(),
        truncate(&post.content, PREVIEW_LEN)
    )
}

/// Full post with one line per media item. `url` turns a stored path
/// into a fetchable link.
pub fn detail(post: &Post, url: impl Fn(&str) -> String) -> String {
    let mut out = format!(
        "{}\n{}\n\n{}\n",
        post.display_title(),
        long_date(&post.created_at),
        post.content
    );
    if !post.media.is_empty() {
        out.push('\n');
        for path in &post.media {
            let _ = writeln!(out, "[{}] {}", MediaKind::from_path(path).label(), url(path));
        }
    }
    out
}
