//! URL classification.
//!
//! Decides whether an input already points at playable video (a file or a
//! known hosting service) or is a web page that still has to be scraped.

/// File extensions that mark a URL as a video resource.
pub const VIDEO_EXTENSIONS: &[&str] = &[".mp4", ".webm", ".m3u8", ".mov", ".avi", ".mkv", ".flv"];

/// Host fragments of video platforms the external downloader understands.
pub const VIDEO_SERVICES: &[&str] = &[
    "wistia.com",
    "wistia.net",
    "vimeo.com",
    "youtube.com",
    "youtu.be",
    "vidyard.com",
    "brightcove",
    "jwplatform",
    "loom.com",
    "sproutvideo",
];

/// Raw files worth streaming directly when the input itself is a video URL.
pub const DIRECT_INPUT_FILE_EXTENSIONS: &[&str] = &[".mp4", ".webm", ".mov"];

/// Raw files worth streaming directly when found on a page.
pub const CANDIDATE_FILE_EXTENSIONS: &[&str] = &[".mp4", ".webm"];

/// Returns `true` if `url` should be downloaded as-is rather than scraped.
///
/// Matching is a case-insensitive substring test, so query strings and
/// odd casing (`CLIP.MP4?x=1`) still count.
#[must_use]
pub fn is_direct_video_url(url: &str) -> bool {
    let lower = url.to_lowercase();
    VIDEO_EXTENSIONS.iter().any(|ext| lower.contains(ext))
        || VIDEO_SERVICES.iter().any(|svc| lower.contains(svc))
}

/// Returns `true` if `url` contains any of `extensions` (case-insensitive).
#[must_use]
pub fn has_extension(url: &str, extensions: &[&str]) -> bool {
    let lower = url.to_lowercase();
    extensions.iter().any(|ext| lower.contains(ext))
}
