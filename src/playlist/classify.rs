//! Manifest detection.
//!
//! Third-party origins are sloppy with `Content-Type`, so a body is treated
//! as a manifest when either the media type or the `#EXTM3U` magic says so.

/// Media types that name an HLS playlist.
const MANIFEST_MEDIA_TYPES: &[&str] = &[
    "application/vnd.apple.mpegurl",
    "application/x-mpegurl",
    "audio/mpegurl",
    "audio/x-mpegurl",
];

/// First line of every HLS playlist.
pub const MANIFEST_MAGIC: &str = "#EXTM3U";

/// What a fetched body turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestKind {
    NotManifest,
    Media,
    Master,
}

/// Whether the body is an HLS playlist of any kind.
pub fn is_manifest(content: &str, content_type: &str) -> bool {
    let content_type = content_type.to_ascii_lowercase();
    if MANIFEST_MEDIA_TYPES
        .iter()
        .any(|t| content_type.contains(t))
    {
        return true;
    }
    content
        .trim_start_matches('\u{feff}')
        .trim_start()
        .starts_with(MANIFEST_MAGIC)
}

/// Whether a playlist declares variant streams or rendition groups.
pub fn is_master_manifest(content: &str) -> bool {
    content.contains("#EXT-X-STREAM-INF") || content.contains("#EXT-X-MEDIA:")
}

pub fn classify(content: &str, content_type: &str) -> ManifestKind {
    if !is_manifest(content, content_type) {
        ManifestKind::NotManifest
    } else if is_master_manifest(content) {
        ManifestKind::Master
    } else {
        ManifestKind::Media
    }
}
