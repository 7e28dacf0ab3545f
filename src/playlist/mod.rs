//! Playlist rewriting module
//!
//! This module holds the manifest transformation engine:
//! - Base URL derivation and reference resolution
//! - Proxy path encoding of absolute URLs
//! - Manifest classification (not a manifest / media / master)
//! - Line-oriented rewriting of media playlists
//! - Best-variant selection in master playlists

// helper.
macro_rules! regex {
    ($re:literal $(,)?) => {{
        static RE: std::sync::OnceLock<regex::Regex> = std::sync::OnceLock::new();
        RE.get_or_init(|| regex::Regex::new($re).unwrap())
    }};
}

pub mod classify;
pub mod master;
pub mod media;
pub mod proxy_path;
pub mod url;

pub use classify::{classify, is_manifest, is_master_manifest, ManifestKind};
pub use master::{select_variant, Variant, VariantChoice};
pub use media::rewrite_media_playlist;
pub use proxy_path::{decode_target_url, to_proxy_path, PROXY_PREFIX};
pub use self::url::{derive_base_url, origin, resolve_url};
