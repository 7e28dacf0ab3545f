//! Manifest dispatch.
//!
//! [`Relay::dispatch`] is the single entry point the HTTP layer calls after
//! the initial fetch. Master playlists are followed into their best variant
//! until a media playlist is reached; each descent costs one level of the
//! recursion budget.

use tracing::{debug, warn};

use crate::error::{RelayError, Result};
use crate::fetch::{Fetch, ForwardHeaders};
use crate::playlist::{classify, is_manifest, rewrite_media_playlist, select_variant, ManifestKind};

/// Drives classification, rewriting and variant descent.
#[derive(Debug, Clone)]
pub struct Relay<F> {
    fetcher: F,
    max_recursion: u32,
}

impl<F: Fetch> Relay<F> {
    pub fn new(fetcher: F, max_recursion: u32) -> Self {
        Self {
            fetcher,
            max_recursion,
        }
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub fn max_recursion(&self) -> u32 {
        self.max_recursion
    }

    /// Turn the content fetched from `url` into what the client receives.
    ///
    /// Non-manifests come back unchanged, media playlists are rewritten and
    /// master playlists are resolved to the rewritten media playlist of their
    /// best variant.
    pub async fn dispatch(
        &self,
        url: &str,
        content: &str,
        content_type: &str,
        depth: u32,
    ) -> Result<String> {
        let mut url = url.to_string();
        let mut content = content.to_string();
        let mut content_type = content_type.to_string();
        let mut depth = depth;

        loop {
            match classify(&content, &content_type) {
                ManifestKind::NotManifest => return Ok(content),
                ManifestKind::Media => {
                    debug!("Media playlist: {} (depth {})", url, depth);
                    return Ok(rewrite_media_playlist(&url, &content));
                }
                ManifestKind::Master => {
                    debug!("Master playlist: {} (depth {})", url, depth);
                }
            }

            if depth > self.max_recursion {
                warn!(
                    "Recursion limit {} exceeded at {}",
                    self.max_recursion, url
                );
                return Err(RelayError::RecursionLimit {
                    max: self.max_recursion,
                    url,
                });
            }

            let Some(choice) = select_variant(&url, &content) else {
                debug!("No variant playlist in {}, treating as media playlist", url);
                return Ok(rewrite_media_playlist(&url, &content));
            };

            debug!(
                "Descending into {} (bandwidth {:?})",
                choice.url, choice.bandwidth
            );
            let fetched = self
                .fetcher
                .fetch(&choice.url, &ForwardHeaders::default())
                .await?;
            let text = fetched.text();

            if !is_manifest(&text, &fetched.content_type) {
                debug!(
                    "Variant {} is not a playlist (content-type {:?}), rewriting as media playlist",
                    choice.url, fetched.content_type
                );
                return Ok(rewrite_media_playlist(&choice.url, &text));
            }

            content = text.into_owned();
            content_type = fetched.content_type;
            url = choice.url;
            depth += 1;
        }
    }
}
