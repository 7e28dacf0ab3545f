//! Variant selection in master playlists.
//!
//! Only the declared `BANDWIDTH` counts; there is no throughput
//! measurement. On equal bandwidth the variant listed later wins.

use tracing::debug;

use super::url::{derive_base_url, resolve_url};

/// A variant stream declared by `#EXT-X-STREAM-INF`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variant {
    pub bandwidth: u64,
    pub uri: String,
}

/// The playlist a master manifest descends into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantChoice {
    /// Absolute URL of the chosen playlist.
    pub url: String,
    /// Declared bandwidth; `None` when picked by the `.m3u8` fallback.
    pub bandwidth: Option<u64>,
}

fn is_uri_line(line: &str) -> bool {
    !line.is_empty() && !line.starts_with('#')
}

/// Read `BANDWIDTH` from a stream-inf line, without matching
/// `AVERAGE-BANDWIDTH`.
fn parse_bandwidth(line: &str) -> u64 {
    regex!(r"[:,]BANDWIDTH=(\d+)")
        .captures(line)
        .and_then(|caps| caps[1].parse().ok())
        .unwrap_or(0)
}

/// All variants in file order. A declaration without a following URI line
/// is skipped.
pub fn parse_variants(content: &str) -> Vec<Variant> {
    let lines: Vec<&str> = content.split('\n').collect();
    let mut variants = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        if lines[i].trim().starts_with("#EXT-X-STREAM-INF") {
            let bandwidth = parse_bandwidth(lines[i]);
            if let Some(j) = (i + 1..lines.len()).find(|&j| is_uri_line(lines[j].trim())) {
                variants.push(Variant {
                    bandwidth,
                    uri: lines[j].trim().to_string(),
                });
                i = j;
            }
        }
        i += 1;
    }

    variants
}

/// Highest-bandwidth variant; ties go to the later one.
pub fn best_variant(variants: &[Variant]) -> Option<&Variant> {
    variants.iter().fold(None, |best: Option<&Variant>, v| match best {
        Some(b) if v.bandwidth < b.bandwidth => Some(b),
        _ => Some(v),
    })
}

/// First non-comment line that names an `.m3u8` file.
fn first_playlist_uri(content: &str) -> Option<&str> {
    content
        .split('\n')
        .map(str::trim)
        .find(|line| is_uri_line(line) && regex!(r"(?i)\.m3u8(?:$|\?)").is_match(line))
}

/// Pick the playlist to descend into from a master playlist at `url`.
///
/// Returns `None` when the content names no usable playlist at all.
pub fn select_variant(url: &str, content: &str) -> Option<VariantChoice> {
    let base_url = derive_base_url(url);
    let variants = parse_variants(content);

    if let Some(best) = best_variant(&variants) {
        debug!(
            "Selected variant with bandwidth {} out of {}: {}",
            best.bandwidth,
            variants.len(),
            best.uri
        );
        return Some(VariantChoice {
            url: resolve_url(&base_url, &best.uri),
            bandwidth: Some(best.bandwidth),
        });
    }

    debug!("No BANDWIDTH variants in {}, looking for first playlist URI", url);
    let uri = first_playlist_uri(content)?;
    debug!("Fallback playlist URI: {}", uri);
    Some(VariantChoice {
        url: resolve_url(&base_url, uri),
        bandwidth: None,
    })
}
