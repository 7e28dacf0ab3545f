//! Encoding of absolute URLs into relay paths, and back.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use tracing::debug;

use super::url::is_absolute_http;

/// Route every rewritten reference points at.
pub const PROXY_PREFIX: &str = "/proxy/";

/// Characters left alone when encoding a URL as one path segment.
/// Matches the unreserved set of `encodeURIComponent`.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Wrap an absolute URL into `/proxy/<percent-encoded url>`.
///
/// An empty input yields an empty string.
pub fn to_proxy_path(absolute_url: &str) -> String {
    if absolute_url.is_empty() {
        return String::new();
    }
    format!(
        "{}{}",
        PROXY_PREFIX,
        utf8_percent_encode(absolute_url, COMPONENT)
    )
}

/// Decode the target URL carried in a request path segment.
///
/// The segment is percent-decoded once. Clients that send the URL without
/// encoding it are tolerated as long as the raw segment already looks like
/// an http(s) URL.
pub fn decode_target_url(encoded_path: &str) -> Option<String> {
    if encoded_path.is_empty() {
        debug!("Empty target path");
        return None;
    }

    let decoded = match percent_decode_str(encoded_path).decode_utf8() {
        Ok(decoded) => decoded.into_owned(),
        Err(e) => {
            debug!("Failed to decode target URL {:?}: {}", encoded_path, e);
            return None;
        }
    };

    if is_absolute_http(&decoded) {
        return Some(decoded);
    }

    debug!("Decoded target is not an http(s) URL: {:?}", decoded);
    if is_absolute_http(encoded_path) {
        debug!("Using unencoded target path as URL: {:?}", encoded_path);
        return Some(encoded_path.to_string());
    }
    None
}
