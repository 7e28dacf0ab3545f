use axum::{
    body::Body,
    extract::{OriginalUri, State},
    http::{header, HeaderMap, HeaderValue, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::{RelayError, Result};
use crate::fetch::{Fetch, FetchResult, ForwardHeaders};
use crate::playlist::{decode_target_url, is_manifest, PROXY_PREFIX};
use crate::state::AppState;

/// Media type of every rewritten playlist.
pub const MANIFEST_CONTENT_TYPE: &str = "application/vnd.apple.mpegurl";

/// Bytes of a body inspected for the `#EXTM3U` magic.
const SNIFF_BYTES: usize = 1024;

/// Health check endpoint
pub async fn health_check() -> (StatusCode, &'static str) {
    (StatusCode::OK, "OK")
}

/// Target URL carried by a `/proxy/<encoded url>` request.
///
/// The raw path is used so the target is decoded exactly once. A query
/// string on the relay request is passed on to the target.
pub fn target_url(uri: &Uri) -> Result<String> {
    let encoded = uri.path().strip_prefix(PROXY_PREFIX).unwrap_or("");
    let mut target = decode_target_url(encoded)
        .ok_or_else(|| RelayError::InvalidTargetUrl(encoded.to_string()))?;

    if let Some(query) = uri.query().filter(|q| !q.is_empty()) {
        target.push(if target.contains('?') { '&' } else { '?' });
        target.push_str(query);
    }

    Ok(target)
}

/// Relay handler mapped to `/proxy/{*path}`
pub async fn handle_proxy<F: Fetch + 'static>(
    State(state): State<Arc<AppState<F>>>,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
) -> Result<Response> {
    let target = target_url(&uri)?;
    let forward = ForwardHeaders::from_headers(&headers);

    info!("Relaying {}", target);
    let fetched = state.relay.fetcher().fetch(&target, &forward).await?;

    let mut response_headers = upstream_headers(&fetched);
    if !response_headers.contains_key(header::CACHE_CONTROL) {
        if let Ok(value) =
            HeaderValue::from_str(&format!("public, max-age={}", state.config.cache_ttl_secs))
        {
            response_headers.insert(header::CACHE_CONTROL, value);
        }
    }

    let sniff = String::from_utf8_lossy(&fetched.body[..fetched.body.len().min(SNIFF_BYTES)]);
    if !is_manifest(&sniff, &fetched.content_type) {
        debug!(
            "Passing through {} ({:?}, {} bytes)",
            target,
            fetched.content_type,
            fetched.body.len()
        );
        return Ok((StatusCode::OK, response_headers, Body::from(fetched.body)).into_response());
    }

    info!("Rewriting playlist {}", target);
    let playlist = state
        .relay
        .dispatch(&target, &fetched.text(), &fetched.content_type, 0)
        .await?;

    response_headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(MANIFEST_CONTENT_TYPE),
    );

    Ok((StatusCode::OK, response_headers, playlist).into_response())
}

/// Upstream headers minus those describing the original transfer.
/// Upstream CORS headers are dropped; the relay sets its own.
fn upstream_headers(fetched: &FetchResult) -> HeaderMap {
    let mut headers = HeaderMap::new();
    for (name, value) in &fetched.headers {
        if name == header::CONTENT_LENGTH
            || name == header::TRANSFER_ENCODING
            || name == header::CONNECTION
            || name.as_str().starts_with("access-control-")
        {
            continue;
        }
        headers.append(name.clone(), value.clone());
    }
    headers
}
