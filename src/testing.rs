//! In-memory fetcher for tests.

use bytes::Bytes;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::error::{RelayError, Result};
use crate::fetch::{Fetch, FetchResult, ForwardHeaders};

/// Serves canned responses by URL and records every request.
/// Unknown URLs answer 404.
#[derive(Debug, Clone, Default)]
pub struct MockFetcher {
    responses: HashMap<String, FetchResult>,
    requests: Arc<Mutex<Vec<(String, ForwardHeaders)>>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(mut self, url: &str, content_type: &str, body: &str) -> Self {
        self.responses.insert(
            url.to_string(),
            FetchResult {
                body: Bytes::from(body.to_string()),
                content_type: content_type.to_string(),
                headers: Vec::new(),
            },
        );
        self
    }

    pub fn with_manifest(self, url: &str, body: &str) -> Self {
        self.with_response(url, "application/vnd.apple.mpegurl", body)
    }

    pub fn with_result(mut self, url: &str, result: FetchResult) -> Self {
        self.responses.insert(url.to_string(), result);
        self
    }

    /// URLs requested so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|(url, _)| url.clone())
            .collect()
    }

    /// Forwarded headers of every request so far.
    pub fn forwarded(&self) -> Vec<ForwardHeaders> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|(_, headers)| headers.clone())
            .collect()
    }
}

impl Fetch for MockFetcher {
    async fn fetch(&self, url: &str, forward: &ForwardHeaders) -> Result<FetchResult> {
        self.requests
            .lock()
            .unwrap()
            .push((url.to_string(), forward.clone()));

        self.responses
            .get(url)
            .cloned()
            .ok_or_else(|| RelayError::Upstream {
                status: 404,
                reason: "Not Found".to_string(),
                url: url.to_string(),
                body: String::new(),
            })
    }
}
