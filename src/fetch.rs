//! Upstream content fetching.
//!
//! The relay core only depends on the [`Fetch`] trait; [`HttpFetcher`] is
//! the reqwest-backed implementation used by the server.

use bytes::Bytes;
use http::header::{self, HeaderMap, HeaderName, HeaderValue};
use std::borrow::Cow;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

use crate::config::ServerConfig;
use crate::error::{RelayError, Result};
use crate::playlist::origin;
use crate::user_agent::UserAgentPool;

/// Accept-Language sent when the client did not supply one.
pub const DEFAULT_ACCEPT_LANGUAGE: &str = "zh-CN,zh;q=0.9,en;q=0.8";

/// Longest prefix of an upstream error body kept in the error message.
const ERROR_BODY_CHARS: usize = 200;

/// A successfully fetched upstream response.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub body: Bytes,
    pub content_type: String,
    /// Upstream response headers, in order.
    pub headers: Vec<(HeaderName, HeaderValue)>,
}

impl FetchResult {
    /// Body as text, replacing invalid UTF-8.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

/// Inbound request headers passed on to the origin.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForwardHeaders {
    pub accept: Option<String>,
    pub accept_language: Option<String>,
    pub referer: Option<String>,
}

impl ForwardHeaders {
    /// Pick the forwardable headers from an inbound request.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let get = |name: HeaderName| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };
        Self {
            accept: get(header::ACCEPT),
            accept_language: get(header::ACCEPT_LANGUAGE),
            referer: get(header::REFERER),
        }
    }
}

/// Fetches a URL on behalf of the relay.
pub trait Fetch: Send + Sync {
    /// GET `url`. Non-success statuses fail with [`RelayError::Upstream`],
    /// transport failures with [`RelayError::Network`].
    fn fetch(
        &self,
        url: &str,
        forward: &ForwardHeaders,
    ) -> impl Future<Output = Result<FetchResult>> + Send;
}

/// reqwest-backed fetcher.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    user_agents: UserAgentPool,
    accept_language: String,
}

impl HttpFetcher {
    pub fn new(
        timeout: Duration,
        user_agents: UserAgentPool,
        accept_language: String,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::limited(10))
            .timeout(timeout)
            .build()
            .map_err(|e| RelayError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            user_agents,
            accept_language,
        })
    }

    /// Build a fetcher from the server configuration.
    pub fn from_config(config: &ServerConfig) -> Result<Self> {
        Self::new(
            Duration::from_secs(config.fetch_timeout_secs),
            UserAgentPool::new(config.user_agents.clone()),
            config.accept_language.clone(),
        )
    }

    pub fn user_agents(&self) -> &UserAgentPool {
        &self.user_agents
    }

    fn network_error(url: &str, err: reqwest::Error) -> RelayError {
        RelayError::Network {
            url: url.to_string(),
            message: err.to_string(),
        }
    }
}

impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &str, forward: &ForwardHeaders) -> Result<FetchResult> {
        let referer = forward
            .referer
            .clone()
            .or_else(|| origin(url))
            .unwrap_or_default();

        let mut request = self
            .client
            .get(url)
            .header(header::USER_AGENT, self.user_agents.choose())
            .header(header::ACCEPT, forward.accept.as_deref().unwrap_or("*/*"))
            .header(
                header::ACCEPT_LANGUAGE,
                forward
                    .accept_language
                    .as_deref()
                    .unwrap_or(&self.accept_language),
            );
        if !referer.is_empty() {
            request = request.header(header::REFERER, referer.as_str());
        }

        debug!("Fetching {} (referer: {:?})", url, referer);

        let response = request
            .send()
            .await
            .map_err(|e| Self::network_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            debug!("Upstream returned {} for {}", status, url);
            return Err(RelayError::Upstream {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("").to_string(),
                url: url.to_string(),
                body: body.chars().take(ERROR_BODY_CHARS).collect(),
            });
        }

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();

        let body = response
            .bytes()
            .await
            .map_err(|e| Self::network_error(url, e))?;

        debug!(
            "Fetched {}: content-type {:?}, {} bytes",
            url,
            content_type,
            body.len()
        );

        Ok(FetchResult {
            body,
            content_type,
            headers,
        })
    }
}
