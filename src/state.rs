//! Application state
//!
//! Built once at startup and shared read-only by every request:
//! - Server configuration
//! - The relay, which owns the upstream fetcher and the recursion limit

use crate::config::ServerConfig;
use crate::error::Result;
use crate::fetch::{Fetch, HttpFetcher};
use crate::relay::Relay;

/// Application state shared across all handlers
pub struct AppState<F = HttpFetcher> {
    /// Server configuration
    pub config: ServerConfig,

    /// Manifest relay
    pub relay: Relay<F>,
}

impl AppState<HttpFetcher> {
    /// Create a new AppState with a reqwest fetcher built from `config`
    pub fn new(config: ServerConfig) -> Result<Self> {
        let fetcher = HttpFetcher::from_config(&config)?;
        Ok(Self::with_fetcher(config, fetcher))
    }
}

impl<F: Fetch> AppState<F> {
    /// Create AppState around an existing fetcher
    pub fn with_fetcher(config: ServerConfig, fetcher: F) -> Self {
        let relay = Relay::new(fetcher, config.max_recursion);
        Self { config, relay }
    }
}
