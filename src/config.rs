//! Server configuration

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::fetch::DEFAULT_ACCEPT_LANGUAGE;
use crate::user_agent::UserAgentPool;

/// Server configuration
///
/// Established once at startup and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Enable debug logging of the rewriting engine
    pub debug: bool,

    /// Advertised cache lifetime in seconds (Cache-Control hint only)
    pub cache_ttl_secs: u64,

    /// Maximum number of master-to-master playlist descents
    pub max_recursion: u32,

    /// User-Agent pool override
    pub user_agents: Option<Vec<String>>,

    /// Accept-Language sent upstream when the client has none
    pub accept_language: String,

    /// Upstream request timeout in seconds
    pub fetch_timeout_secs: u64,

    /// Log output format (pretty, json)
    pub log_format: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            debug: false,
            cache_ttl_secs: 86400,
            max_recursion: 5,
            user_agents: None,
            accept_language: DEFAULT_ACCEPT_LANGUAGE.to_string(),
            fetch_timeout_secs: 30,
            log_format: "pretty".to_string(),
        }
    }
}

impl ServerConfig {
    /// Get the socket address string
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Overlay settings from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_vars(|key| std::env::var(key).ok());
    }

    /// Overlay settings from `DEBUG`, `CACHE_TTL`, `MAX_RECURSION`,
    /// `USER_AGENTS_JSON` and `PORT`. Unparsable values are ignored.
    pub fn apply_vars<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = var("DEBUG") {
            self.debug = v.trim().eq_ignore_ascii_case("true");
        }
        if let Some(v) = var("CACHE_TTL") {
            match v.trim().parse() {
                Ok(ttl) => self.cache_ttl_secs = ttl,
                Err(_) => warn!("Ignoring invalid CACHE_TTL: {:?}", v),
            }
        }
        if let Some(v) = var("MAX_RECURSION") {
            match v.trim().parse() {
                Ok(max) => self.max_recursion = max,
                Err(_) => warn!("Ignoring invalid MAX_RECURSION: {:?}", v),
            }
        }
        if let Some(v) = var("USER_AGENTS_JSON") {
            if let Some(agents) = UserAgentPool::parse_json(&v) {
                self.user_agents = Some(agents);
            }
        }
        if let Some(v) = var("PORT") {
            match v.trim().parse() {
                Ok(port) => self.port = port,
                Err(_) => warn!("Ignoring invalid PORT: {:?}", v),
            }
        }
    }

    /// Default log filter when `RUST_LOG` is not set.
    pub fn default_log_filter(&self) -> &'static str {
        if self.debug {
            "hls_relay=debug,tower_http=debug"
        } else {
            "hls_relay=info,tower_http=info"
        }
    }
}
