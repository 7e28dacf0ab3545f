//! User-Agent pool for upstream requests.

use rand::seq::SliceRandom;
use std::sync::Arc;
use tracing::{info, warn};

/// Agents used when no override is configured.
pub const DEFAULT_USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Safari/605.1.15",
];

/// Immutable set of User-Agent strings, built once at startup.
#[derive(Debug, Clone)]
pub struct UserAgentPool {
    agents: Arc<[String]>,
}

impl Default for UserAgentPool {
    fn default() -> Self {
        Self {
            agents: DEFAULT_USER_AGENTS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl UserAgentPool {
    /// Build a pool from an override list, falling back to the defaults
    /// when the list is absent or has no usable entry.
    pub fn new(overrides: Option<Vec<String>>) -> Self {
        let Some(agents) = overrides else {
            info!("No User-Agent override configured, using defaults");
            return Self::default();
        };
        let agents: Vec<String> = agents
            .into_iter()
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .collect();
        if agents.is_empty() {
            warn!("User-Agent override is empty, using defaults");
            return Self::default();
        }
        info!("Loaded {} User-Agent(s) from configuration", agents.len());
        Self {
            agents: agents.into(),
        }
    }

    /// Parse a JSON array of strings. `None` when the text is not a
    /// non-empty array of strings.
    pub fn parse_json(json: &str) -> Option<Vec<String>> {
        match serde_json::from_str::<Vec<String>>(json) {
            Ok(agents) if !agents.is_empty() => Some(agents),
            Ok(_) => {
                warn!("USER_AGENTS_JSON is an empty array, ignoring");
                None
            }
            Err(e) => {
                warn!("Failed to parse USER_AGENTS_JSON: {}, ignoring", e);
                None
            }
        }
    }

    /// Pick one agent uniformly at random.
    pub fn choose(&self) -> &str {
        self.agents
            .choose(&mut rand::thread_rng())
            .map(String::as_str)
            .unwrap_or(DEFAULT_USER_AGENTS[0])
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn agents(&self) -> &[String] {
        &self.agents
    }
}
