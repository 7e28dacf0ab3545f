//! Configuration file support
//!
//! Loads server configuration from TOML files.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::config::ServerConfig;

/// Configuration file format
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    /// Server settings
    pub server: Option<ServerSettings>,
    /// Relay settings
    pub relay: Option<RelaySettings>,
    /// Logging settings
    pub logging: Option<LoggingSettings>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Host address to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RelaySettings {
    /// Maximum master playlist descents
    pub max_recursion: Option<u32>,
    /// Advertised cache lifetime in seconds
    pub cache_ttl_secs: Option<u64>,
    /// Upstream request timeout in seconds
    pub fetch_timeout_secs: Option<u64>,
    /// Default Accept-Language for upstream requests
    pub accept_language: Option<String>,
    /// User-Agent pool override
    pub user_agents: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Enable debug logging
    pub debug: Option<bool>,
    /// Output format (json, pretty)
    pub format: Option<String>,
}

impl ConfigFile {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: ConfigFile = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), content)?;
        Ok(())
    }

    /// Convert to ServerConfig, filling gaps with defaults
    pub fn into_server_config(self) -> ServerConfig {
        let mut config = ServerConfig::default();

        if let Some(server) = self.server {
            config.host = server.host;
            config.port = server.port;
        }

        if let Some(relay) = self.relay {
            if let Some(max) = relay.max_recursion {
                config.max_recursion = max;
            }
            if let Some(ttl) = relay.cache_ttl_secs {
                config.cache_ttl_secs = ttl;
            }
            if let Some(timeout) = relay.fetch_timeout_secs {
                config.fetch_timeout_secs = timeout;
            }
            if let Some(lang) = relay.accept_language {
                config.accept_language = lang;
            }
            if relay.user_agents.is_some() {
                config.user_agents = relay.user_agents;
            }
        }

        if let Some(logging) = self.logging {
            config.debug = logging.debug.unwrap_or(config.debug);
            if let Some(format) = logging.format {
                config.log_format = format;
            }
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config_file() {
        let toml = r#"
[server]
host = "127.0.0.1"
port = 9000

[relay]
max_recursion = 3
cache_ttl_secs = 600
user_agents = ["relay-test/1.0"]

[logging]
debug = true
format = "json"
"#;
        let file: ConfigFile = toml::from_str(toml).unwrap();
        let config = file.into_server_config();
        assert_eq!(config.socket_addr(), "127.0.0.1:9000");
        assert_eq!(config.max_recursion, 3);
        assert_eq!(config.cache_ttl_secs, 600);
        assert_eq!(config.fetch_timeout_secs, 30);
        assert_eq!(config.user_agents, Some(vec!["relay-test/1.0".to_string()]));
        assert!(config.debug);
        assert_eq!(config.log_format, "json");
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let file: ConfigFile = toml::from_str("[relay]\nmax_recursion = 1\n").unwrap();
        let config = file.into_server_config();
        assert_eq!(config.port, 3000);
        assert_eq!(config.max_recursion, 1);
        assert_eq!(config.cache_ttl_secs, 86400);
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let file = ConfigFile {
            server: Some(ServerSettings {
                host: "localhost".to_string(),
                port: 3100,
            }),
            relay: Some(RelaySettings {
                max_recursion: Some(7),
                ..Default::default()
            }),
            logging: None,
        };
        file.to_file(&path).unwrap();

        let loaded = ConfigFile::from_file(&path).unwrap().into_server_config();
        assert_eq!(loaded.port, 3100);
        assert_eq!(loaded.max_recursion, 7);
    }

    #[test]
    fn test_missing_file_errors() {
        assert!(ConfigFile::from_file("/nonexistent/hls-relay.toml").is_err());
    }
}
