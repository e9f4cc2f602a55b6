//! HTTP Server Configuration
//!
//! Configuration for the HTTP server including host, port, CORS, and upload
//! limits.

use serde::{Deserialize, Serialize};

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpServerConfig {
    /// Host to bind to (default: "0.0.0.0")
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind to (default: 3001)
    #[serde(default = "default_port")]
    pub port: u16,

    /// CORS allowed origins; empty allows every origin
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Host suffix of deployment previews that are always allowed (default: ".vercel.app")
    #[serde(default = "default_preview_suffix")]
    pub cors_preview_suffix: Option<String>,

    /// Largest accepted upload request body in bytes (default: 100 MiB)
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,

    /// Interval between WebSocket pings in seconds (default: 30)
    #[serde(default = "default_ws_heartbeat_secs")]
    pub ws_heartbeat_secs: u64,

    /// Events buffered per realtime subscriber (default: 256)
    #[serde(default = "default_broadcast_capacity")]
    pub broadcast_capacity: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3001
}

fn default_preview_suffix() -> Option<String> {
    Some(".vercel.app".to_string())
}

fn default_max_upload_bytes() -> usize {
    100 * 1024 * 1024
}

fn default_ws_heartbeat_secs() -> u64 {
    30
}

fn default_broadcast_capacity() -> usize {
    256
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
            cors_preview_suffix: default_preview_suffix(),
            max_upload_bytes: default_max_upload_bytes(),
            ws_heartbeat_secs: default_ws_heartbeat_secs(),
            broadcast_capacity: default_broadcast_capacity(),
        }
    }
}

impl HttpServerConfig {
    /// Create a new config with specified port
    pub fn with_port(port: u16) -> Self {
        Self {
            port,
            ..Default::default()
        }
    }

    /// Get the socket address string
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Split a comma-separated origin list, dropping blanks
pub fn parse_origin_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = HttpServerConfig::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3001);
        assert!(config.cors_origins.is_empty());
        assert_eq!(config.cors_preview_suffix.as_deref(), Some(".vercel.app"));
    }

    #[test]
    fn test_socket_addr() {
        let config = HttpServerConfig::with_port(8080);
        assert_eq!(config.socket_addr(), "0.0.0.0:8080");
    }

    #[test]
    fn test_parse_origin_list() {
        assert_eq!(
            parse_origin_list(" https://a.com, ,https://b.com "),
            vec!["https://a.com".to_string(), "https://b.com".to_string()]
        );
        assert!(parse_origin_list("").is_empty());
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let config: HttpServerConfig = serde_json::from_str(r#"{"port": 4000}"#).unwrap();
        assert_eq!(config.port, 4000);
        assert_eq!(config.max_upload_bytes, 100 * 1024 * 1024);
    }
}
