// ABOUTME: HTTP transport settings for the schema.gov.it MCP server
// ABOUTME: Bind host, port and SSE keep-alive, overridable through SCHEMAGOV_HTTP_* variables

use serde::{Deserialize, Serialize};

pub const DEFAULT_HTTP_HOST: &str = "127.0.0.1";
pub const DEFAULT_HTTP_PORT: u16 = 3000;
pub const DEFAULT_KEEP_ALIVE_SECONDS: u64 = 15;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpServerConfig {
    pub host: String,
    pub port: u16,
    /// SSE keep-alive interval in seconds
    pub keep_alive_seconds: u64,
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HTTP_HOST.to_string(),
            port: DEFAULT_HTTP_PORT,
            keep_alive_seconds: DEFAULT_KEEP_ALIVE_SECONDS,
        }
    }
}

impl HttpServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Unparseable values fall back to the defaults
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("SCHEMAGOV_HTTP_HOST")
                .unwrap_or_else(|_| DEFAULT_HTTP_HOST.to_string()),
            port: std::env::var("SCHEMAGOV_HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_HTTP_PORT),
            keep_alive_seconds: std::env::var("SCHEMAGOV_HTTP_KEEP_ALIVE")
                .ok()
                .and_then(|k| k.parse().ok())
                .unwrap_or(DEFAULT_KEEP_ALIVE_SECONDS),
        }
    }

    /// Command-line flags win over the environment
    pub fn with_overrides(mut self, host: Option<String>, port: Option<u16>) -> Self {
        if let Some(host) = host {
            self.host = host;
        }
        if let Some(port) = port {
            self.port = port;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        std::env::remove_var("SCHEMAGOV_HTTP_HOST");
        std::env::remove_var("SCHEMAGOV_HTTP_PORT");
        std::env::remove_var("SCHEMAGOV_HTTP_KEEP_ALIVE");
    }

    #[test]
    fn test_default_http_config() {
        let config = HttpServerConfig::default();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 3000);
        assert_eq!(config.keep_alive_seconds, 15);
    }

    #[test]
    fn test_bind_address() {
        let config = HttpServerConfig {
            host: "0.0.0.0".to_string(),
            port: 8080,
            keep_alive_seconds: 30,
        };
        assert_eq!(config.bind_address(), "0.0.0.0:8080");
    }

    #[test]
    fn test_cli_overrides() {
        let config = HttpServerConfig::default().with_overrides(None, Some(9090));
        assert_eq!(config.bind_address(), "127.0.0.1:9090");
    }

    #[test]
    #[serial]
    fn test_from_env_with_valid_values() {
        std::env::set_var("SCHEMAGOV_HTTP_HOST", "0.0.0.0");
        std::env::set_var("SCHEMAGOV_HTTP_PORT", "8080");
        std::env::set_var("SCHEMAGOV_HTTP_KEEP_ALIVE", "30");

        let config = HttpServerConfig::from_env();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8080);
        assert_eq!(config.keep_alive_seconds, 30);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_with_invalid_port() {
        std::env::set_var("SCHEMAGOV_HTTP_HOST", "localhost");
        std::env::set_var("SCHEMAGOV_HTTP_PORT", "not_a_number");
        std::env::set_var("SCHEMAGOV_HTTP_KEEP_ALIVE", "invalid");

        let config = HttpServerConfig::from_env();
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 3000);
        assert_eq!(config.keep_alive_seconds, 15);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_with_missing_vars() {
        clear_env();
        assert_eq!(HttpServerConfig::from_env(), HttpServerConfig::default());
    }
}
