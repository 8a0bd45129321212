/// Configuration management for the schema.gov.it MCP server
///
/// Handles configuration from multiple sources:
/// - Built-in defaults
/// - TOML configuration file
/// - Environment variables
/// - Runtime validation
use crate::error::{Result, SchemaGovError};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const DEFAULT_SPARQL_ENDPOINT: &str = "https://schema.gov.it/sparql";
pub const DEFAULT_USAGE_LOG_FILE: &str = "usage_log.jsonl";

/// Complete configuration for the MCP server
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SchemaGovConfig {
    pub server: ServerConfig,
    pub endpoint: EndpointConfig,
    pub usage_log: UsageLogConfig,
    pub preview: PreviewConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub name: String,
    pub log_level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    /// SPARQL query endpoint every operation is sent to
    pub url: String,
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UsageLogConfig {
    pub enabled: bool,
    /// JSON-lines file, relative paths resolve against the working directory
    pub path: PathBuf,
}

/// Limits for the distribution preview operation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    pub timeout_secs: u64,
    pub max_json_items: usize,
    pub max_text_lines: usize,
    pub max_fallback_chars: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: "schema-gov-it".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_SPARQL_ENDPOINT.to_string(),
            user_agent: format!("schemagov-mcp/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl Default for UsageLogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: PathBuf::from(DEFAULT_USAGE_LOG_FILE),
        }
    }
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            max_json_items: 10,
            max_text_lines: 15,
            max_fallback_chars: 2000,
        }
    }
}

impl UsageLogConfig {
    /// Absolute location of the log file
    pub fn resolved_path(&self) -> PathBuf {
        if self.path.is_absolute() {
            return self.path.clone();
        }
        env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(&self.path)
    }
}

/// Configuration manager with environment variable and file support
pub struct ConfigManager;

impl ConfigManager {
    /// Load configuration from multiple sources (environment > file > defaults)
    pub fn load_config(config_file: Option<PathBuf>) -> Result<SchemaGovConfig> {
        let mut config = SchemaGovConfig::default();

        if let Some(config_path) = config_file {
            if config_path.exists() {
                config = Self::load_from_file(&config_path)?;
                info!("Configuration loaded from file: {:?}", config_path);
            } else {
                warn!(
                    "Configuration file not found: {:?}, using defaults",
                    config_path
                );
            }
        }

        config = Self::apply_environment_overrides(config);

        Self::validate_config(&config)?;

        debug!("Final configuration: {:#?}", config);
        Ok(config)
    }

    /// Load configuration from TOML file
    fn load_from_file(path: &Path) -> Result<SchemaGovConfig> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<SchemaGovConfig> {
        toml::from_str(content)
            .map_err(|e| SchemaGovError::Configuration(format!("Invalid TOML config: {}", e)))
    }

    fn apply_environment_overrides(mut config: SchemaGovConfig) -> SchemaGovConfig {
        if let Ok(url) = env::var("SCHEMAGOV_SPARQL_ENDPOINT") {
            config.endpoint.url = url;
            debug!("Override SPARQL endpoint from environment");
        }

        if let Ok(path) = env::var("SCHEMAGOV_USAGE_LOG") {
            config.usage_log.path = PathBuf::from(path);
            debug!("Override usage log path from environment");
        }

        if let Ok(enabled) = env::var("SCHEMAGOV_USAGE_LOG_ENABLED") {
            config.usage_log.enabled = enabled == "1" || enabled.eq_ignore_ascii_case("true");
            debug!("Override usage log enable from environment");
        }

        if let Ok(timeout) = env::var("SCHEMAGOV_PREVIEW_TIMEOUT") {
            if let Ok(secs) = timeout.parse::<u64>() {
                config.preview.timeout_secs = secs;
                debug!("Override preview timeout from environment");
            }
        }

        if let Ok(log_level) = env::var("RUST_LOG") {
            config.server.log_level = log_level;
        }

        config
    }

    fn validate_config(config: &SchemaGovConfig) -> Result<()> {
        let endpoint = url::Url::parse(&config.endpoint.url).map_err(|e| {
            SchemaGovError::Configuration(format!(
                "Invalid SPARQL endpoint '{}': {}",
                config.endpoint.url, e
            ))
        })?;

        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(SchemaGovError::Configuration(format!(
                "SPARQL endpoint must use http or https, got '{}'",
                endpoint.scheme()
            )));
        }

        if config.usage_log.path.as_os_str().is_empty() {
            return Err(SchemaGovError::Configuration(
                "Empty usage log path".to_string(),
            ));
        }

        if config.preview.timeout_secs == 0 {
            return Err(SchemaGovError::Configuration(
                "Invalid preview timeout: 0".to_string(),
            ));
        }

        if config.preview.max_json_items == 0 || config.preview.max_text_lines == 0 {
            warn!("Preview limits of 0 produce empty previews");
        }

        Ok(())
    }

    /// Generate example configuration file
    pub fn generate_example_config() -> String {
        let example = SchemaGovConfig::default();

        format!(
            "# schema.gov.it MCP Server Configuration\n\n\
            [server]\n\
            name = \"{}\"\n\
            log_level = \"{}\"\n\n\
            [endpoint]\n\
            url = \"{}\"\n\
            user_agent = \"{}\"\n\n\
            [usage_log]\n\
            enabled = {}\n\
            path = \"{}\"\n\n\
            [preview]\n\
            timeout_secs = {}\n\
            max_json_items = {}\n\
            max_text_lines = {}\n\
            max_fallback_chars = {}\n",
            example.server.name,
            example.server.log_level,
            example.endpoint.url,
            example.endpoint.user_agent,
            example.usage_log.enabled,
            example.usage_log.path.display(),
            example.preview.timeout_secs,
            example.preview.max_json_items,
            example.preview.max_text_lines,
            example.preview.max_fallback_chars,
        )
    }

    /// Get configuration summary for logging
    pub fn get_config_summary(config: &SchemaGovConfig) -> String {
        format!(
            "schema.gov.it MCP Configuration:\n\
            Endpoint: {}\n\
            Usage log: {} ({})\n\
            Preview: {}s timeout, {} JSON items, {} text lines",
            config.endpoint.url,
            config.usage_log.path.display(),
            if config.usage_log.enabled {
                "enabled"
            } else {
                "disabled"
            },
            config.preview.timeout_secs,
            config.preview.max_json_items,
            config.preview.max_text_lines,
        )
    }
}
