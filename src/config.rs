//! Configuration management for the Traveler application
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::TravelerError;
use crate::sanitizer::BoundaryRule;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable consulted when `llm.api_key` is not configured
pub const LLM_API_KEY_ENV: &str = "GROQ_API_KEY";
/// Environment variable consulted when `geocoding.access_token` is not configured
pub const GEOCODING_TOKEN_ENV: &str = "MAPBOX_ACCESS_TOKEN";

/// Root configuration structure for the Traveler application
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TravelerConfig {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// LLM provider configuration
    #[serde(default)]
    pub llm: LlmConfig,
    /// Geocoding API configuration
    #[serde(default)]
    pub geocoding: GeocodingConfig,
    /// Response sanitizer configuration
    #[serde(default)]
    pub sanitizer: SanitizerConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind
    #[serde(default = "default_server_host")]
    pub host: String,
    /// Port to listen on
    #[serde(default = "default_server_port")]
    pub port: u16,
    /// Whole-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u32,
    /// Maximum accepted request body in KB
    #[serde(default = "default_body_limit")]
    pub body_limit_kb: u32,
}

/// LLM provider configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Base URL of the OpenAI-compatible API
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,
    /// Model used for every itinerary request
    #[serde(default = "default_llm_model")]
    pub model: String,
    /// API key; falls back to the `GROQ_API_KEY` environment variable
    pub api_key: Option<String>,
    /// Request timeout in seconds
    #[serde(default = "default_llm_timeout")]
    pub timeout_seconds: u32,
    /// Upper bound on generated tokens
    #[serde(default = "default_llm_max_tokens")]
    pub max_tokens: u32,
}

/// Geocoding API configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodingConfig {
    /// Base URL of the places search endpoint
    #[serde(default = "default_geocoding_base_url")]
    pub base_url: String,
    /// Access token; falls back to the `MAPBOX_ACCESS_TOKEN` environment variable
    pub access_token: Option<String>,
    /// Maximum number of suggestions per query
    #[serde(default = "default_geocoding_limit")]
    pub limit: u8,
    /// Ask the API for prefix matches
    #[serde(default = "default_geocoding_autocomplete")]
    pub autocomplete: bool,
    /// Request timeout in seconds
    #[serde(default = "default_geocoding_timeout")]
    pub timeout_seconds: u32,
    /// Quiet period after the last keystroke before a lookup fires
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

/// Response sanitizer configuration settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SanitizerConfig {
    /// How the JSON object is located in the model response
    #[serde(default)]
    pub boundary: BoundaryRule,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty, compact or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_server_host() -> String {
    "0.0.0.0".to_string()
}

fn default_server_port() -> u16 {
    3000
}

fn default_request_timeout() -> u32 {
    90
}

fn default_body_limit() -> u32 {
    16
}

fn default_llm_base_url() -> String {
    "https://api.groq.com/openai/v1".to_string()
}

fn default_llm_model() -> String {
    "llama3-70b-8192".to_string()
}

fn default_llm_timeout() -> u32 {
    60
}

fn default_llm_max_tokens() -> u32 {
    2048
}

fn default_geocoding_base_url() -> String {
    "https://api.mapbox.com/geocoding/v5/mapbox.places".to_string()
}

fn default_geocoding_limit() -> u8 {
    5
}

fn default_geocoding_autocomplete() -> bool {
    true
}

fn default_geocoding_timeout() -> u32 {
    10
}

fn default_debounce_ms() -> u64 {
    500
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            request_timeout_seconds: default_request_timeout(),
            body_limit_kb: default_body_limit(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_llm_base_url(),
            model: default_llm_model(),
            api_key: None,
            timeout_seconds: default_llm_timeout(),
            max_tokens: default_llm_max_tokens(),
        }
    }
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            base_url: default_geocoding_base_url(),
            access_token: None,
            limit: default_geocoding_limit(),
            autocomplete: default_geocoding_autocomplete(),
            timeout_seconds: default_geocoding_timeout(),
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl ServerConfig {
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds.into())
    }

    #[must_use]
    pub fn body_limit_bytes(&self) -> usize {
        self.body_limit_kb as usize * 1024
    }
}

impl LlmConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.into())
    }

    /// Configured key, else the `GROQ_API_KEY` environment variable
    pub fn resolve_api_key(&self) -> Result<String> {
        match &self.api_key {
            Some(key) => Ok(key.clone()),
            None => env::var(LLM_API_KEY_ENV)
                .with_context(|| format!("Missing llm.api_key and {LLM_API_KEY_ENV} env var")),
        }
    }
}

impl GeocodingConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.into())
    }

    #[must_use]
    pub fn debounce_window(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Configured token, else the `MAPBOX_ACCESS_TOKEN` environment variable
    pub fn resolve_access_token(&self) -> Result<String> {
        match &self.access_token {
            Some(token) => Ok(token.clone()),
            None => env::var(GEOCODING_TOKEN_ENV).with_context(|| {
                format!("Missing geocoding.access_token and {GEOCODING_TOKEN_ENV} env var")
            }),
        }
    }
}

impl TravelerConfig {
    /// Load configuration from `config_path`, or the default location when `None`,
    /// then apply `TRAVELER_*` environment overrides
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        // Load from file if path is provided or use default location
        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path()
                .filter(|path| path.exists())
                .unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // TRAVELER_LLM__MODEL overrides llm.model
        builder = builder.add_source(
            Environment::with_prefix("TRAVELER")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: TravelerConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        // Apply defaults for missing values
        config.apply_defaults();

        // Validate configuration
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("traveler").join("config.toml"))
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.server.host.is_empty() {
            self.server.host = default_server_host();
        }
        if self.server.request_timeout_seconds == 0 {
            self.server.request_timeout_seconds = default_request_timeout();
        }
        if self.server.body_limit_kb == 0 {
            self.server.body_limit_kb = default_body_limit();
        }
        if self.llm.base_url.is_empty() {
            self.llm.base_url = default_llm_base_url();
        }
        if self.llm.model.is_empty() {
            self.llm.model = default_llm_model();
        }
        if self.llm.timeout_seconds == 0 {
            self.llm.timeout_seconds = default_llm_timeout();
        }
        if self.llm.max_tokens == 0 {
            self.llm.max_tokens = default_llm_max_tokens();
        }
        if self.geocoding.base_url.is_empty() {
            self.geocoding.base_url = default_geocoding_base_url();
        }
        if self.geocoding.limit == 0 {
            self.geocoding.limit = default_geocoding_limit();
        }
        if self.geocoding.timeout_seconds == 0 {
            self.geocoding.timeout_seconds = default_geocoding_timeout();
        }
        if self.geocoding.debounce_ms == 0 {
            self.geocoding.debounce_ms = default_debounce_ms();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_api_keys()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate API keys and credentials
    pub fn validate_api_keys(&self) -> Result<()> {
        // Both credentials may come from the environment at client creation instead
        if let Some(api_key) = &self.llm.api_key {
            if api_key.trim().is_empty() {
                return Err(TravelerError::config(
                    "LLM API key cannot be empty if provided. Either remove it or provide a valid key.",
                )
                .into());
            }

            if api_key.len() < 8 {
                return Err(TravelerError::config(
                    "LLM API key appears to be invalid (too short). Please check your API key.",
                )
                .into());
            }
        }

        if let Some(token) = &self.geocoding.access_token {
            if token.trim().is_empty() {
                return Err(TravelerError::config(
                    "Geocoding access token cannot be empty if provided. Either remove it or provide a valid token.",
                )
                .into());
            }
        }

        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.llm.timeout_seconds > 300 {
            return Err(TravelerError::config("LLM timeout cannot exceed 300 seconds").into());
        }

        if self.server.request_timeout_seconds < self.llm.timeout_seconds {
            return Err(TravelerError::config(
                "Server request timeout must be at least the LLM timeout",
            )
            .into());
        }

        if self.geocoding.timeout_seconds > 60 {
            return Err(
                TravelerError::config("Geocoding timeout cannot exceed 60 seconds").into(),
            );
        }

        if self.geocoding.limit > 10 {
            return Err(TravelerError::config("Geocoding limit cannot exceed 10").into());
        }

        if self.geocoding.debounce_ms > 5000 {
            return Err(TravelerError::config("Debounce window cannot exceed 5000 ms").into());
        }

        if self.server.body_limit_kb > 1024 {
            return Err(TravelerError::config("Request body limit cannot exceed 1024 KB").into());
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(TravelerError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "compact", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(TravelerError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        for (name, url) in [
            ("LLM", &self.llm.base_url),
            ("Geocoding", &self.geocoding.base_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(TravelerError::config(format!(
                    "{name} base URL must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = TravelerConfig::default();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.llm.model, "llama3-70b-8192");
        assert_eq!(config.geocoding.limit, 5);
        assert!(config.geocoding.autocomplete);
        assert_eq!(config.geocoding.debounce_window(), Duration::from_millis(500));
        assert_eq!(config.sanitizer.boundary, BoundaryRule::Outermost);
        assert_eq!(config.logging.level, "info");
        assert!(config.llm.api_key.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_short_api_key() {
        let mut config = TravelerConfig::default();
        config.llm.api_key = Some("abc".to_string());
        let result = config.validate_api_keys();
        assert!(result.unwrap_err().to_string().contains("too short"));
    }

    #[test]
    fn test_config_validation_invalid_log_level() {
        let mut config = TravelerConfig::default();
        config.logging.level = "invalid".to_string();
        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("Invalid log level"));
    }

    #[test]
    fn test_config_validation_numeric_ranges() {
        let mut config = TravelerConfig::default();
        config.geocoding.limit = 50;
        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("limit cannot exceed"));
    }

    #[test]
    fn test_config_validation_server_timeout_below_llm() {
        let mut config = TravelerConfig::default();
        config.server.request_timeout_seconds = 10;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_base_url_scheme() {
        let mut config = TravelerConfig::default();
        config.geocoding.base_url = "ftp://example.com".to_string();
        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("Geocoding base URL"));
    }

    #[test]
    fn test_apply_defaults_repairs_zero_values() {
        let mut config = TravelerConfig::default();
        config.geocoding.debounce_ms = 0;
        config.llm.model = String::new();
        config.apply_defaults();
        assert_eq!(config.geocoding.debounce_ms, 500);
        assert_eq!(config.llm.model, "llama3-70b-8192");
    }

    #[test]
    fn test_configured_key_takes_precedence() {
        let mut config = TravelerConfig::default();
        config.llm.api_key = Some("configured_key_123".to_string());
        assert_eq!(config.llm.resolve_api_key().unwrap(), "configured_key_123");

        config.geocoding.access_token = Some("pk.token".to_string());
        assert_eq!(config.geocoding.resolve_access_token().unwrap(), "pk.token");
    }

    #[test]
    fn test_load_from_toml_file() {
        let dir = std::env::temp_dir().join(format!("traveler-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "[server]\nport = 8080\n\n[geocoding]\ndebounce_ms = 250\n\n[sanitizer]\nboundary = \"balanced\"\n"
        )
        .unwrap();

        let config = TravelerConfig::load_from_path(Some(path)).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.geocoding.debounce_ms, 250);
        assert_eq!(config.sanitizer.boundary, BoundaryRule::Balanced);
        assert_eq!(config.llm.model, "llama3-70b-8192");

        std::fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_config_path_generation() {
        if let Some(path) = TravelerConfig::get_config_path() {
            assert!(path.to_string_lossy().contains("traveler"));
            assert!(path.to_string_lossy().contains("config.toml"));
        }
    }
}
