//! tokenlens - see how confident a language model was, token by token
//!
//! This crate provides:
//! - Decoding of token-probability responses from a `/generate` endpoint
//! - A request lifecycle controller that renders responses as hoverable tokens
//! - A shared probability tooltip driven by pointer events
//! - Terminal and static HTML front ends

pub mod annotation;
pub mod client;
pub mod controller;
pub mod html;
pub mod surface;
pub mod term;
pub mod tooltip;

pub use annotation::{Annotation, GenerationResponse, TokenRecord};
pub use client::{ClientError, GenerationClient, GenerationRequest, HttpGenerationClient};
pub use controller::{ControllerState, ResponseController, ValidationError};
pub use tooltip::TooltipController;

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from loading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Configuration for tokenlens
#[derive(Debug, Clone, serde::Deserialize)]
pub struct TokenLensConfig {
    /// Log level: "error", "warn", "info", "debug" or "trace"
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Generation endpoint
    #[serde(default)]
    pub client: ClientConfig,
}

impl Default for TokenLensConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            client: ClientConfig::default(),
        }
    }
}

impl TokenLensConfig {
    /// Read and parse a TOML config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

fn default_log_level() -> String { "info".to_string() }

/// Configuration for the generation endpoint
#[derive(Debug, Clone, serde::Deserialize)]
pub struct ClientConfig {
    /// Server base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Path of the generation endpoint under `base_url`
    #[serde(default = "default_generate_path")]
    pub generate_path: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            generate_path: default_generate_path(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String { "http://localhost:8000".to_string() }
fn default_generate_path() -> String { "/generate".to_string() }
fn default_timeout_secs() -> u64 { 300 }

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_config_defaults_from_empty_file() {
        let config: TokenLensConfig = toml::from_str("").unwrap();
        assert_eq!(config.log_level, "info");
        assert_eq!(config.client.base_url, "http://localhost:8000");
        assert_eq!(config.client.generate_path, "/generate");
        assert_eq!(config.client.timeout_secs, 300);

        let fallback = TokenLensConfig::default();
        assert_eq!(fallback.log_level, config.log_level);
        assert_eq!(fallback.client.base_url, config.client.base_url);
    }

    #[test]
    fn test_config_partial_client_section() {
        let config: TokenLensConfig = toml::from_str(
            r#"
            log_level = "debug"

            [client]
            base_url = "http://gpu-box:9000"
            "#,
        )
        .unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.client.base_url, "http://gpu-box:9000");
        assert_eq!(config.client.timeout_secs, 300);
    }

    #[test]
    fn test_config_load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("tokenlens.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "[client]\ntimeout_secs = 30").unwrap();

        let config = TokenLensConfig::load(&path).unwrap();
        assert_eq!(config.client.timeout_secs, 30);
    }

    #[test]
    fn test_config_load_errors_name_the_path() {
        let dir = tempfile::TempDir::new().unwrap();

        let missing = dir.path().join("missing.toml");
        let err = TokenLensConfig::load(&missing).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("missing.toml"));

        let broken = dir.path().join("broken.toml");
        std::fs::write(&broken, "[client\n").unwrap();
        let err = TokenLensConfig::load(&broken).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
