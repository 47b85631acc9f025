//! Front ends around the solver: a line-oriented batch stream and an HTTP
//! endpoint, both configured from an optional TOML file

pub mod batch;
pub mod http;

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::layout::LayoutConfig;

/// Errors that can occur when loading the service configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// `[server]` table
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Allowed CORS origin; `*` allows any
    pub origin: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 9100,
            origin: "*".to_string(),
        }
    }
}

/// `[layout]` table; unset values keep the engine defaults
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct LayoutSection {
    pub density_scale: Option<f64>,
    pub default_bias: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub server: ServerConfig,
    pub layout: LayoutSection,
}

impl ServiceConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: ServiceConfig = toml::from_str(content)?;
        if let Some(scale) = config.layout.density_scale {
            if !(scale.is_finite() && scale > 0.0) {
                return Err(ConfigError::Invalid(format!(
                    "density_scale must be positive, got {scale}"
                )));
            }
        }
        Ok(config)
    }

    /// Engine configuration with file overrides applied
    pub fn layout_config(&self) -> LayoutConfig {
        let mut config = LayoutConfig::default();
        if let Some(scale) = self.layout.density_scale {
            config = config.with_density_scale(scale);
        }
        if let Some(bias) = self.layout.default_bias {
            config = config.with_default_bias(bias);
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServiceConfig::from_str("").unwrap();
        assert_eq!(config.server.port, 9100);
        assert_eq!(config.server.origin, "*");
        assert_eq!(config.layout_config(), LayoutConfig::default());
    }

    #[test]
    fn test_partial_file() {
        let config = ServiceConfig::from_str(
            r#"
            [server]
            port = 8080

            [layout]
            density_scale = 3.0
            "#,
        )
        .unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.layout_config().density_scale, 3.0);
        assert_eq!(config.layout_config().default_bias, 0.5);
    }

    #[test]
    fn test_invalid_config() {
        assert!(matches!(
            ServiceConfig::from_str("[server\nport = 1"),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            ServiceConfig::from_str("[layout]\ndensity_scale = 0.0"),
            Err(ConfigError::Invalid(_))
        ));
    }
}
