//! Application configuration
//!
//! TOML-backed configuration for the window and Vulkan bootstrap. Values that
//! the original build toggled at compile time (validation layers) are explicit
//! configuration here, passed into the renderer at construction.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// IO error while reading a configuration file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error in a configuration file
    #[error("Parse error: {0}")]
    Parse(String),

    /// Configuration value failed validation
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Host window configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowConfig {
    /// Client-area width in pixels
    pub width: u32,
    /// Client-area height in pixels
    pub height: u32,
    /// Window title
    pub title: String,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            title: "OpenIG".to_string(),
        }
    }
}

/// Vulkan bootstrap configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VulkanConfig {
    /// Application name for Vulkan instance creation
    pub application_name: String,
    /// Application version (major, minor, patch)
    pub application_version: (u32, u32, u32),
    /// Whether to enable Vulkan validation layers (None = auto-detect from build type)
    pub enable_validation: Option<bool>,
}

impl VulkanConfig {
    /// Create a new Vulkan configuration
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            application_name: app_name.into(),
            application_version: (1, 0, 0),
            enable_validation: None,
        }
    }

    /// Set application version
    #[must_use]
    pub fn with_version(mut self, major: u32, minor: u32, patch: u32) -> Self {
        self.application_version = (major, minor, patch);
        self
    }

    /// Enable or disable validation layers
    #[must_use]
    pub fn with_validation(mut self, enabled: bool) -> Self {
        self.enable_validation = Some(enabled);
        self
    }

    /// Resolve the validation toggle, auto-detecting from the build profile
    /// when unset
    pub fn validation_enabled(&self) -> bool {
        self.enable_validation
            .unwrap_or(cfg!(debug_assertions))
    }
}

impl Default for VulkanConfig {
    fn default() -> Self {
        Self::new("OpenIG")
    }
}

/// Top-level application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Host window settings
    #[serde(default)]
    pub window: WindowConfig,
    /// Vulkan bootstrap settings
    #[serde(default)]
    pub vulkan: VulkanConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self =
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults when the
    /// file does not exist
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            Self::load_from_file(path)
        } else {
            log::debug!("No config file at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::Invalid(
                "Window dimensions must be non-zero".to_string(),
            ));
        }
        if self.vulkan.application_name.is_empty() {
            return Err(ConfigError::Invalid(
                "Application name cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();

        assert_eq!(config.window.width, 800);
        assert_eq!(config.window.height, 600);
        assert_eq!(config.window.title, "OpenIG");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_auto_detect() {
        let config = VulkanConfig::default();
        assert_eq!(config.validation_enabled(), cfg!(debug_assertions));

        assert!(VulkanConfig::default().with_validation(true).validation_enabled());
        assert!(!VulkanConfig::default().with_validation(false).validation_enabled());
    }

    #[test]
    fn test_parse_toml() {
        let config: AppConfig = toml::from_str(
            r#"
            [window]
            width = 1280
            height = 720
            title = "Test"

            [vulkan]
            application_name = "Test"
            application_version = [0, 2, 0]
            enable_validation = false
            "#,
        )
        .unwrap();

        assert_eq!(config.window.width, 1280);
        assert_eq!(config.vulkan.application_version, (0, 2, 0));
        assert_eq!(config.vulkan.enable_validation, Some(false));
    }

    #[test]
    fn test_rejects_zero_dimensions() {
        let mut config = AppConfig::default();
        config.window.width = 0;
        assert!(config.validate().is_err());
    }
}
