//! Configuration management for the params tool
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (params.toml)
//! - Environment variables (PARAMS__*)
//!
//! ## Example config file (params.toml):
//! ```toml
//! [load]
//! strict = true
//!
//! [output]
//! format = "compact"
//! render = false
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

use crate::param::LoadMode;

/// Main configuration for the params tool
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParamsConfig {
    /// Load settings
    #[serde(default)]
    pub load: LoadConfig,

    /// Output settings
    #[serde(default)]
    pub output: OutputConfig,
}

/// Load configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoadConfig {
    /// Fail when the document lacks an entry for a declared parameter
    #[serde(default)]
    pub strict: bool,
}

impl LoadConfig {
    pub fn mode(&self) -> LoadMode {
        LoadMode::from(self.strict)
    }
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Output format (pretty or compact)
    #[serde(default)]
    pub format: OutputFormat,

    /// Also print the text view of the tree
    #[serde(default = "default_true")]
    pub render: bool,
}

/// Output format for JSON
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Pretty,
    Compact,
}

fn default_true() -> bool {
    true
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Pretty,
            render: true,
        }
    }
}

impl ParamsConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration from a specific file
    pub fn load_from(config_path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        let config_locations = ["params.toml", ".params.toml", "config/params.toml"];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        // Load from XDG config directory
        if let Some(config_dir) = directories::ProjectDirs::from("dev", "familiar", "params") {
            let xdg_config = config_dir.config_dir().join("params.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // PARAMS__LOAD__STRICT=true, PARAMS__OUTPUT__FORMAT=compact, ...
        builder = builder.add_source(
            Environment::with_prefix("PARAMS")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Save configuration to a file
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }
}
