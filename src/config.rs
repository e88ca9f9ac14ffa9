//! Configuration management for schema-builder
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (schema-builder.toml)
//! - Environment variables (SCHEMA_BUILDER__*)
//!
//! ## Example config file (schema-builder.toml):
//! ```toml
//! [schema]
//! path = "schemas/aws_types.yaml"
//! namespace = "aws"
//!
//! [naming]
//! case_aliases = true
//! uncountable = ["Statistics"]
//!
//! [naming.irregular]
//! Metric = "MetricsCollection"
//!
//! [lint]
//! enabled = true
//! deny_warnings = false
//!
//! [output]
//! format = "pretty"
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuilderConfig {
    /// Schema source settings
    #[serde(default)]
    pub schema: SchemaSourceConfig,

    /// Accessor naming
    #[serde(default)]
    pub naming: NamingConfig,

    /// Lint pass settings
    #[serde(default)]
    pub lint: LintConfig,

    /// Output settings
    #[serde(default)]
    pub output: OutputConfig,
}

/// Where the schema comes from
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaSourceConfig {
    /// Path to the schema document (.yaml, .yml or .json)
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Label for the compiled registry (e.g. "aws", "openstack")
    #[serde(default)]
    pub namespace: Option<String>,
}

/// Naming configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamingConfig {
    /// Also bind the first-letter-swapped form of each accessor name
    #[serde(default = "default_true")]
    pub case_aliases: bool,

    /// Extra words whose singular and plural forms are identical
    #[serde(default)]
    pub uncountable: Vec<String>,

    /// Extra irregular inflections, singular -> plural
    #[serde(default)]
    pub irregular: BTreeMap<String, String>,
}

/// Lint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LintConfig {
    /// Run the lint pass before building
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Treat warnings as failures (CLI exit code only, never the build itself)
    #[serde(default)]
    pub deny_warnings: bool,
}

/// Output configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
}

/// Output format for JSON
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Pretty,
    Compact,
}

impl OutputFormat {
    /// Render a JSON value in this format
    pub fn render(&self, value: &serde_json::Value) -> serde_json::Result<String> {
        match self {
            OutputFormat::Pretty => serde_json::to_string_pretty(value),
            OutputFormat::Compact => serde_json::to_string(value),
        }
    }
}

fn default_true() -> bool {
    true
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            case_aliases: true,
            uncountable: Vec::new(),
            irregular: BTreeMap::new(),
        }
    }
}

impl Default for LintConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            deny_warnings: false,
        }
    }
}

impl BuilderConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration, layering an explicit file on top of the defaults
    pub fn load_from(config_path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        let config_locations = [
            "schema-builder.toml",
            ".schema-builder.toml",
            "config/schema-builder.toml",
        ];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        if let Some(config_dir) = directories::ProjectDirs::from("dev", "familiar", "schema-builder") {
            let xdg_config = config_dir.config_dir().join("schema-builder.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // SCHEMA_BUILDER__LINT__DENY_WARNINGS=true
        builder = builder.add_source(
            Environment::with_prefix("SCHEMA_BUILDER")
                .prefix_separator("__")
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

    /// Schema path, resolved against the current directory
    pub fn schema_path(&self) -> Option<PathBuf> {
        self.schema.path.as_ref().map(|p| {
            if p.is_absolute() {
                p.clone()
            } else {
                std::env::current_dir().unwrap_or_default().join(p)
            }
        })
    }
}
