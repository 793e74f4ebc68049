//! Processor configuration via `quill.toml`
//!
//! One small file next to the documents being processed. `quill init` writes
//! the commented default below; edit it to point at a catalog.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use quill_core::{Error, Result, UsageLevel};

/// Config file name looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "quill.toml";

/// Connection settings for the metadata catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogConfig {
    /// Base URL of the catalog's REST API (e.g. "https://localhost:9443")
    pub endpoint: String,
    /// View server name inserted into request paths
    #[serde(default = "default_server")]
    pub server: String,
    /// User the requests are made as
    #[serde(default)]
    pub user: String,
    /// Password for basic authentication
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Bearer token; takes precedence over `password`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Request timeout in milliseconds (default: 30000)
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_server() -> String {
    "view-server".to_string()
}

fn default_timeout_ms() -> u64 {
    30_000
}

impl CatalogConfig {
    /// Request timeout as a `Duration`.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Processor configuration loaded from `quill.toml`.
///
/// # Example
///
/// ```toml
/// usage_level = "advanced"
/// local_qualifier = "Acme"
///
/// [catalog]
/// endpoint = "https://localhost:9443"
/// user = "operator"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuillConfig {
    /// Attribute visibility: `"basic"`, `"advanced"`, `"expert"` or `"invisible"`.
    #[serde(default = "default_usage_level_str")]
    pub usage_level: String,
    /// Optional prefix for synthesized qualified names.
    #[serde(default)]
    pub local_qualifier: String,
    /// Directory processed documents are written to.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Command table overriding the built-in one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commands: Option<PathBuf>,
    /// Catalog connection; absent means offline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog: Option<CatalogConfig>,
}

fn default_usage_level_str() -> String {
    "basic".to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Default for QuillConfig {
    fn default() -> Self {
        Self {
            usage_level: default_usage_level_str(),
            local_qualifier: String::new(),
            output_dir: default_output_dir(),
            commands: None,
            catalog: None,
        }
    }
}

impl QuillConfig {
    /// Parse the usage level string.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not one of the four tiers.
    pub fn usage_level(&self) -> Result<UsageLevel> {
        self.usage_level.parse::<UsageLevel>().map_err(|_| Error::Config {
            reason: format!(
                "Invalid usage_level '{}' in {}. Expected \"basic\", \"advanced\", \"expert\" or \"invisible\".",
                self.usage_level, CONFIG_FILE_NAME
            ),
        })
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# Quill configuration
#
# Attribute visibility: "basic" (default), "advanced", "expert" or "invisible".
# Higher levels reveal strictly more attributes.
usage_level = "basic"

# Prefix added to synthesized qualified names (default: none).
local_qualifier = ""

# Where processed documents are written.
output_dir = "."

# Replace the built-in command table with your own.
# commands = "commands.json"

# Metadata catalog connection. Without it, documents can only be
# displayed or processed with --offline.
# [catalog]
# endpoint = "https://localhost:9443"
# server = "view-server"
# user = "operator"
# password = "secret"        # basic authentication
# token = "..."              # or a bearer token
# timeout_ms = 30000
"#
    }

    /// Read and parse config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::Config {
            reason: format!("Failed to read config file '{}': {}", path.display(), e),
        })?;
        let config: QuillConfig = toml::from_str(&content).map_err(|e| Error::Config {
            reason: format!("Failed to parse config file '{}': {}", path.display(), e),
        })?;
        // Validate the usage level eagerly
        config.usage_level()?;
        Ok(config)
    }

    /// Read `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::from_file(path)
        } else {
            tracing::debug!(target: "quill::config", path = %path.display(), "No config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Write the default config file if it does not already exist.
    ///
    /// Returns `true` if the file was created.
    pub fn write_default_if_missing(path: &Path) -> Result<bool> {
        if path.exists() {
            return Ok(false);
        }
        std::fs::write(path, Self::default_toml()).map_err(|e| Error::Config {
            reason: format!(
                "Failed to write default config file '{}': {}",
                path.display(),
                e
            ),
        })?;
        Ok(true)
    }
}
