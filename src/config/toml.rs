//! TOML configuration file parsing.

use std::path::Path;

use serde::Deserialize;

use super::ConfigError;

/// Root configuration structure from TOML file.
///
/// All fields are optional so the file can be merged with CLI arguments.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    /// Static server configuration
    #[serde(default)]
    pub server: ServerSection,

    /// Dynamic address lookup configuration
    #[serde(default)]
    pub dynamic: DynamicSection,

    /// Cache persistence configuration
    #[serde(default)]
    pub cache: CacheSection,
}

/// Static server section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    /// Static default server address
    pub address: Option<String>,

    /// Always resolve to the compiled-in testing address
    #[serde(default)]
    pub testing: bool,
}

/// Dynamic lookup section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DynamicSection {
    /// Enable the remote lookup (default: true)
    pub enabled: Option<bool>,

    /// Lookup endpoint returning `{"address": "..."}`
    pub lookup_url: Option<String>,

    /// Cache validity window in milliseconds
    pub ttl_ms: Option<u64>,
}

/// Cache persistence section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CacheSection {
    /// Path of the cache file; `~` expands to the home directory
    pub file: Option<String>,

    /// Persist the cache across runs (default: true)
    pub persist: Option<bool>,
}

impl TomlConfig {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::from)
    }
}

/// Generates a default configuration file with comments.
#[must_use]
pub fn default_config_template() -> String {
    r#"# dynaddr configuration file

[server]
# Static default server address (required)
# Overwritten in memory by every successful dynamic lookup.
# address = "https://api.example.com"

# Always resolve to the compiled-in testing address
# testing = false

[dynamic]
# Let the remote lookup override the static address (default: true)
# enabled = true

# Lookup endpoint (required while dynamic is enabled)
# Must answer GET with a JSON body such as {"address": "https://a.example"}
# lookup_url = "https://config.example.com/server-address"

# Cache validity window in milliseconds (default: 3600000)
# ttl_ms = 3600000

[cache]
# Cache file location (default: platform data directory)
# file = "~/.local/share/dynaddr/cache.json"

# Persist the cache across runs (default: true)
# persist = true
"#
    .to_string()
}
