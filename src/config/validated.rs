//! Validated configuration after merging CLI and TOML sources.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use url::Url;

use crate::context::ResolverSettings;

use super::cli::Cli;
use super::defaults;
use super::error::{ConfigError, field};
use super::toml::TomlConfig;

/// Fully validated configuration ready for use by the application.
///
/// Use [`ValidatedConfig::from_raw`] to build one from CLI args and an
/// optional TOML config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedConfig {
    /// Static default server address (required)
    pub server_address: String,

    /// Whether the testing override is active
    pub testing: bool,

    /// Whether the dynamic lookup may override the static address
    pub use_dynamic_address: bool,

    /// Lookup endpoint; always present while dynamic addressing is enabled
    pub lookup_url: Option<Url>,

    /// Cache validity window
    pub ttl: Duration,

    /// Cache file; `None` disables persistence
    pub cache_file: Option<PathBuf>,

    /// Verbose logging enabled
    pub verbose: bool,
}

impl fmt::Display for ValidatedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lookup = self
            .lookup_url
            .as_ref()
            .map_or_else(|| "none".to_string(), ToString::to_string);
        let cache_file = self
            .cache_file
            .as_ref()
            .map_or_else(|| "none".to_string(), |p| p.display().to_string());

        write!(
            f,
            "Config {{ server_address: {}, testing: {}, dynamic: {}, lookup_url: {}, \
             ttl: {}ms, cache_file: {} }}",
            self.server_address,
            self.testing,
            self.use_dynamic_address,
            lookup,
            self.ttl.as_millis(),
            cache_file,
        )
    }
}

impl ValidatedConfig {
    /// Creates a validated configuration from CLI arguments and optional TOML config.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `server.address` is missing or not a valid URL
    /// - dynamic addressing is enabled and `dynamic.lookup_url` is missing or invalid
    /// - the TTL is zero
    pub fn from_raw(cli: &Cli, toml: Option<&TomlConfig>) -> Result<Self, ConfigError> {
        let server_address = Self::resolve_server_address(cli, toml)?;

        let testing = cli.testing || toml.is_some_and(|t| t.server.testing);

        let use_dynamic_address = !cli.static_only
            && toml
                .and_then(|t| t.dynamic.enabled)
                .unwrap_or(defaults::DYNAMIC_ENABLED);

        let lookup_url = Self::resolve_lookup_url(cli, toml, use_dynamic_address)?;

        let ttl = Self::resolve_ttl(cli, toml)?;

        let cache_file = Self::resolve_cache_file(cli, toml);

        Ok(Self {
            server_address,
            testing,
            use_dynamic_address,
            lookup_url,
            ttl,
            cache_file,
            verbose: cli.verbose,
        })
    }

    /// Loads and merges configuration from CLI and optional config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed, or if
    /// the merged configuration is invalid.
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let toml = if let Some(ref path) = cli.config {
            Some(TomlConfig::load(path)?)
        } else {
            None
        };

        Self::from_raw(cli, toml.as_ref())
    }

    /// Resolution settings derived from this configuration.
    #[must_use]
    pub fn resolver_settings(&self) -> ResolverSettings {
        ResolverSettings {
            use_dynamic_address: self.use_dynamic_address,
            testing_override: self.testing,
            testing_address: defaults::TESTING_ADDRESS.to_string(),
            ttl: self.ttl,
        }
    }

    fn resolve_server_address(
        cli: &Cli,
        toml: Option<&TomlConfig>,
    ) -> Result<String, ConfigError> {
        let address = cli
            .server_address
            .as_deref()
            .or_else(|| toml.and_then(|t| t.server.address.as_deref()))
            .ok_or_else(|| {
                ConfigError::missing(
                    field::SERVER_ADDRESS,
                    "Use --server-address or set server.address in config file",
                )
            })?;

        // Validated as a URL but kept verbatim so endpoints append cleanly.
        parse_url(address)?;
        Ok(address.to_string())
    }

    fn resolve_lookup_url(
        cli: &Cli,
        toml: Option<&TomlConfig>,
        required: bool,
    ) -> Result<Option<Url>, ConfigError> {
        let url = cli
            .lookup_url
            .as_deref()
            .or_else(|| toml.and_then(|t| t.dynamic.lookup_url.as_deref()));

        match url {
            Some(url) => parse_url(url).map(Some),
            None if required => Err(ConfigError::missing(
                field::LOOKUP_URL,
                "Use --lookup-url, set dynamic.lookup_url in config file, or pass --static-only",
            )),
            None => Ok(None),
        }
    }

    fn resolve_ttl(cli: &Cli, toml: Option<&TomlConfig>) -> Result<Duration, ConfigError> {
        let millis = cli
            .ttl_ms
            .or_else(|| toml.and_then(|t| t.dynamic.ttl_ms))
            .unwrap_or(defaults::TTL_MS);

        if millis == 0 {
            return Err(ConfigError::InvalidDuration {
                field: "ttl_ms",
                reason: "must be greater than 0".to_string(),
            });
        }

        Ok(Duration::from_millis(millis))
    }

    fn resolve_cache_file(cli: &Cli, toml: Option<&TomlConfig>) -> Option<PathBuf> {
        let persist = !cli.no_persist && toml.and_then(|t| t.cache.persist).unwrap_or(true);
        if !persist {
            return None;
        }

        // CLI takes precedence
        if let Some(ref path) = cli.cache_file {
            return Some(expand_tilde(path));
        }

        toml.and_then(|t| t.cache.file.as_deref())
            .map(|p| expand_tilde(Path::new(p)))
            .or_else(defaults::cache_file)
    }
}

/// Writes the default configuration template to a file.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_default_config(path: &Path) -> Result<(), ConfigError> {
    let template = super::toml::default_config_template();
    std::fs::write(path, template).map_err(|e| ConfigError::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })
}

// Helper functions

fn parse_url(url: &str) -> Result<Url, ConfigError> {
    Url::parse(url).map_err(|e| ConfigError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })
}

/// Expands a leading `~` to the home directory. Other paths are returned unchanged.
fn expand_tilde(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };

    dirs::home_dir().map_or_else(|| path.to_path_buf(), |home| home.join(rest))
}
