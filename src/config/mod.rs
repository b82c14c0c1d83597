//! Configuration layer for dynaddr.
//!
//! This module provides:
//! - CLI argument parsing ([`Cli`], [`Command`])
//! - TOML configuration file parsing ([`TomlConfig`])
//! - Validated configuration ([`ValidatedConfig`])
//! - Configuration file generation ([`write_default_config`])
//! - Default values ([`defaults`])
//!
//! # Priority
//!
//! Values are resolved with the following priority (highest to lowest):
//!
//! 1. **Explicit CLI arguments**
//! 2. **TOML config file**
//! 3. **Built-in defaults**
//!
//! `server.address` has no default and must come from the CLI or the file.
//! `dynamic.lookup_url` is required only while dynamic addressing is enabled.
//!
//! # Boolean Flag Semantics
//!
//! `--testing` and `--static-only` use OR semantics with the file: a flag can
//! switch the testing override on or dynamic addressing off, never the reverse.
//! `--no-persist` likewise only disables cache persistence.
//!
//! # Compiled-in Values
//!
//! The testing address ([`defaults::TESTING_ADDRESS`]) and the client version
//! sent on lookups ([`defaults::CLIENT_VERSION`]) are not configurable.

mod cli;
pub mod defaults;
mod error;
mod toml;
mod validated;


pub use cli::{Cli, Command};
pub use error::{ConfigError, field};
pub use toml::{TomlConfig, default_config_template};
pub use validated::{ValidatedConfig, write_default_config};
