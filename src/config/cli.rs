//! CLI argument parsing using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// dynaddr: dynamic server address resolver
///
/// Resolves the backend server address from a testing override, a
/// TTL-cached remote lookup, or a static default.
#[derive(Debug, Parser)]
#[command(name = "dynaddr")]
#[command(version, about, long_about = None)]
#[allow(clippy::struct_excessive_bools)] // CLI flags are naturally boolean
pub struct Cli {
    /// Subcommand to run (default: resolve)
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Static default server address
    #[arg(long = "server-address", global = true)]
    pub server_address: Option<String>,

    /// Lookup endpoint for the dynamic address
    #[arg(long = "lookup-url", global = true)]
    pub lookup_url: Option<String>,

    /// Cache validity window in milliseconds
    #[arg(long = "ttl-ms", global = true)]
    pub ttl_ms: Option<u64>,

    /// Resolve to the compiled-in testing address
    #[arg(long, global = true)]
    pub testing: bool,

    /// Disable the dynamic lookup and always use the static address
    #[arg(long = "static-only", global = true)]
    pub static_only: bool,

    /// Path to the cache file
    #[arg(long = "cache-file", global = true)]
    pub cache_file: Option<PathBuf>,

    /// Do not read or write the cache file
    #[arg(long = "no-persist", global = true)]
    pub no_persist: bool,

    /// Path to configuration file
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

/// Subcommands for dynaddr
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Print the effective server address
    Resolve {
        /// API endpoint appended to the resolved address
        #[arg(long)]
        endpoint: Option<String>,
    },

    /// Force a lookup now and report whether it succeeded
    Refresh,

    /// Clear the cached dynamic address
    Clear,

    /// Generate a default configuration file
    Init {
        /// Output path for the configuration file
        #[arg(long, short, default_value = "dynaddr.toml")]
        output: PathBuf,
    },
}

impl Cli {
    /// Parses CLI arguments from the command line.
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Parses CLI arguments from an iterator (useful for testing).
    pub fn parse_from_iter<I, T>(iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::parse_from(iter)
    }

    /// The subcommand to run; `resolve` when none was given.
    #[must_use]
    pub fn command(&self) -> Command {
        self.command
            .clone()
            .unwrap_or(Command::Resolve { endpoint: None })
    }

    /// Returns true if this is the init command.
    #[must_use]
    pub const fn is_init(&self) -> bool {
        matches!(self.command, Some(Command::Init { .. }))
    }
}
