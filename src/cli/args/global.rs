//! Global CLI options shared across all commands

use crate::cli::{Cli, OutputFormat};

/// Global CLI options passed to all command handlers.
///
/// Precedence is: CLI flag > environment variable > default location.
#[derive(Debug, Clone)]
pub struct GlobalOptions {
    /// Output format (pretty, json)
    pub format: OutputFormat,

    /// Custom config file path (defaults to ~/.trivy-publisher/config.yaml)
    pub config: Option<String>,

    /// Custom credentials file path (defaults to ~/.trivy-publisher/credentials.yaml)
    pub credentials: Option<String>,
}

impl GlobalOptions {
    /// Create GlobalOptions from a parsed CLI struct.
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            format: cli.format,
            config: cli.config.clone(),
            credentials: cli.credentials.clone(),
        }
    }

    /// Get config path as `Option<&str>`.
    pub fn config_ref(&self) -> Option<&str> {
        self.config.as_deref()
    }

    /// Get credentials path as `Option<&str>`.
    pub fn credentials_ref(&self) -> Option<&str> {
        self.credentials.as_deref()
    }
}
