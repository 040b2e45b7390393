//! Command execution context
//!
//! Resolves the config and credential stores once per invocation so handlers
//! don't repeat path resolution and loading.

use crate::cli::{GlobalOptions, OutputFormat};
use crate::config::{Settings, YamlConfigStore};
use crate::credentials::CredentialStore;
use crate::error::Result;

/// Context for command execution containing the stores and output preference.
pub struct CommandContext {
    /// Configuration file store
    pub config_store: YamlConfigStore,
    /// Loaded credential store
    pub credentials: CredentialStore,
    /// Output format preference
    pub format: OutputFormat,
}

impl CommandContext {
    /// Resolve both stores from the global options.
    ///
    /// # Errors
    /// Returns error if the home directory cannot be determined or the
    /// credentials file cannot be parsed.
    pub fn new(opts: &GlobalOptions) -> Result<Self> {
        let config_store = YamlConfigStore::at(opts.config_ref())?;
        let credentials = CredentialStore::load_at(opts.credentials_ref())?;

        Ok(Self {
            config_store,
            credentials,
            format: opts.format,
        })
    }

    /// Load the active settings, validated against this context's credentials
    pub fn settings(&self) -> Result<Settings<'_>> {
        Settings::load(&self.config_store, &self.credentials)
    }
}
