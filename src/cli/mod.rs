//! CLI command definitions and handlers

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
pub use clap_complete::Shell;

pub mod args;
pub mod config;
pub mod context;
pub mod credential;
pub mod init;
pub mod publish;
pub mod status;

pub use args::{GlobalOptions, OutputFormat};
pub use context::CommandContext;

/// trivy-publisher - publish Trivy scan reports to Elasticsearch
#[derive(Parser, Debug)]
#[command(name = "trivy-publisher")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (pretty, json)
    #[arg(
        long,
        global = true,
        env = "TRIVY_PUBLISHER_FORMAT",
        default_value = "pretty",
        hide_env = true,
        hide_possible_values = true
    )]
    pub format: OutputFormat,

    /// Override config file location
    #[arg(long, global = true, env = "TRIVY_PUBLISHER_CONFIG", hide_env = true)]
    pub config: Option<String>,

    /// Override credentials file location
    #[arg(long, global = true, env = "TRIVY_PUBLISHER_CREDENTIALS", hide_env = true)]
    pub credentials: Option<String>,

    /// Enable debug logging
    #[arg(long, global = true, env = "TRIVY_PUBLISHER_DEBUG", hide_env = true)]
    pub debug: bool,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Interactively set up the publisher configuration
    Init,

    /// Show configuration and credential status
    Status,

    /// Display version information
    Version,

    /// Publish a Trivy JSON report to the configured search endpoint
    #[command(after_help = "EXAMPLES:\n  \
        trivy image -f json -o reports/trivy.json alpine:3.10\n  \
        trivy-publisher publish reports/trivy.json --workspace \"$WORKSPACE\"")]
    Publish(PublishArgs),

    /// View and change the publisher configuration
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Manage stored credentials
    #[command(subcommand)]
    Credential(CredentialCommands),

    /// Generate shell completions
    #[command(after_help = "\
Examples:
  bash:   trivy-publisher completion bash > /etc/bash_completion.d/trivy-publisher
  zsh:    trivy-publisher completion zsh > \"${fpath[1]}/_trivy-publisher\"
  fish:   trivy-publisher completion fish > ~/.config/fish/completions/trivy-publisher.fish")]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Arguments of the publish step
#[derive(Debug, Clone, Args)]
pub struct PublishArgs {
    /// Path to the report, relative to the workspace
    pub report: String,

    /// Build workspace the report path is resolved against
    #[arg(long, short = 'w', env = "WORKSPACE", hide_env = true, default_value = ".")]
    pub workspace: PathBuf,

    /// Index every scan target as its own document instead of only the last one
    #[arg(long)]
    pub all_targets: bool,
}

/// Configuration subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the configuration and derived connection parameters
    Show,

    /// Validate and save configuration fields
    #[command(after_help = "EXAMPLES:\n  \
        trivy-publisher config set --name prod --uri https://es.example.com:9200/trivy\n  \
        trivy-publisher config set --credential es-writer\n  \
        trivy-publisher config set --credential \"\"    # clear")]
    Set {
        /// Display name (must not be blank)
        #[arg(long)]
        name: Option<String>,

        /// Endpoint URI, scheme://host[:port][/index]; empty clears it
        #[arg(long)]
        uri: Option<String>,

        /// Id of a username/password credential; empty clears it
        #[arg(long)]
        credential: Option<String>,
    },

    /// Check the connection settings
    TestConnection {
        /// Endpoint URI to check (defaults to the configured one)
        #[arg(long)]
        uri: Option<String>,

        /// Credential id to check (defaults to the configured one)
        #[arg(long)]
        credential: Option<String>,

        /// Also contact the cluster to verify it is reachable
        #[arg(long)]
        probe: bool,
    },
}

/// Credential subcommands
#[derive(Subcommand, Debug)]
pub enum CredentialCommands {
    /// Add or replace a credential
    Add {
        /// Credential id referenced from the configuration
        id: String,

        /// Username (prompts for the password unless --password is given)
        #[arg(long, short = 'u', conflicts_with = "secret", required_unless_present = "secret")]
        username: Option<String>,

        /// Password for --username
        #[arg(long, env = "TRIVY_PUBLISHER_PASSWORD", hide_env = true)]
        password: Option<String>,

        /// Store a secret text credential instead of username/password
        #[arg(long)]
        secret: Option<String>,

        /// Free-form description
        #[arg(long, short = 'd')]
        description: Option<String>,
    },

    /// List stored credentials (secrets are never shown)
    #[command(visible_alias = "ls")]
    List,

    /// Remove a credential
    #[command(visible_alias = "rm")]
    Remove {
        /// Credential id
        id: String,
    },
}
