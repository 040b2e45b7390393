//! Credential command implementations

use colored::Colorize;
use dialoguer::{Password, theme::ColorfulTheme};
use serde::Serialize;
use tabled::Tabled;

use crate::cli::{CommandContext, GlobalOptions, OutputFormat};
use crate::credentials::{Credential, CredentialResolver};
use crate::error::{ConfigError, Result};
use crate::output::{self, table};

/// Credential listing row; never carries secret material
#[derive(Debug, Serialize, Tabled)]
struct CredentialRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "TYPE")]
    kind: &'static str,
    #[tabled(rename = "USERNAME")]
    username: String,
    #[tabled(rename = "DESCRIPTION")]
    description: String,
}

impl CredentialRow {
    fn new(id: &str, credential: &Credential) -> Self {
        let username = match credential {
            Credential::UsernamePassword { username, .. } => username.clone(),
            Credential::SecretText { .. } => String::new(),
        };
        Self {
            id: id.to_string(),
            kind: credential.kind(),
            username,
            description: credential.description().unwrap_or_default().to_string(),
        }
    }
}

/// Run the credential add command
pub fn add(
    opts: &GlobalOptions,
    id: String,
    username: Option<String>,
    password: Option<String>,
    secret: Option<String>,
    description: Option<String>,
) -> Result<()> {
    let mut ctx = CommandContext::new(opts)?;

    let credential = match (username, secret) {
        (_, Some(secret)) => Credential::SecretText {
            secret,
            description,
        },
        (Some(username), None) => {
            let password = match password {
                Some(password) => password,
                None => Password::with_theme(&ColorfulTheme::default())
                    .with_prompt(format!("Password for {}", username))
                    .interact()?,
            };
            Credential::UsernamePassword {
                username,
                password,
                description,
            }
        }
        (None, None) => {
            return Err(ConfigError::Invalid("Pass --username or --secret".to_string()).into());
        }
    };

    let replaced = ctx.credentials.lookup(&id).is_some();
    ctx.credentials.insert(&id, credential)?;

    let verb = if replaced { "Updated" } else { "Added" };
    println!(
        "{} {} credential {} in {}",
        "✓".green(),
        verb,
        id.bold(),
        ctx.credentials.path().display()
    );

    Ok(())
}

/// Run the credential list command
pub fn list(opts: &GlobalOptions) -> Result<()> {
    let ctx = CommandContext::new(opts)?;

    let rows: Vec<CredentialRow> = ctx
        .credentials
        .entries()
        .credentials
        .iter()
        .map(|(id, credential)| CredentialRow::new(id, credential))
        .collect();

    match ctx.format {
        OutputFormat::Json => output::print_json(&rows)?,
        OutputFormat::Pretty => println!("{}", table::format_table(&rows, "No credentials stored.")),
    }

    Ok(())
}

/// Run the credential remove command
pub fn remove(opts: &GlobalOptions, id: &str) -> Result<()> {
    let mut ctx = CommandContext::new(opts)?;
    let in_use = ctx.settings()?.get().credential_id.as_deref() == Some(id);

    if ctx.credentials.remove(id)? {
        println!("{} Removed credential {}", "✓".green(), id.bold());
        if in_use {
            println!(
                "{} The configuration still references '{}'; publishing will fail until it is changed.",
                "⚠".yellow(),
                id
            );
        }
    } else {
        println!("{} No credential with id {}", "○".dimmed(), id);
    }

    Ok(())
}
