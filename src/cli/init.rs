//! Init command implementation

use colored::Colorize;
use dialoguer::{Confirm, Input, Password, theme::ColorfulTheme};

use crate::cli::{CommandContext, GlobalOptions};
use crate::config::{SettingsUpdate, check_name, check_uri};
use crate::credentials::Credential;
use crate::error::Result;

const DEFAULT_CREDENTIAL_ID: &str = "elasticsearch";

/// Run the init command
///
/// Prompts for the display name, endpoint and an optional username/password
/// credential, then validates and saves everything in one go.
pub fn run(opts: &GlobalOptions) -> Result<()> {
    let mut ctx = CommandContext::new(opts)?;
    let current = ctx.settings()?.get().clone();
    let theme = ColorfulTheme::default();

    println!("{}", "Welcome to trivy-publisher!".bold().green());
    println!("Let's point it at your search cluster.\n");

    let name: String = Input::with_theme(&theme)
        .with_prompt("Name")
        .with_initial_text(current.name.clone())
        .validate_with(|value: &String| check_name(value).map_err(|e| e.message))
        .interact_text()?;

    let uri: String = Input::with_theme(&theme)
        .with_prompt("Endpoint URI (scheme://host[:port][/index])")
        .with_initial_text(current.endpoint_uri.clone().unwrap_or_default())
        .allow_empty(true)
        .validate_with(|value: &String| check_uri(value).map_err(|e| e.message))
        .interact_text()?;

    let add_credential = Confirm::with_theme(&theme)
        .with_prompt("Does the cluster require a username and password?")
        .default(current.credential_id.is_some())
        .interact()?;

    let credential_id = if add_credential {
        let id: String = Input::with_theme(&theme)
            .with_prompt("Credential id")
            .default(
                current
                    .credential_id
                    .clone()
                    .unwrap_or_else(|| DEFAULT_CREDENTIAL_ID.to_string()),
            )
            .interact_text()?;
        let username: String = Input::with_theme(&theme)
            .with_prompt("Username")
            .interact_text()?;
        let password = Password::with_theme(&theme)
            .with_prompt("Password")
            .interact()?;

        ctx.credentials.insert(
            &id,
            Credential::UsernamePassword {
                username,
                password,
                description: Some("Added by trivy-publisher init".to_string()),
            },
        )?;
        id
    } else {
        String::new()
    };

    let mut settings = ctx.settings()?;
    settings.update(SettingsUpdate {
        name: Some(name),
        endpoint_uri: Some(uri),
        credential_id: Some(credential_id),
    })?;

    println!(
        "\n{} Configuration saved to: {}",
        "✓".green(),
        ctx.config_store.path().display()
    );

    println!("\n{}", "You're all set! Try running:".bold());
    println!("  {} - Show configuration status", "trivy-publisher status".cyan());
    println!(
        "  {} - Publish a report",
        "trivy-publisher publish trivy.json".cyan()
    );

    Ok(())
}
