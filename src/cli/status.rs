//! Status command implementation

use colored::Colorize;

use crate::cli::{CommandContext, GlobalOptions};
use crate::credentials::{Credential, CredentialResolver};
use crate::error::Result;

/// Run the status command to display configuration status
pub fn run(opts: &GlobalOptions) -> Result<()> {
    let ctx = CommandContext::new(opts)?;

    println!("{}\n", "trivy-publisher Configuration Status".bold());
    println!(
        "Config file: {}",
        ctx.config_store.path().display().to_string().cyan()
    );

    if !ctx.config_store.exists() {
        println!();
        println!("{} Configuration not found", "✗".red());
        println!();
        println!(
            "Run {} to create a configuration file.",
            "trivy-publisher init".cyan()
        );
        println!();
        return Ok(());
    }

    let settings = ctx.settings()?;
    let config = settings.get();
    let endpoint = config.endpoint();

    println!("Name: {}", config.display_name().bold());
    println!();

    // Endpoint status
    match config.endpoint_uri {
        Some(ref uri) if endpoint.is_addressable() => {
            println!("{} Endpoint: {}", "✓".green(), uri);
            println!(
                "  → {}://{}:{} index {}",
                endpoint.scheme,
                endpoint.host,
                endpoint.port,
                endpoint.index.cyan()
            );
        }
        Some(ref uri) => {
            println!(
                "{} Endpoint '{}' is not of the form scheme://host[:port][/index]",
                "⚠".yellow(),
                uri
            );
        }
        None => {
            println!("{} Endpoint not configured", "✗".red());
            println!("  → Run 'trivy-publisher config set --uri <URI>' to configure");
        }
    }

    // Credential status
    match config.credential_id {
        Some(ref id) => match ctx.credentials.lookup(id) {
            Some(Credential::UsernamePassword { username, .. }) => {
                println!("{} Credential: {} (user {})", "✓".green(), id, username);
            }
            Some(Credential::SecretText { .. }) => {
                println!(
                    "{} Credential '{}' is secret text; a username/password credential is required",
                    "✗".red(),
                    id
                );
            }
            None => {
                println!("{} Credential '{}' not found", "✗".red(), id);
                println!("  → Run 'trivy-publisher credential add {} --username <USER>'", id);
            }
        },
        None => {
            println!(
                "{} No credential configured (requests are unauthenticated)",
                "○".dimmed()
            );
        }
    }

    println!();
    Ok(())
}
