//! Config command implementations

use colored::Colorize;
use serde::Serialize;

use crate::cli::{CommandContext, GlobalOptions, OutputFormat};
use crate::client::{ElasticsearchClient, SearchEngineApi};
use crate::config::{Configuration, Settings, SettingsUpdate};
use crate::error::Result;
use crate::output;

/// Stored fields plus the connection parameters derived from them
#[derive(Debug, Serialize)]
struct ConfigView<'a> {
    name: &'a str,
    endpoint_uri: Option<&'a str>,
    credential_id: Option<&'a str>,
    scheme: String,
    host: String,
    port: u16,
    index: String,
}

impl<'a> From<&'a Configuration> for ConfigView<'a> {
    fn from(config: &'a Configuration) -> Self {
        let endpoint = config.endpoint();
        Self {
            name: &config.name,
            endpoint_uri: config.endpoint_uri.as_deref(),
            credential_id: config.credential_id.as_deref(),
            scheme: endpoint.scheme,
            host: endpoint.host,
            port: endpoint.port,
            index: endpoint.index,
        }
    }
}

fn or_unset(value: &str) -> String {
    if value.is_empty() {
        "(unset)".dimmed().to_string()
    } else {
        value.to_string()
    }
}

/// Run the config show command
pub fn show(opts: &GlobalOptions) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let settings = ctx.settings()?;
    let view = ConfigView::from(settings.get());

    match ctx.format {
        OutputFormat::Json => output::print_json(&view)?,
        OutputFormat::Pretty => {
            println!("{}", settings.get().display_name().bold());
            println!("  Name:       {}", or_unset(view.name));
            println!("  URI:        {}", or_unset(view.endpoint_uri.unwrap_or_default()));
            println!("  Credential: {}", or_unset(view.credential_id.unwrap_or_default()));
            println!();
            println!("  Scheme: {}", or_unset(&view.scheme));
            println!("  Host:   {}", or_unset(&view.host));
            println!("  Port:   {}", view.port);
            println!("  Index:  {}", view.index.cyan());
        }
    }

    Ok(())
}

/// Run the config set command
pub fn set(
    opts: &GlobalOptions,
    name: Option<String>,
    uri: Option<String>,
    credential: Option<String>,
) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let mut settings = ctx.settings()?;

    match (name, uri, credential) {
        (None, None, None) => {
            println!("Nothing to change. Pass --name, --uri or --credential.");
            return Ok(());
        }
        (Some(name), None, None) => settings.set_name(&name)?,
        (None, Some(uri), None) => settings.set_endpoint_uri(&uri)?,
        (None, None, Some(credential)) => settings.set_credential_id(&credential)?,
        (name, uri, credential) => settings.update(SettingsUpdate {
            name,
            endpoint_uri: uri,
            credential_id: credential,
        })?,
    }

    println!(
        "{} Configuration saved to: {}",
        "✓".green(),
        ctx.config_store.path().display()
    );

    Ok(())
}

/// Run the config test-connection command.
///
/// Without `probe` this only checks both fields are present. With `probe` the
/// cluster root endpoint is also requested using the resolved credential.
pub async fn test_connection(
    opts: &GlobalOptions,
    uri: Option<String>,
    credential: Option<String>,
    probe: bool,
) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let settings = ctx.settings()?;
    let current = settings.get();

    let uri = uri.or_else(|| current.endpoint_uri.clone()).unwrap_or_default();
    let credential = credential
        .or_else(|| current.credential_id.clone())
        .unwrap_or_default();

    let message = Settings::test_connection(&uri, &credential)?;

    if probe {
        let candidate = Configuration {
            name: current.name.clone(),
            endpoint_uri: Some(uri),
            credential_id: Some(credential),
        };
        let client = ElasticsearchClient::from_config(&candidate, &ctx.credentials)?;
        let info = client.ping().await?;

        match ctx.format {
            OutputFormat::Json => output::print_json(&info)?,
            OutputFormat::Pretty => println!(
                "{} Reached cluster {} (version {})",
                "✓".green(),
                info.cluster_name.bold(),
                info.version.number
            ),
        }
        return Ok(());
    }

    println!("{} {}", "✓".green(), message);
    Ok(())
}
