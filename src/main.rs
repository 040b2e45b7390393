//! trivy-publisher - publish Trivy scan reports to Elasticsearch from a build

use clap::{CommandFactory, Parser};

mod cli;
mod client;
mod config;
mod credentials;
mod error;
mod output;
mod report;
mod step;

use cli::{Cli, Commands, ConfigCommands, CredentialCommands, GlobalOptions};
use error::Result;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

/// Route `log` output to stderr; `--debug` lowers the default level, `RUST_LOG` wins
fn init_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.debug);
    log::debug!("Debug mode enabled");

    let opts = GlobalOptions::from_cli(&cli);

    match cli.command {
        Commands::Init => cli::init::run(&opts),
        Commands::Status => cli::status::run(&opts),
        Commands::Version => {
            println!("trivy-publisher version {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::Publish(ref args) => cli::publish::run(&opts, args).await,
        Commands::Config(config_cmd) => match config_cmd {
            ConfigCommands::Show => cli::config::show(&opts),
            ConfigCommands::Set {
                name,
                uri,
                credential,
            } => cli::config::set(&opts, name, uri, credential),
            ConfigCommands::TestConnection {
                uri,
                credential,
                probe,
            } => cli::config::test_connection(&opts, uri, credential, probe).await,
        },
        Commands::Credential(credential_cmd) => match credential_cmd {
            CredentialCommands::Add {
                id,
                username,
                password,
                secret,
                description,
            } => cli::credential::add(&opts, id, username, password, secret, description),
            CredentialCommands::List => cli::credential::list(&opts),
            CredentialCommands::Remove { id } => cli::credential::remove(&opts, &id),
        },
        Commands::Completion { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "trivy-publisher", &mut std::io::stdout());
            Ok(())
        }
    }
}
