pub mod cli;
pub mod config;
pub mod db;
pub mod entities;
pub mod error;
pub mod models;
pub mod services;
pub mod validators;

use anyhow::Context;
use clap::{CommandFactory, Parser};
use cli::{Cli, Commands, TokenCommands, UserCommands};
pub use config::Config;
pub use db::Store;
pub use error::AccountError;
use tracing_subscriber::EnvFilter;

/// Entry point for the binary. `config` is expected to be loaded and
/// validated by the caller.
pub async fn run(config: &Config) -> anyhow::Result<()> {
    init_logging(config)?;

    let cli = Cli::parse();

    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    match command {
        Commands::Init => cli::cmd_init(),

        Commands::Migrate => cli::cmd_migrate(config).await,

        Commands::User { command } => match command {
            UserCommands::Create {
                phone_number,
                username,
                email,
                password,
                staff,
            } => {
                cli::cmd_user_create(config, &phone_number, &username, &email, password, staff)
                    .await
            }
            UserCommands::CreateSuperuser {
                phone_number,
                username,
                email,
                password,
            } => {
                cli::cmd_user_create_superuser(config, &phone_number, &username, &email, password)
                    .await
            }
            UserCommands::List { all } => cli::cmd_user_list(config, all).await,
            UserCommands::Show { phone_number } => cli::cmd_user_show(config, &phone_number).await,
            UserCommands::Delete { phone_number } => {
                cli::cmd_user_delete(config, &phone_number).await
            }
            UserCommands::Restore { phone_number } => {
                cli::cmd_user_restore(config, &phone_number).await
            }
        },

        Commands::Token { command } => match command {
            TokenCommands::Issue {
                phone_number,
                token_type,
            } => cli::cmd_token_issue(config, &phone_number, token_type).await,
            TokenCommands::List { phone_number, all } => {
                cli::cmd_token_list(config, &phone_number, all).await
            }
            TokenCommands::Revoke { uuid } => cli::cmd_token_revoke(config, uuid).await,
        },
    }
}

fn init_logging(config: &Config) -> anyhow::Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    let registry = tracing_subscriber::registry().with(env_filter);

    if config.general.log_format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
            .context("Failed to initialize JSON logging")?;
    } else {
        registry
            .with(tracing_subscriber::fmt::layer())
            .try_init()
            .context("Failed to initialize logging")?;
    }

    Ok(())
}
