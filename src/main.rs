use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use craftcli::cli::{Cli, Commands, ConfigCommands, LoaderCommands, UserCommands};
use craftcli::commands::{config as config_cmd, instances, loaders, users, versions};
use craftcli::core::config::LauncherConfig;
use craftcli::core::error::LauncherResult;

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,craftcli=info")),
        )
        .init();

    let cli = Cli::parse();

    match dispatch(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn dispatch(cli: Cli) -> LauncherResult<()> {
    let mut config = LauncherConfig::load();
    let root = config.resolve_root(cli.root.as_deref());

    match cli.command {
        Commands::Versions { snapshots } => versions::run_versions(snapshots, &config).await,

        Commands::Install { version, name } => {
            instances::run_install(&version, name.as_deref(), &root, &config).await
        }

        Commands::List => instances::run_list(&root).await,

        Commands::Launch { game, user } => {
            instances::run_launch(&game, user.as_deref(), &root, &config).await
        }

        Commands::Delete { game } => instances::run_delete(&game, &root).await,

        Commands::Loader(command) => match command {
            LoaderCommands::Versions {
                loader,
                game_version,
            } => loaders::run_loader_versions(&loader, &game_version).await,
            LoaderCommands::Install {
                loader,
                game,
                loader_version,
            } => {
                loaders::run_loader_install(
                    &loader,
                    &game,
                    loader_version.as_deref(),
                    &root,
                    &config,
                )
                .await
            }
            LoaderCommands::Status { game } => loaders::run_loader_status(&game, &root).await,
            LoaderCommands::Remove { game } => loaders::run_loader_remove(&game, &root).await,
        },

        Commands::Users(command) => match command {
            UserCommands::Add { name, uuid } => {
                users::run_user_add(&name, uuid.as_deref(), &mut config)
            }
            UserCommands::List => users::run_user_list(&config),
            UserCommands::Remove { name } => users::run_user_remove(&name, &mut config),
        },

        Commands::Config(command) => match command {
            ConfigCommands::Mirror { mirror } => config_cmd::run_set_mirror(&mirror, &mut config),
            ConfigCommands::Java { path } => config_cmd::run_set_java(&path, &mut config),
            ConfigCommands::AddRoot { path } => config_cmd::run_add_root(&path, &mut config),
            ConfigCommands::Roots => config_cmd::run_list_roots(&config),
        },
    }
}
