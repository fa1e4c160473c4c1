// ─── CLI Definition ───

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// CraftCLI - command-line Minecraft instance manager
#[derive(Parser)]
#[command(name = "craftcli")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Install root override (defaults to the first configured root)
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List installable game versions
    Versions {
        /// Include snapshots and old beta/alpha versions
        #[arg(long)]
        snapshots: bool,
    },

    /// Install a game version as a new instance
    Install {
        /// Version id (e.g. 1.21.1)
        version: String,

        /// Instance name (defaults to the version id)
        #[arg(long)]
        name: Option<String>,
    },

    /// List installed instances
    List,

    /// Launch an instance
    Launch {
        /// Instance name
        game: String,

        /// User to launch as (defaults to the first configured user)
        #[arg(long)]
        user: Option<String>,
    },

    /// Delete an instance and everything under its version directory
    Delete {
        /// Instance name
        game: String,
    },

    /// Manage mod loaders on an instance
    #[command(subcommand)]
    Loader(LoaderCommands),

    /// Manage users
    #[command(subcommand)]
    Users(UserCommands),

    /// Launcher configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
pub enum LoaderCommands {
    /// List installable loader builds for a game version
    Versions {
        /// Loader (fabric, quilt, forge, neoforged)
        loader: String,

        /// Game version (e.g. 1.21.1)
        game_version: String,
    },

    /// Install a loader onto an instance
    Install {
        /// Loader (fabric, quilt, forge, neoforged)
        loader: String,

        /// Instance name
        game: String,

        /// Loader build to install (defaults to the newest)
        #[arg(long)]
        loader_version: Option<String>,
    },

    /// Show the loader installed on an instance
    Status {
        /// Instance name
        game: String,
    },

    /// Remove the installed loader from an instance
    Remove {
        /// Instance name
        game: String,
    },
}

#[derive(Subcommand)]
pub enum UserCommands {
    /// Add an offline user
    Add {
        /// Player name (3-16 word characters)
        name: String,

        /// Explicit UUID (defaults to the derived offline UUID)
        #[arg(long)]
        uuid: Option<String>,
    },

    /// List configured users
    List,

    /// Remove a user by name
    Remove {
        /// Player name
        name: String,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Select the download mirror (official, bmclapi)
    Mirror { mirror: String },

    /// Set the default Java binary
    Java { path: PathBuf },

    /// Add an install root
    AddRoot { path: PathBuf },

    /// List configured install roots
    Roots,
}
