use clap::{Parser, Subcommand};

mod subcommands;

pub use subcommands::{
    ContentCommands, OrderArgs, PluginCommands, SettingsCommands, UserCommands,
};

use crate::onboard::QuickSetup;

/// `modular` - installation wizard, setup gateway and admin tooling for
/// Modular CMS.
#[derive(Parser, Debug)]
#[command(name = "modular")]
#[command(version)]
#[command(about = "Install and administer a Modular CMS site.", long_about = None)]
pub struct Cli {
    /// Talk to a running server instead of the local data directory
    /// (admin commands default to `client.server_url`)
    #[arg(long, global = true)]
    pub server: Option<String>,

    /// Admin API bearer token (overrides `client.admin_token`)
    #[arg(long, global = true, env = "MODULAR_ADMIN_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the installation wizard
    Setup {
        /// Take every value from flags and environment, no prompts
        #[arg(long)]
        quick: bool,

        /// Require password confirmation and a passing database test
        #[arg(long)]
        strict: bool,

        #[command(flatten)]
        fields: QuickSetup,
    },

    /// Start the setup gateway (installation API and pages)
    Serve {
        /// Port to listen on (use 0 for random available port)
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to
        #[arg(long)]
        host: Option<String>,
    },

    /// Report whether the site is installed
    Check,

    /// Test a database connection string
    TestDb {
        /// Connection string (default: `database.uri`)
        uri: Option<String>,
    },

    /// Show configuration and installation status
    Status,

    /// Manage plugins on a running site
    Plugins {
        #[command(subcommand)]
        plugin_command: PluginCommands,
    },

    /// Manage users and roles on a running site
    Users {
        #[command(subcommand)]
        user_command: UserCommands,
    },

    /// Manage posts and pages on a running site
    Content {
        #[command(subcommand)]
        content_command: ContentCommands,
    },

    /// Read and change site settings on a running site
    Settings {
        #[command(subcommand)]
        settings_command: SettingsCommands,
    },
}
