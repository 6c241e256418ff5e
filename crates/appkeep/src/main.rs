//! appkeep CLI
//!
//! Inventories installed Windows applications, resolves them to winget
//! packages and reinstalls them on another machine. State moves between
//! invocations through an inventory document.

use std::path::PathBuf;
use std::sync::Arc;

use appkeep_core::Vault;
use appkeep_exec::LocalExecutor;
use appkeep_inventory::{SortKey, WindowsRegistry};
use appkeep_pkg::WingetManager;
use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::Result;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

use config::Config;

#[derive(Parser)]
#[command(name = "appkeep")]
#[command(about = "Inventory installed apps and reinstall them with winget", long_about = None)]
struct Cli {
    /// Config file (default: $APPKEEP_CONFIG, ./appkeep.toml, then the user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Inventory document shared between commands
    #[arg(long, short = 'i', global = true, default_value = "inventory.json")]
    inventory: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan installed applications into the inventory document
    Scan,

    /// Show the inventory with the indices other commands take
    List {
        /// Only entries whose name or publisher contains this text
        #[arg(long)]
        filter: Option<String>,
        /// Display order
        #[arg(long, value_enum, default_value_t = SortArg::Name)]
        sort: SortArg,
    },

    /// Resolve winget package ids (all entries when no index is given)
    Match {
        indices: Vec<usize>,
    },

    /// Install entries with winget, one at a time (all when no index is given)
    Install {
        indices: Vec<usize>,
        /// Also write the results report to this file
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Write a standalone PowerShell install script
    Script {
        indices: Vec<usize>,
        #[arg(long, short, default_value = "install.ps1")]
        output: PathBuf,
        /// Print the bare install commands instead of writing a script
        #[arg(long)]
        commands: bool,
    },

    /// Write document, script and app list into one directory
    Bundle {
        indices: Vec<usize>,
        /// Target directory (default: appkeep_bundle_<timestamp>)
        #[arg(long, short)]
        dir: Option<PathBuf>,
    },

    /// Show match counts and the quick install commands
    Report,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SortArg {
    Name,
    NameDesc,
    Publisher,
    Source,
}

impl From<SortArg> for SortKey {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Name => SortKey::NameAsc,
            SortArg::NameDesc => SortKey::NameDesc,
            SortArg::Publisher => SortKey::Publisher,
            SortArg::Source => SortKey::Source,
        }
    }
}

fn init_tracing(level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    let config = Config::load_default(cli.config.as_deref())?;
    init_tracing(&config.log_level);

    let executor = Arc::new(LocalExecutor::new());
    let manager = WingetManager::new(executor, config.winget.clone());
    let vault = Vault::new(
        Arc::new(WindowsRegistry::new()),
        Arc::new(manager),
        config.core(),
    );

    let inventory = cli.inventory.as_path();
    match cli.command {
        Commands::Scan => commands::scan(&vault, inventory).await,
        Commands::List { filter, sort } => {
            commands::list(&vault, inventory, filter.as_deref(), sort.into()).await
        }
        Commands::Match { indices } => commands::match_packages(&vault, inventory, indices).await,
        Commands::Install { indices, report } => {
            commands::install(&vault, inventory, indices, report.as_deref()).await
        }
        Commands::Script {
            indices,
            output,
            commands: bare,
        } => commands::script(&vault, inventory, &indices, &output, bare).await,
        Commands::Bundle { indices, dir } => {
            commands::bundle(&vault, inventory, &indices, dir).await
        }
        Commands::Report => commands::report(&vault, inventory).await,
    }
}
