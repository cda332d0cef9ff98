//! modman - manages Minecraft CurseForge mods from the command line.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use modman_core::api::SortType;

mod commands;
mod table;

/// Log levels
#[derive(Debug, Clone, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_filter_directive(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

#[derive(Parser, Debug)]
#[clap(name = "modman", about = "Manages Minecraft CurseForge mods", version)]
struct Cli {
    #[clap(subcommand)]
    command: Command,

    /// Change the working directory before doing anything else
    #[clap(long, short = 'C', global = true)]
    cwd: Option<PathBuf>,

    /// Set log level
    #[clap(long, default_value = "warn", global = true)]
    log_level: LogLevel,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a modman dependency manifest if it doesn't exist
    Init {
        /// Minecraft version the managed mods target
        version: String,
    },

    /// Download and add mods to the manifest by slug or ID
    Add {
        /// Mod IDs or slugs
        args: Vec<String>,
    },

    /// Download unmanaged mods to the working directory by slug or ID
    Get {
        /// Mod IDs or slugs
        args: Vec<String>,

        /// Minecraft version to download latest files for
        #[clap(long, short)]
        version: Option<String>,
    },

    /// Download every mod tracked by the manifest
    Install {
        /// Overwrite files that are already present
        #[clap(long, short)]
        force: bool,
    },

    /// Delete mods and stop managing them, by slug
    Remove {
        /// Mod slugs
        slugs: Vec<String>,
    },

    /// Update all managed mods to their latest files
    Update {
        /// Minecraft version to update mods to
        #[clap(long, short)]
        version: Option<String>,
    },

    /// Display search results for CurseForge mods
    Search {
        /// Search terms
        terms: Vec<String>,

        /// Minecraft version to filter by
        #[clap(long, short)]
        version: Option<String>,

        /// How to sort mod results (featured, popularity, last-update,
        /// name, author, total-downloads, or 0-5)
        #[clap(long, short, default_value = "featured")]
        sort: SortType,

        /// How many results to return
        #[clap(long, short, default_value_t = 5)]
        limit: u32,

        /// Table format to use (tokens: {id} {slug} {name} {language}
        /// {url} {rank} {popularity} {downloads} {updated} {released}
        /// {created})
        #[clap(long, short, default_value = table::DEFAULT_FORMAT)]
        format: String,

        /// Output results as JSON
        #[clap(long)]
        json: bool,
    },
}

fn init_tracing(log_level: &LogLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_filter_directive()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    if let Some(dir) = &cli.cwd {
        if let Err(err) = std::env::set_current_dir(dir) {
            eprintln!("error: {}: {err}", dir.display());
            std::process::exit(1);
        }
    }

    if let Err(err) = commands::run(cli.command).await {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
