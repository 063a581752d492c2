use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::Colorize;
use env_logger::Env;
use prodex_core::{config, Config, Session};
use std::path::PathBuf;

mod import;
mod info;
mod reset;
mod search;

#[derive(Parser)]
#[command(name = "prodex")]
#[command(about = "Product catalog search", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(short = 'd', long = "debug", global = true, hide = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search the catalog by code, name or spec
    #[command(alias = "s")]
    Search(search::SearchArgs),

    /// Replace the catalog with rows from a CSV file
    Import(import::ImportArgs),

    /// Restore the built-in catalog
    Reset(reset::ResetArgs),

    /// Show catalog and index information
    Info(info::InfoArgs),
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {e}", "Error:".red());
        for cause in e.chain().skip(1) {
            eprintln!("  {cause}");
        }
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // RUST_LOG still overrides either default
    let env = if cli.debug {
        Env::default().default_filter_or("debug")
    } else {
        Env::default().default_filter_or("error")
    };
    env_logger::Builder::from_env(env).init();

    match cli.command {
        Commands::Search(args) => search::execute(args),
        Commands::Import(args) => import::execute(args),
        Commands::Reset(args) => reset::execute(args),
        Commands::Info(args) => info::execute(args),
    }
}

/// Data directory, its config, and a session over the stored catalog
pub(crate) fn open_session() -> anyhow::Result<(PathBuf, Session)> {
    let home = config::default_home()?;
    let config = Config::load(&home).context("Failed to load configuration")?;
    log::debug!("Using data directory {}", home.display());
    let session = Session::open(&home, &config);
    Ok((home, session))
}
