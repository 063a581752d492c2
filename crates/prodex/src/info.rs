use anyhow::Result;
use clap::Args;
use colored::Colorize;
use prodex_core::Session;
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
#[command(about = "Show catalog and index information")]
pub struct InfoArgs {
    /// Output format
    #[arg(short = 'f', long, value_enum, default_value = "human")]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}

#[derive(Debug, Serialize)]
struct CatalogInfo {
    home: PathBuf,
    records: usize,
    words: usize,
    prefixes: usize,
    terms: usize,
}

impl CatalogInfo {
    fn new(home: &Path, session: &Session) -> Self {
        let index = session.index();
        Self {
            home: home.to_path_buf(),
            records: session.record_count(),
            words: index.word_count(),
            prefixes: index.prefix_count(),
            terms: index.term_count(),
        }
    }
}

pub fn execute(args: InfoArgs) -> Result<()> {
    let (home, session) = crate::open_session()?;
    let info = CatalogInfo::new(&home, &session);

    match args.format {
        OutputFormat::Human => print_human_readable(&info),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&info)?),
    }
    Ok(())
}

fn print_human_readable(info: &CatalogInfo) {
    println!("{}", "Catalog".blue().bold());
    println!("Data directory: {}", info.home.display());
    println!("Records: {}", info.records);
    println!(
        "Index terms: {} ({} words, {} prefixes)",
        info.terms, info.words, info.prefixes
    );
}
