use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

#[derive(Args, Debug)]
#[command(about = "Replace the catalog with rows from a CSV file")]
pub struct ImportArgs {
    /// CSV file with a header row; reads stdin when omitted or `-`
    #[arg(value_name = "FILE", value_hint = clap::ValueHint::FilePath)]
    pub file: Option<PathBuf>,
}

pub fn execute(args: ImportArgs) -> Result<()> {
    let bytes = match args.file.as_deref() {
        Some(path) if path.as_os_str() != "-" => {
            fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?
        }
        _ => {
            let mut buf = Vec::new();
            io::stdin()
                .read_to_end(&mut buf)
                .context("Failed to read stdin")?;
            buf
        }
    };

    let (_, mut session) = crate::open_session()?;
    let update = session
        .import_bytes(&bytes)
        .context("Import failed, catalog unchanged")?;

    if update.save_error.is_some() {
        println!("{} {update}", "!".yellow().bold());
    } else {
        println!("{} {update}", "✓".green().bold());
    }
    if update.short_rows > 0 || update.excluded_rows > 0 {
        println!(
            "  skipped {} short and {} excluded rows",
            update.short_rows, update.excluded_rows
        );
    }
    Ok(())
}
