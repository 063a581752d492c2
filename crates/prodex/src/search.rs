use std::io::{self, Write};

use anyhow::{bail, Result};
use clap::{Args, ValueEnum};
use colored::Colorize;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{ContentArrangement, Table};
use prodex_core::{ProductRecord, Session};
use serde::Serialize;

#[derive(ValueEnum, Debug, Clone, Default)]
pub enum SearchFormat {
    #[default]
    Table,
    Json,
}

impl std::fmt::Display for SearchFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchFormat::Table => write!(f, "table"),
            SearchFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(Args, Debug, Clone)]
#[command(about = "Search the catalog by code, name or spec")]
pub struct SearchArgs {
    /// Search term (case-insensitive)
    #[arg(value_name = "TERM", default_value = "")]
    pub term: String,

    /// Page of results to show
    #[arg(short, long, default_value_t = 1)]
    pub page: usize,

    /// Output format
    #[arg(short, long, default_value_t = SearchFormat::Table)]
    pub format: SearchFormat,
}

#[derive(Serialize)]
struct SearchOutput<'a> {
    term: &'a str,
    total: usize,
    page: usize,
    page_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<&'static str>,
    records: &'a [ProductRecord],
}

pub fn execute(args: SearchArgs) -> Result<()> {
    let (_, mut session) = crate::open_session()?;
    session.search_now(&args.term);

    let page_count = session.page_count();
    if args.page != 1 && (args.page == 0 || args.page > page_count) {
        bail!("Page {} is out of range (1-{})", args.page, page_count.max(1));
    }
    session.go_to_page(args.page);

    let mut writer = io::stdout().lock();
    match args.format {
        SearchFormat::Json => {
            let output = SearchOutput {
                term: session.committed_text(),
                total: session.result_count(),
                page: session.current_page(),
                page_count,
                status: session.status(),
                records: session.page_records(),
            };
            writeln!(writer, "{}", serde_json::to_string_pretty(&output)?)?;
        }
        SearchFormat::Table => write_results(&session, writer)?,
    }

    Ok(())
}

fn write_results<W: Write>(session: &Session, mut writer: W) -> io::Result<()> {
    if let Some(status) = session.status() {
        writeln!(writer, "{}", status.dimmed())?;
        return Ok(());
    }

    writeln!(writer, "{}", results_table(session.page_records()))?;
    if session.pagination_visible() {
        writeln!(
            writer,
            "Page {} / {} ({} results)",
            session.current_page(),
            session.page_count(),
            session.result_count()
        )?;
    }
    Ok(())
}

fn results_table(records: &[ProductRecord]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::DynamicFullWidth);
    table.set_header(vec!["Code", "Category", "Name", "Spec", "UDI"]);

    for record in records {
        table.add_row(vec![
            record.code.as_str(),
            record.category_name.as_str(),
            record.name.as_str(),
            or_dash(&record.spec),
            or_dash(&record.udi),
        ]);
    }
    table
}

fn or_dash(value: &str) -> &str {
    if value.is_empty() {
        "-"
    } else {
        value
    }
}
