//! CSV catalog import
//!
//! Expected layout: a header line, then rows of at least five columns:
//! `code, <unused>, category, name, spec`. Extra columns are ignored.

use crate::record::ProductRecord;
use serde::{Deserialize, Serialize};

/// Columns a row must have to be considered
pub const MIN_COLUMNS: usize = 5;

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("Nothing to import: paste some CSV content first")]
    EmptyInput,

    #[error("Failed to parse CSV: {0}")]
    Parse(#[from] csv::Error),

    #[error("No valid rows to import ({short_rows} too short, {excluded_rows} excluded)")]
    NoValidRows {
        short_rows: usize,
        excluded_rows: usize,
    },
}

/// Which product codes are kept out of the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportFilter {
    /// Codes starting with any of these (case-insensitive) are dropped
    pub excluded_prefixes: Vec<String>,
    /// Codes starting with any of these markers (exact match) are pending and dropped
    pub pending_markers: Vec<String>,
}

impl Default for ImportFilter {
    fn default() -> Self {
        Self {
            excluded_prefixes: vec!["ZZ".to_string()],
            pending_markers: vec!["待".to_string()],
        }
    }
}

impl ImportFilter {
    /// Whether a trimmed product code should be dropped
    pub fn excludes(&self, code: &str) -> bool {
        let upper = code.to_uppercase();
        let excluded = self
            .excluded_prefixes
            .iter()
            .filter(|p| !p.is_empty())
            .any(|p| upper.starts_with(&p.to_uppercase()));
        excluded
            || self
                .pending_markers
                .iter()
                .filter(|m| !m.is_empty())
                .any(|m| code.starts_with(m.as_str()))
    }
}

/// Rows that survived parsing and filtering
#[derive(Debug, Clone, Default)]
pub struct ParsedCatalog {
    pub records: Vec<ProductRecord>,
    pub short_rows: usize,
    pub excluded_rows: usize,
}

#[derive(Debug, Clone, Default)]
pub struct CsvImporter {
    filter: ImportFilter,
}

impl CsvImporter {
    pub fn new(filter: ImportFilter) -> Self {
        Self { filter }
    }

    pub fn filter(&self) -> &ImportFilter {
        &self.filter
    }

    /// Parse pasted text
    pub fn parse(&self, text: &str) -> Result<ParsedCatalog, ImportError> {
        self.parse_bytes(text.as_bytes())
    }

    /// Parse raw bytes (file or stdin contents). Invalid UTF-8 is a parse error.
    pub fn parse_bytes(&self, bytes: &[u8]) -> Result<ParsedCatalog, ImportError> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Err(ImportError::EmptyInput);
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(bytes);

        let mut parsed = ParsedCatalog::default();
        for result in reader.records() {
            let row = result?;
            if row.len() < MIN_COLUMNS {
                parsed.short_rows += 1;
                continue;
            }

            let field = |i: usize| row.get(i).unwrap_or("").trim().to_string();
            let code = field(0);
            if self.filter.excludes(&code) {
                parsed.excluded_rows += 1;
                continue;
            }

            parsed.records.push(ProductRecord {
                id: parsed.records.len() as i64 + 1,
                code,
                category_name: field(2),
                name: field(3),
                spec: field(4),
                udi: String::new(),
            });
        }

        log::debug!(
            "Parsed {} rows ({} short, {} excluded)",
            parsed.records.len(),
            parsed.short_rows,
            parsed.excluded_rows
        );

        if parsed.records.is_empty() {
            return Err(ImportError::NoValidRows {
                short_rows: parsed.short_rows,
                excluded_rows: parsed.excluded_rows,
            });
        }

        Ok(parsed)
    }
}
