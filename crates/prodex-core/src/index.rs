//! Word and prefix index over one catalog generation
//!
//! Two bucket maps are kept apart so a short prefix never collides with an
//! identical whole word:
//! - `words`: every whitespace token of the lowercase `code name spec` text
//! - `prefixes`: the first 1..=9 characters of each lowercase field
//!
//! Buckets hold positions into the generation, in catalog order and without
//! duplicates. A query tries the prefix bucket, then the word bucket, and
//! finally scans the whole generation for a substring match.

use crate::record::{Generation, ProductRecord};
use std::collections::HashMap;
use std::time::Instant;

/// Longest prefix (in characters) that gets its own bucket
pub const MAX_PREFIX_CHARS: usize = 9;

/// Which lookup answered a query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryPath {
    Prefix,
    Word,
    Scan,
}

/// Records matching a non-empty term, in catalog order
#[derive(Debug, Clone)]
pub struct Matches {
    /// Normalized term that was searched
    pub term: String,
    pub path: QueryPath,
    pub records: Vec<ProductRecord>,
}

/// Outcome of a query
#[derive(Debug, Clone)]
pub enum SearchOutcome {
    /// The term was blank after normalization; nothing was searched
    NoQuery,
    /// The term was searched. `records` may be empty.
    Matches(Matches),
}

impl SearchOutcome {
    pub fn is_no_query(&self) -> bool {
        matches!(self, SearchOutcome::NoQuery)
    }

    /// Matched records, empty for [`SearchOutcome::NoQuery`]
    pub fn records(&self) -> &[ProductRecord] {
        match self {
            SearchOutcome::NoQuery => &[],
            SearchOutcome::Matches(m) => &m.records,
        }
    }
}

/// Lowercase and trim a raw search term. Blank terms normalize to `None`.
pub fn normalize_term(raw: &str) -> Option<String> {
    let term = raw.to_lowercase().trim().to_string();
    (!term.is_empty()).then_some(term)
}

type Bucket = Vec<usize>;

pub struct SearchIndex {
    generation: Generation,
    words: HashMap<String, Bucket>,
    prefixes: HashMap<String, Bucket>,
}

impl SearchIndex {
    /// Build the index for a generation. Never fails; empty fields simply add nothing.
    pub fn build(generation: Generation) -> Self {
        let start = Instant::now();
        let mut words: HashMap<String, Bucket> = HashMap::new();
        let mut prefixes: HashMap<String, Bucket> = HashMap::new();

        for (pos, record) in generation.iter().enumerate() {
            for word in record.searchable_text().split_whitespace() {
                push_unique(words.entry(word.to_string()).or_default(), pos);
            }

            for field in record.searchable_fields() {
                let mut prefix = String::new();
                for ch in field.to_lowercase().chars().take(MAX_PREFIX_CHARS) {
                    prefix.push(ch);
                    push_unique(prefixes.entry(prefix.clone()).or_default(), pos);
                }
            }
        }

        log::info!(
            "Search index built: {} records, {} words, {} prefixes in {:?}",
            generation.len(),
            words.len(),
            prefixes.len(),
            start.elapsed()
        );

        Self {
            generation,
            words,
            prefixes,
        }
    }

    /// The generation this index was built from
    pub fn generation(&self) -> &Generation {
        &self.generation
    }

    /// Total number of buckets (words and prefixes)
    pub fn term_count(&self) -> usize {
        self.words.len() + self.prefixes.len()
    }

    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    pub fn prefix_count(&self) -> usize {
        self.prefixes.len()
    }

    /// Search for a raw term.
    pub fn query(&self, raw: &str) -> SearchOutcome {
        let Some(term) = normalize_term(raw) else {
            return SearchOutcome::NoQuery;
        };

        let (path, positions) = self.lookup(&term);
        log::debug!(
            "Query {:?} answered by {:?} with {} hits",
            term,
            path,
            positions.len()
        );

        SearchOutcome::Matches(Matches {
            records: self.collect(&positions),
            term,
            path,
        })
    }

    /// Resolve an already normalized term to catalog positions.
    fn lookup(&self, term: &str) -> (QueryPath, Vec<usize>) {
        if let Some(bucket) = self.prefixes.get(term) {
            return (QueryPath::Prefix, bucket.clone());
        }
        if let Some(bucket) = self.words.get(term) {
            return (QueryPath::Word, bucket.clone());
        }
        (QueryPath::Scan, self.scan(term))
    }

    /// Linear substring scan over `code`, `name` and `spec`.
    ///
    /// `term` must already be normalized. This is the fallback when both
    /// buckets miss, and is public so callers can cross-check the index.
    pub fn scan(&self, term: &str) -> Vec<usize> {
        self.generation
            .iter()
            .enumerate()
            .filter(|(_, record)| {
                record
                    .searchable_fields()
                    .iter()
                    .any(|field| field.to_lowercase().contains(term))
            })
            .map(|(pos, _)| pos)
            .collect()
    }

    /// Records for the given positions, in the given order
    pub fn collect(&self, positions: &[usize]) -> Vec<ProductRecord> {
        positions
            .iter()
            .map(|&pos| self.generation[pos].clone())
            .collect()
    }
}

/// Buckets are filled in catalog order, so a repeat can only be the last entry
fn push_unique(bucket: &mut Bucket, pos: usize) {
    if bucket.last() != Some(&pos) {
        bucket.push(pos);
    }
}
