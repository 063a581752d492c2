use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A single catalog entry.
///
/// Field names serialize in camelCase so persisted catalogs stay readable by
/// other clients of the same key-value store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProductRecord {
    pub id: i64,
    pub code: String,
    pub category_name: String,
    pub name: String,
    pub spec: String,
    pub udi: String,
}

impl ProductRecord {
    /// The fields that participate in term search, in index order
    pub fn searchable_fields(&self) -> [&str; 3] {
        [&self.code, &self.name, &self.spec]
    }

    /// Lowercase `code name spec`, space-joined
    pub fn searchable_text(&self) -> String {
        self.searchable_fields().join(" ").to_lowercase()
    }
}

/// One complete, atomically replaced snapshot of the catalog.
///
/// Cloning a generation is cheap; the search index and the store share the
/// same backing records.
pub type Generation = Arc<[ProductRecord]>;

/// Built-in catalog used when nothing has been persisted yet
pub fn default_seed() -> Vec<ProductRecord> {
    let row = |id, code: &str, category: &str, name: &str, spec: &str| ProductRecord {
        id,
        code: code.to_string(),
        category_name: category.to_string(),
        name: name.to_string(),
        spec: spec.to_string(),
        udi: String::new(),
    };

    vec![
        row(1, "0137NE", "Syringes", "Perouse Perouse Syringes 150ml", ""),
        row(
            2,
            "0163NA",
            "High Pressure Tubing",
            "Perouse HighPressure Line 50cm",
            "1.8mm",
        ),
        row(
            3,
            "0163ND",
            "High Pressure Tubing",
            "Perouse HighPressure Line120cm",
            "",
        ),
        row(
            4,
            "0185NA",
            "Inflation Device",
            "Perouse Inflation Device 30atm",
            "",
        ),
    ]
}
