//! Product catalog search.
//!
//! The catalog is a flat list of [`ProductRecord`]s held as one immutable
//! [`Generation`]. A [`SearchIndex`] is built per generation and answers term
//! queries from prefix and word buckets, falling back to a substring scan.
//! [`Session`] ties the pieces together:
//!
//! * `store` – persistence through an opaque key-value backend, with a
//!   built-in seed whenever nothing usable is stored.
//! * `scheduler` – debouncing of raw search input.
//! * `paginate` – fixed-size pages over a result set.
//! * `import` – replacing the catalog from pasted CSV.

pub mod config;
pub mod import;
pub mod index;
pub mod paginate;
pub mod record;
pub mod scheduler;
pub mod session;
pub mod store;

pub use config::{Config, ConfigError};
pub use import::{CsvImporter, ImportError, ImportFilter, ParsedCatalog};
pub use index::{Matches, QueryPath, SearchIndex, SearchOutcome};
pub use paginate::{ResultSet, PAGE_SIZE};
pub use record::{default_seed, Generation, ProductRecord};
pub use scheduler::{Debouncer, QueryScheduler, Ticket};
pub use session::{CatalogUpdate, SearchState, Session, UpdateKind, NO_RESULTS, PROMPT};
pub use store::{CatalogStore, FileStore, KeyValueStore, MemoryStore, StoreError};
