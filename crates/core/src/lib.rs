//! `ctrsum-core`: CTR aggregation engine.
//!
//! Pure engine crate: receives pre-read sheet tables, resolves the company
//! behind each file and returns per-company totals. No spreadsheet or
//! network dependencies.

pub mod aggregate;
pub mod classify;
pub mod dictionary;
pub mod error;
pub mod fallback;
pub mod matcher;
pub mod model;
pub mod store;

pub use aggregate::{run_batch, Aggregator};
pub use classify::{ClassifierChain, CompanyClassifier};
pub use dictionary::IndicatorDictionary;
pub use error::CtrError;
pub use model::{BatchReport, CompanySummaryRow, FileRecord, RawCell, SheetTable, UNKNOWN_COMPANY};
pub use store::{IndicatorStore, MemoryStore};
