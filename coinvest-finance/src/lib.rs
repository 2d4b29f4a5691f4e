//! coinvest-finance: ledger accumulation, ingestion modes, and the
//! expenses to-date calculator

pub mod accumulator;
pub mod expenses;
pub mod ingestion;

pub use accumulator::{LedgerAccumulator, ownership_percentages};
pub use expenses::update_todate_columns;
pub use ingestion::{DEFAULT_MAX_CELL_WIDTH, IngestOptions, ingest};
