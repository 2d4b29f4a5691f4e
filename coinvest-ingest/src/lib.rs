//! coinvest-ingest: grid-table codec and parsers that turn ledger text and
//! informal contribution notes into typed records.

pub mod grid_table;
pub mod parsers;

pub use grid_table::{GridTable, decode, encode, wrap};
pub use parsers::{parse_contribution_blocks, parse_distribution, parse_ledger_rows};
