pub mod contribution_block;
pub mod distribution;
pub mod ledger_row;

pub use contribution_block::parse_contribution_blocks;
pub use distribution::parse_distribution;
pub use ledger_row::{parse_ledger_date, parse_ledger_row, parse_ledger_rows, required_cell};
