//! coinvest-core: shared types for the household co-investment ledger

pub mod amount;
pub mod distribution;
pub mod error;
pub mod ledger;
pub mod record;

pub use amount::{format_amount, format_percent, round1, round_dp};
pub use distribution::{Distribution, to_spaced_json};
pub use error::{LedgerError, Result};
pub use ledger::{LEDGER_COLUMNS, LedgerRow, LedgerState};
pub use record::{ContributionRecord, RecordKey};
