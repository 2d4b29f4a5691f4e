//! Error taxonomy shared by the codec, the record parsers and the ledger engine.

use chrono::NaiveDate;

pub type Result<T> = std::result::Result<T, LedgerError>;

/// Every way a ledger run can fail. All variants stem from malformed input,
/// so none of them are worth retrying.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LedgerError {
    /// Malformed grid-table or contribution-block syntax.
    #[error("format error: {0}")]
    Format(String),

    /// A header or data line split into the wrong number of cells.
    #[error("expected {expected} columns, but found {found}")]
    ColumnCount { expected: usize, found: usize },

    /// A record dated before the last row already folded into the ledger.
    #[error("contribution dated {date} is older than the last ledger entry ({last})")]
    Order { date: NaiveDate, last: NaiveDate },

    /// The same `(date, distribution)` pair was seen twice.
    #[error("contribution already exists in ledger with (date, distribution) = ({date}, {distribution})")]
    Duplicate { date: NaiveDate, distribution: String },

    /// Incremental mode could not read the last cumulative snapshot.
    #[error("could not seed ledger from its last row: {0}; try again with rebuild mode")]
    SeedParse(String),

    /// Ownership percentages requested against a zero running total.
    #[error("cannot compute ownership percentages: {0}")]
    Division(String),
}

impl LedgerError {
    pub fn format(msg: impl Into<String>) -> Self {
        LedgerError::Format(msg.into())
    }
}
