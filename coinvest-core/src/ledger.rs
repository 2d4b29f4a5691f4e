//! Ledger state and output rows.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::amount::format_amount;
use crate::distribution::{Distribution, to_spaced_json};
use crate::error::Result;

pub const COL_DATE: &str = "date";
pub const COL_NEW_INVESTMENT: &str = "new investment (x1k)";
pub const COL_NEW_DISTRIBUTION: &str = "new investment distribution (x1k)";
pub const COL_TOTAL_INVESTMENT: &str = "total investment (x1k)";
pub const COL_TOTAL_DISTRIBUTION: &str = "total investment distribution (x1k)";
pub const COL_OWNERSHIP: &str = "total ownership distribution";
pub const COL_NOTES: &str = "notes";

/// Canonical column order for rendered ledgers.
pub const LEDGER_COLUMNS: [&str; 7] = [
    COL_DATE,
    COL_NEW_INVESTMENT,
    COL_NEW_DISTRIBUTION,
    COL_TOTAL_INVESTMENT,
    COL_TOTAL_DISTRIBUTION,
    COL_OWNERSHIP,
    COL_NOTES,
];

/// Running cumulative state carried across records during one fold.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LedgerState {
    pub cumulative_distribution: Distribution,
    pub cumulative_total: f64,
    /// Date of the last row folded into this state.
    pub last_date: Option<NaiveDate>,
}

impl LedgerState {
    /// Rebuild a state from a cumulative snapshot (e.g. a ledger's last row).
    pub fn from_snapshot(cumulative_distribution: Distribution, last_date: NaiveDate) -> Self {
        let cumulative_distribution = cumulative_distribution.rounded();
        let cumulative_total = cumulative_distribution.total();
        Self {
            cumulative_distribution,
            cumulative_total,
            last_date: Some(last_date),
        }
    }
}

/// One computed ledger line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerRow {
    pub date: NaiveDate,
    pub new_investment: f64,
    pub new_distribution: Distribution,
    pub total_investment: f64,
    pub total_distribution: Distribution,
    /// person -> "NN.NN%"
    pub ownership: BTreeMap<String, String>,
    pub note: String,
}

impl LedgerRow {
    /// Cells in `LEDGER_COLUMNS` order.
    pub fn to_cells(&self) -> Result<Vec<String>> {
        Ok(vec![
            self.date.format("%Y-%m-%d").to_string(),
            format_amount(self.new_investment),
            self.new_distribution.canonical_json()?,
            format_amount(self.total_investment),
            self.total_distribution.canonical_json()?,
            to_spaced_json(&self.ownership)?,
            self.note.clone(),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_cells() {
        let total = Distribution::from_entries([("harsh", 78.9)]);
        let row = LedgerRow {
            date: NaiveDate::from_ymd_opt(2024, 9, 1).unwrap(),
            new_investment: 0.3,
            new_distribution: Distribution::from_entries([("harsh", 0.3)]),
            total_investment: 78.9,
            total_distribution: total,
            ownership: BTreeMap::from([("harsh".to_string(), "100%".to_string())]),
            note: "rugs".to_string(),
        };
        let cells = row.to_cells().unwrap();
        assert_eq!(cells.len(), LEDGER_COLUMNS.len());
        assert_eq!(cells[0], "2024-09-01");
        assert_eq!(cells[1], "0.3");
        assert_eq!(cells[4], r#"{"harsh": 78.9}"#);
        assert_eq!(cells[5], r#"{"harsh": "100%"}"#);
    }

    #[test]
    fn test_state_from_snapshot() {
        let d = Distribution::from_entries([("harsh", 82.26), ("aish", 0.6)]);
        let state = LedgerState::from_snapshot(d, NaiveDate::from_ymd_opt(2024, 9, 5).unwrap());
        assert_eq!(state.cumulative_distribution.get("harsh"), Some(82.3));
        assert_eq!(state.cumulative_total, 82.9);
    }
}
