//! Existing ledger rows -> contribution records.

use chrono::{NaiveDate, NaiveDateTime};

use coinvest_core::ledger::{COL_DATE, COL_NEW_DISTRIBUTION, COL_NOTES};
use coinvest_core::{ContributionRecord, LedgerError, Result};

use super::distribution::parse_distribution;
use crate::grid_table::GridTable;

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];
const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

/// Normalize a ledger date cell to a calendar date, discarding any time part.
pub fn parse_ledger_date(cell: &str) -> Result<NaiveDate> {
    let s = cell.trim();
    DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(s, f).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
                .map(|dt| dt.date())
        })
        .ok_or_else(|| LedgerError::format(format!("unrecognized date '{s}'")))
}

/// Cell `name` of `row`, or a format error naming the missing column.
pub fn required_cell<'a>(table: &'a GridTable, row: usize, name: &str) -> Result<&'a str> {
    table
        .cell(row, name)
        .ok_or_else(|| LedgerError::format(format!("ledger has no '{name}' column")))
}

/// Convert row `row` of a decoded ledger into a record.
///
/// Columns are looked up by name, so historical column orders work too.
pub fn parse_ledger_row(table: &GridTable, row: usize) -> Result<ContributionRecord> {
    let date = parse_ledger_date(required_cell(table, row, COL_DATE)?)?;
    let distribution = parse_distribution(required_cell(table, row, COL_NEW_DISTRIBUTION)?)?;
    let note = required_cell(table, row, COL_NOTES)?;
    Ok(ContributionRecord::new(date, distribution, note))
}

/// Every row of a decoded ledger, in table order.
pub fn parse_ledger_rows(table: &GridTable) -> Result<Vec<ContributionRecord>> {
    (0..table.len()).map(|i| parse_ledger_row(table, i)).collect()
}
