//! Ledger ingestion: merge newly reported contributions into an existing
//! grid-table ledger and render the updated ledger.
//!
//! Two modes:
//! - rebuild: reparse every historical row and refold from an empty state;
//! - incremental: trust the last row's running distribution as the seed and
//!   carry the existing rows forward untouched.

use std::collections::HashSet;

use chrono::NaiveDate;
use tracing::{debug, info};

use coinvest_core::ledger::{COL_DATE, COL_TOTAL_DISTRIBUTION};
use coinvest_core::{
    ContributionRecord, LEDGER_COLUMNS, LedgerError, LedgerState, RecordKey, Result,
};
use coinvest_ingest::parsers::{parse_ledger_date, parse_ledger_row, required_cell};
use coinvest_ingest::{GridTable, decode, encode, parse_contribution_blocks, parse_distribution};

use crate::accumulator::LedgerAccumulator;

pub const DEFAULT_MAX_CELL_WIDTH: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestOptions {
    pub rebuild_from_scratch: bool,
    pub max_cell_width: usize,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            rebuild_from_scratch: false,
            max_cell_width: DEFAULT_MAX_CELL_WIDTH,
        }
    }
}

impl IngestOptions {
    pub fn rebuild() -> Self {
        Self {
            rebuild_from_scratch: true,
            ..Self::default()
        }
    }
}

/// Ingest `new_contributions` into `existing_ledger` and return the updated
/// ledger text, newest row first.
pub fn ingest(existing_ledger: &str, new_contributions: &str, options: IngestOptions) -> Result<String> {
    let history = if existing_ledger.trim().is_empty() {
        GridTable::new(LEDGER_COLUMNS)
    } else {
        decode(existing_ledger)?
    };
    let order = chronological_order(&history)?;

    info!(
        rows = history.len(),
        rebuild = options.rebuild_from_scratch,
        "ingesting into ledger"
    );

    let (prefix, seed, mut records, mut seen) = if options.rebuild_from_scratch {
        let records = order
            .iter()
            .map(|(_, i)| parse_ledger_row(&history, *i))
            .collect::<Result<Vec<_>>>()?;
        (Vec::new(), LedgerState::default(), records, HashSet::new())
    } else {
        let (seed, seen) = seed_from_last_row(&history, &order)?;
        let carried = history.reindexed(&LEDGER_COLUMNS);
        let prefix: Vec<Vec<String>> = order.iter().map(|(_, i)| carried.rows()[*i].clone()).collect();
        (prefix, seed, Vec::new(), seen)
    };

    let new_records = parse_contribution_blocks(new_contributions)?;
    info!(count = new_records.len(), "new contributions");
    records.extend(new_records);

    let mut keyed: Vec<(RecordKey, ContributionRecord)> = Vec::with_capacity(records.len());
    for record in records {
        let key = record.key()?;
        if !seen.insert(key.clone()) {
            return Err(LedgerError::Duplicate {
                date: key.date,
                distribution: key.distribution,
            });
        }
        keyed.push((key, record));
    }
    keyed.sort_by(|a, b| a.0.cmp(&b.0));
    let records: Vec<ContributionRecord> = keyed.into_iter().map(|(_, r)| r).collect();

    let (rows, state) = LedgerAccumulator::fold(&records, seed)?;
    debug!(
        folded = rows.len(),
        total = state.cumulative_total,
        "folded contributions"
    );

    let mut lines = prefix;
    for row in &rows {
        lines.push(row.to_cells()?);
    }
    lines.reverse();

    let mut table = GridTable::new(LEDGER_COLUMNS);
    for line in lines {
        table.push_row(line)?;
    }
    Ok(encode(&table, options.max_cell_width))
}

/// Row indices oldest-first. The ledger is written newest-first, so file
/// order is reversed before a stable sort by date.
fn chronological_order(table: &GridTable) -> Result<Vec<(NaiveDate, usize)>> {
    let mut order = (0..table.len())
        .rev()
        .map(|i| {
            let cell = required_cell(table, i, COL_DATE)?;
            Ok((parse_ledger_date(cell)?, i))
        })
        .collect::<Result<Vec<_>>>()?;
    order.sort_by_key(|(date, _)| *date);
    Ok(order)
}

/// Seed state from the chronologically last row, plus the identity keys of
/// every row on that date. Older history cannot collide with new records
/// without first failing the ordering check.
fn seed_from_last_row(
    table: &GridTable,
    order: &[(NaiveDate, usize)],
) -> Result<(LedgerState, HashSet<RecordKey>)> {
    let Some(&(last_date, last_idx)) = order.last() else {
        return Ok((LedgerState::default(), HashSet::new()));
    };

    let cell = required_cell(table, last_idx, COL_TOTAL_DISTRIBUTION)
        .map_err(|e| LedgerError::SeedParse(e.to_string()))?;
    let distribution = parse_distribution(cell).map_err(|e| LedgerError::SeedParse(e.to_string()))?;
    let seed = LedgerState::from_snapshot(distribution, last_date);
    debug!(
        date = %last_date,
        total = seed.cumulative_total,
        "seeded from last ledger row"
    );

    let seen = order
        .iter()
        .filter(|(date, _)| *date == last_date)
        .map(|(_, i)| parse_ledger_row(table, *i)?.key())
        .collect::<Result<HashSet<_>>>()
        .map_err(|e| LedgerError::SeedParse(e.to_string()))?;

    Ok((seed, seen))
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEDGER: &str = r#"
+------------+----------------------+-----------------------------------+------------------------+-------------------------------------+------------------------------+----------+
| date       | new investment (x1k) | new investment distribution (x1k) | total investment (x1k) | total investment distribution (x1k) | total ownership distribution | notes    |
+============+======================+===================================+========================+=====================================+==============================+==========+
| 2024-08-01 | 78.6                 | {Harsh: 78.6}                     | 78.6                   | {Harsh: 78.6}                       | {Harsh: 100%}                | mortgage |
+------------+----------------------+-----------------------------------+------------------------+-------------------------------------+------------------------------+----------+
"#;

    #[test]
    fn test_rebuild_example() {
        let out = ingest(LEDGER, "2024-09-01. 0.3k | Harsh", IngestOptions::rebuild()).unwrap();
        let table = decode(&out).unwrap();
        assert_eq!(table.columns(), &LEDGER_COLUMNS);
        assert_eq!(table.len(), 2);

        assert_eq!(table.cell(0, "date"), Some("2024-09-01"));
        assert_eq!(table.cell(0, "new investment (x1k)"), Some("0.3"));
        assert_eq!(table.cell(0, "total investment (x1k)"), Some("78.9"));
        assert_eq!(table.cell(0, "total investment distribution (x1k)"), Some(r#"{"harsh": 78.9}"#));
        assert_eq!(table.cell(0, "total ownership distribution"), Some(r#"{"harsh": "100%"}"#));
    }

    #[test]
    fn test_incremental_carries_rows_unchanged() {
        let out = ingest(LEDGER, "2024-09-01. 0.3k | Harsh", IngestOptions::default()).unwrap();
        let table = decode(&out).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.cell(1, "new investment distribution (x1k)"), Some("{Harsh: 78.6}"));
        assert_eq!(table.cell(0, "total investment (x1k)"), Some("78.9"));
    }

    #[test]
    fn test_blank_ledger_starts_fresh() {
        let out = ingest("", "2024-09-01. 2k | Aish\n\n2024-09-02. 2k | Harsh", IngestOptions::default()).unwrap();
        let table = decode(&out).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.cell(0, "total ownership distribution"), Some(r#"{"aish": "50%", "harsh": "50%"}"#));
    }

    #[test]
    fn test_seed_error_in_incremental_mode() {
        let broken = "
+-+-+-+-+-+-+-+
| date | new investment (x1k) | new investment distribution (x1k) | total investment (x1k) | total investment distribution (x1k) | total ownership distribution | notes |
+=+=+=+=+=+=+=+
| 2024-08-01 | 78.6 | {Harsh: 78.6} | 78.6 | {Harsh 78.6} | {Harsh: 100%} | mortgage |
+-+-+-+-+-+-+-+
";
        let err = ingest(broken, "2024-09-01. 0.3k | Harsh", IngestOptions::default()).unwrap_err();
        assert!(matches!(err, LedgerError::SeedParse(_)));
        assert!(err.to_string().contains("rebuild"));

        // rebuild ignores the stale running columns
        assert!(ingest(broken, "2024-09-01. 0.3k | Harsh", IngestOptions::rebuild()).is_ok());
    }

    #[test]
    fn test_duplicate_within_new_contributions() {
        let new = "2024-09-01. 0.3k | Harsh\nrugs\n\n2024-09-01. 0.3k | Harsh\ngrinders";
        let err = ingest(LEDGER, new, IngestOptions::default()).unwrap_err();
        assert!(matches!(err, LedgerError::Duplicate { .. }));
    }

    const SMALL_LEDGER: &str = "
+-+-+-+-+-+-+-+
| date | new investment (x1k) | new investment distribution (x1k) | total investment (x1k) | total investment distribution (x1k) | total ownership distribution | notes |
+=+=+=+=+=+=+=+
| 2024-08-01 | 10 | {Harsh: 10.04} | 10 | {Harsh: 10} | {Harsh: 100%} | deposit |
+-+-+-+-+-+-+-+
";

    #[test]
    fn test_rebuild_is_stable_when_amount_rounds_to_zero() {
        let once = ingest(SMALL_LEDGER, "2024-09-01. 0.04k | Aish", IngestOptions::rebuild()).unwrap();
        let table = decode(&once).unwrap();
        assert_eq!(table.cell(0, "new investment (x1k)"), Some("0.0"));
        assert_eq!(table.cell(0, "new investment distribution (x1k)"), Some("{}"));
        assert_eq!(table.cell(0, "total investment distribution (x1k)"), Some(r#"{"harsh": 10.0}"#));
        assert_eq!(table.cell(0, "total ownership distribution"), Some(r#"{"harsh": "100%"}"#));

        let twice = ingest(&once, "", IngestOptions::rebuild()).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_duplicate_detected_after_rounding() {
        let err = ingest(SMALL_LEDGER, "2024-08-01. 10k | Harsh", IngestOptions::rebuild()).unwrap_err();
        assert!(matches!(err, LedgerError::Duplicate { .. }));

        let err = ingest(SMALL_LEDGER, "2024-08-01. 10k | Harsh", IngestOptions::default()).unwrap_err();
        assert!(matches!(err, LedgerError::Duplicate { .. }));
    }

    #[test]
    fn test_bad_new_distribution_on_seed_date_is_seed_error() {
        let broken = SMALL_LEDGER.replace("{Harsh: 10.04}", "{Harsh 10.04}");
        let err = ingest(&broken, "2024-09-01. 0.3k | Harsh", IngestOptions::default()).unwrap_err();
        assert!(matches!(err, LedgerError::SeedParse(_)));
        assert!(err.to_string().contains("rebuild"));
    }
}
