//! Running to-date columns for a flat expenses CSV.
//!
//! Expected columns (any order, extra columns kept):
//! date,spender,spend (x1k USD)

use serde::Serialize;
use serde::ser::Serializer;

use coinvest_core::{LedgerError, Result, format_amount, round_dp, to_spaced_json};

pub const COL_DATE: &str = "date";
pub const COL_SPENDER: &str = "spender";
pub const COL_SPEND: &str = "spend (x1k USD)";
pub const COL_TODATE_SPEND: &str = "todate_spend (x1k USD)";
pub const COL_TODATE_SPLIT: &str = "todate_spend_split (x1k USD)";
pub const COL_TODATE_OWNERSHIP: &str = "todate_ownership_percent_split";

/// Name -> value pairs kept in first-seen order.
#[derive(Debug, Clone, Default, PartialEq)]
struct Split(Vec<(String, f64)>);

impl Split {
    fn add(&mut self, name: &str, amount: f64) {
        match self.0.iter_mut().find(|(n, _)| n == name) {
            Some((_, v)) => *v = round_dp(*v + amount, 2),
            None => self.0.push((name.to_string(), round_dp(amount, 2))),
        }
    }
}

impl Serialize for Split {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(k, v)| (k, v)))
    }
}

fn column_index(headers: &[String], name: &str) -> Option<usize> {
    headers.iter().position(|h| h == name)
}

fn csv_err(e: impl std::fmt::Display) -> LedgerError {
    LedgerError::format(format!("expenses csv: {e}"))
}

/// Recompute the three to-date columns and return the CSV newest-first.
pub fn update_todate_columns(csv_text: &str) -> Result<String> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(csv_text.as_bytes());

    let mut headers: Vec<String> = rdr.headers().map_err(csv_err)?.iter().map(str::to_string).collect();
    let require = |name: &str| {
        column_index(&headers, name)
            .ok_or_else(|| LedgerError::format(format!("expenses csv has no '{name}' column")))
    };
    let date_idx = require(COL_DATE)?;
    let spender_idx = require(COL_SPENDER)?;
    let spend_idx = require(COL_SPEND)?;

    let mut rows: Vec<Vec<String>> = Vec::new();
    for record in rdr.records() {
        let record = record.map_err(csv_err)?;
        let mut row: Vec<String> = record.iter().map(str::to_string).collect();
        row.resize(headers.len(), String::new());
        rows.push(row);
    }
    rows.sort_by(|a, b| a[date_idx].cmp(&b[date_idx]));

    let todate_cols: Vec<usize> = [COL_TODATE_SPEND, COL_TODATE_SPLIT, COL_TODATE_OWNERSHIP]
        .iter()
        .map(|&name| match column_index(&headers, name) {
            Some(i) => i,
            None => {
                headers.push(name.to_string());
                headers.len() - 1
            }
        })
        .collect();

    let mut cumulative_spend = 0.0;
    let mut split = Split::default();
    for row in rows.iter_mut() {
        let spend: f64 = row[spend_idx]
            .parse()
            .map_err(|_| LedgerError::format(format!("invalid spend '{}'", row[spend_idx])))?;
        let spender = row[spender_idx].clone();

        cumulative_spend = round_dp(cumulative_spend + spend, 2);
        split.add(&spender, spend);
        if cumulative_spend == 0.0 {
            return Err(LedgerError::Division(format!(
                "to-date spend is zero on {}",
                row[date_idx]
            )));
        }
        let ownership = Split(
            split
                .0
                .iter()
                .map(|(name, v)| (name.clone(), round_dp(v / cumulative_spend * 100.0, 1)))
                .collect(),
        );

        row[spend_idx] = format_amount(spend);
        row.resize(headers.len(), String::new());
        row[todate_cols[0]] = format_amount(cumulative_spend);
        row[todate_cols[1]] = to_spaced_json(&split)?;
        row[todate_cols[2]] = to_spaced_json(&ownership)?;
    }
    rows.reverse();

    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(&headers).map_err(csv_err)?;
    for row in &rows {
        wtr.write_record(row).map_err(csv_err)?;
    }
    let bytes = wtr.into_inner().map_err(csv_err)?;
    String::from_utf8(bytes).map_err(csv_err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_todate_columns() {
        let input = "\
date,spender,spend (x1k USD),note
2024-06-28,harsh,0.9,Habitat furniture
2024-05-25,harsh,25,escrow
2024-07-01,aish,1.2,rug
";
        let out = update_todate_columns(input).unwrap();
        let mut rdr = csv::Reader::from_reader(out.as_bytes());
        let headers = rdr.headers().unwrap().clone();
        assert_eq!(headers.len(), 7);
        assert_eq!(&headers[4], COL_TODATE_SPEND);

        let rows: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
        // newest first
        assert_eq!(&rows[0][0], "2024-07-01");
        assert_eq!(&rows[0][4], "27.1");
        assert_eq!(&rows[0][5], r#"{"harsh": 25.9, "aish": 1.2}"#);
        assert_eq!(&rows[0][6], r#"{"harsh": 95.6, "aish": 4.4}"#);

        assert_eq!(&rows[2][0], "2024-05-25");
        assert_eq!(&rows[2][2], "25.0");
        assert_eq!(&rows[2][6], r#"{"harsh": 100.0}"#);
    }

    #[test]
    fn test_missing_column() {
        let err = update_todate_columns("date,who,spend (x1k USD)\n2024-01-01,a,1\n").unwrap_err();
        assert!(err.to_string().contains("spender"));
    }

    #[test]
    fn test_bad_spend() {
        let err = update_todate_columns("date,spender,spend (x1k USD)\n2024-01-01,a,lots\n").unwrap_err();
        assert!(matches!(err, LedgerError::Format(_)));
    }
}
