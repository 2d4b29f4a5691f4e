//! Informal "new contribution" notes -> contribution records.
//!
//! Blocks are separated by blank lines:
//!   2024-09-01. 0.3k | Harsh
//!   (Amazon home goods (toilet rugs: 70, Keurig + pods: 90))
//!
//!   2024-09-05. 3.4k | Harsh
//!   mortgage

use chrono::NaiveDate;
use regex::Regex;
use tracing::debug;

use coinvest_core::{ContributionRecord, Distribution, LedgerError, Result};

/// Strip one pair of enclosing parentheses and collapse whitespace runs.
fn clean_note(raw: &str) -> String {
    let s = raw.trim();
    let s = s
        .strip_prefix('(')
        .and_then(|rest| rest.strip_suffix(')'))
        .unwrap_or(s);
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parse every block in `text`. Blank input yields no records.
pub fn parse_contribution_blocks(text: &str) -> Result<Vec<ContributionRecord>> {
    let header_re = Regex::new(concat!(
        r"^(?P<date>\d{4}-\d{2}-\d{2})\.\s*",
        r"(?P<amount>\d+(?:\.\d*)?|\.\d+)\s*[kK]\s*\|\s*",
        r"(?P<person>\S.*?)\s*$"
    ))
    .map_err(|e| LedgerError::format(format!("contribution grammar: {e}")))?;

    let mut blocks: Vec<Vec<&str>> = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for line in text.lines().map(str::trim) {
        if line.is_empty() {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        blocks.push(current);
    }

    let mut out = Vec::with_capacity(blocks.len());
    for block in blocks {
        let header = block[0];
        let caps = header_re.captures(header).ok_or_else(|| {
            LedgerError::format(format!(
                "contribution should look like 'YYYY-MM-DD. <amount>k | <person>': {header}"
            ))
        })?;

        let date = NaiveDate::parse_from_str(&caps["date"], "%Y-%m-%d")
            .map_err(|e| LedgerError::format(format!("invalid date in '{header}': {e}")))?;
        let amount: f64 = caps["amount"]
            .parse()
            .map_err(|e| LedgerError::format(format!("invalid amount in '{header}': {e}")))?;
        if amount <= 0.0 {
            return Err(LedgerError::format(format!(
                "contribution amount must be positive: {header}"
            )));
        }
        let person = caps["person"].to_lowercase();
        let note = clean_note(&block[1..].join(" "));

        out.push(ContributionRecord::new(
            date,
            Distribution::from_entries([(person, amount)]),
            note,
        ));
    }

    debug!(count = out.len(), "parsed new contribution blocks");
    Ok(out)
}
