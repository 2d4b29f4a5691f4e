//! Contribution records: the unit the ledger engine folds over.

use chrono::NaiveDate;
use serde::Serialize;

use crate::distribution::Distribution;
use crate::error::Result;

/// One normalized contribution, from an existing ledger row or a freshly
/// reported expense block.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContributionRecord {
    pub date: NaiveDate,
    pub distribution: Distribution,
    pub note: String,
}

/// Identity and sort key: `(date, canonical JSON of the distribution)`,
/// taken after rounding so it matches what the ledger shows.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordKey {
    pub date: NaiveDate,
    pub distribution: String,
}

impl ContributionRecord {
    pub fn new(date: NaiveDate, distribution: Distribution, note: impl Into<String>) -> Self {
        Self {
            date,
            distribution,
            note: note.into(),
        }
    }

    pub fn key(&self) -> Result<RecordKey> {
        Ok(RecordKey {
            date: self.date,
            distribution: self.distribution.rounded().canonical_json()?,
        })
    }
}
