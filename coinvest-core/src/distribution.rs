//! Per-person amount mappings and their canonical JSON form.

use std::collections::BTreeMap;
use std::io;

use serde::Serialize;

use crate::amount::round1;
use crate::error::{LedgerError, Result};

/// Person name -> amount (x1k), always sorted by name.
///
/// Only positive amounts are kept; zero and negative entries are dropped on
/// the way in.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Distribution(BTreeMap<String, f64>);

impl Distribution {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from raw entries, dropping non-positive amounts.
    /// Repeated names are summed.
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let mut d = Self::new();
        for (name, amount) in entries {
            if amount > 0.0 {
                *d.0.entry(name.into()).or_insert(0.0) += amount;
            }
        }
        d
    }

    pub fn get(&self, person: &str) -> Option<f64> {
        self.0.get(person).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Add `amount` to `person`, rounding the new figure to one decimal.
    pub fn accumulate(&mut self, person: &str, amount: f64) {
        let slot = self.0.entry(person.to_string()).or_insert(0.0);
        *slot = round1(*slot + amount);
    }

    /// Copy with every amount rounded to one decimal. Entries that round
    /// down to zero are dropped.
    pub fn rounded(&self) -> Self {
        Self::from_entries(self.0.iter().map(|(k, v)| (k.clone(), round1(*v))))
    }

    /// Sum of all amounts, rounded to one decimal. An empty map totals `0.0`.
    pub fn total(&self) -> f64 {
        round1(self.0.values().fold(0.0, |acc, v| acc + v))
    }

    /// `{"aish": 0.6, "harsh": 3.4}`; used for ledger cells and record identity.
    pub fn canonical_json(&self) -> Result<String> {
        to_spaced_json(self)
    }
}

impl FromIterator<(String, f64)> for Distribution {
    fn from_iter<T: IntoIterator<Item = (String, f64)>>(iter: T) -> Self {
        Self::from_entries(iter)
    }
}

/// Serialize with `", "` and `": "` separators, the layout ledger cells use.
pub fn to_spaced_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let mut buf = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, SpacedFormatter);
    value
        .serialize(&mut ser)
        .map_err(|e| LedgerError::format(format!("serialize json: {e}")))?;
    String::from_utf8(buf).map_err(|e| LedgerError::format(format!("serialize json: {e}")))
}

struct SpacedFormatter;

impl serde_json::ser::Formatter for SpacedFormatter {
    fn begin_array_value<W: ?Sized + io::Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        if first { Ok(()) } else { writer.write_all(b", ") }
    }

    fn begin_object_key<W: ?Sized + io::Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        if first { Ok(()) } else { writer.write_all(b", ") }
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        writer.write_all(b": ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drops_non_positive_and_sorts() {
        let d = Distribution::from_entries([("harsh", 3.4), ("aish", 0.0), ("bo", -1.0), ("al", 0.6)]);
        let names: Vec<_> = d.iter().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["al", "harsh"]);
    }

    #[test]
    fn test_canonical_json() {
        let d = Distribution::from_entries([("harsh", 3.4), ("aish", 0.6)]);
        assert_eq!(d.canonical_json().unwrap(), r#"{"aish": 0.6, "harsh": 3.4}"#);

        let whole = Distribution::from_entries([("harsh", 4.0)]);
        assert_eq!(whole.canonical_json().unwrap(), r#"{"harsh": 4.0}"#);

        assert_eq!(Distribution::new().canonical_json().unwrap(), "{}");
    }

    #[test]
    fn test_accumulate_rounds() {
        let mut d = Distribution::new();
        d.accumulate("harsh", 78.6);
        d.accumulate("harsh", 0.3);
        assert_eq!(d.get("harsh"), Some(78.9));
        assert_eq!(d.total(), 78.9);
    }

    #[test]
    fn test_rounded_drops_vanishing_amounts() {
        let d = Distribution::from_entries([("harsh", 10.04), ("aish", 0.04)]).rounded();
        assert_eq!(d.get("harsh"), Some(10.0));
        assert_eq!(d.get("aish"), None);
        assert_eq!(d.canonical_json().unwrap(), r#"{"harsh": 10.0}"#);
    }

    #[test]
    fn test_empty_total_is_positive_zero() {
        let total = Distribution::new().total();
        assert!(total.is_sign_positive());
        assert_eq!(crate::amount::format_amount(total), "0.0");
    }
}
