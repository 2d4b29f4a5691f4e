//! Ledger accumulator: folds contribution records into running totals.

use std::collections::BTreeMap;

use coinvest_core::{
    ContributionRecord, Distribution, LedgerError, LedgerRow, LedgerState, Result, format_percent,
};

/// Replays records over a [`LedgerState`], one output row per record.
///
/// Holds no state of its own; the state lives only for one `fold` call.
pub struct LedgerAccumulator;

impl LedgerAccumulator {
    /// Fold `records` (already in ledger order) on top of `seed`.
    /// Returns the new rows oldest-first together with the final state.
    pub fn fold(
        records: &[ContributionRecord],
        seed: LedgerState,
    ) -> Result<(Vec<LedgerRow>, LedgerState)> {
        let mut state = seed;
        let rows = records
            .iter()
            .map(|r| Self::apply(&mut state, r))
            .collect::<Result<Vec<_>>>()?;
        Ok((rows, state))
    }

    /// Fold a single record into `state`.
    pub fn apply(state: &mut LedgerState, record: &ContributionRecord) -> Result<LedgerRow> {
        if let Some(last) = state.last_date {
            if record.date < last {
                return Err(LedgerError::Order {
                    date: record.date,
                    last,
                });
            }
        }

        let new_distribution = record.distribution.rounded();
        let new_investment = new_distribution.total();

        for (person, amount) in new_distribution.iter() {
            state.cumulative_distribution.accumulate(person, amount);
        }
        state.cumulative_total = state.cumulative_distribution.total();
        state.last_date = Some(record.date);

        let ownership = ownership_percentages(&state.cumulative_distribution, state.cumulative_total)
            .map_err(|e| match e {
                LedgerError::Division(msg) => LedgerError::Division(format!("{msg} on {}", record.date)),
                other => other,
            })?;

        Ok(LedgerRow {
            date: record.date,
            new_investment,
            new_distribution,
            total_investment: state.cumulative_total,
            total_distribution: state.cumulative_distribution.clone(),
            ownership,
            note: record.note.clone(),
        })
    }
}

/// Each person's share of `total`, as `"NN.NN%"` strings.
pub fn ownership_percentages(cumulative: &Distribution, total: f64) -> Result<BTreeMap<String, String>> {
    if total == 0.0 {
        return Err(LedgerError::Division("running total investment is zero".to_string()));
    }
    Ok(cumulative
        .iter()
        .map(|(person, amount)| (person.to_string(), format_percent(amount / total * 100.0)))
        .collect())
}
