use core_types::{CoreError, Instrument, PricePair, PricePairs, ReturnRecord};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

/// Counts describing how much of the input survived the join.
///
/// Dropping unmatched rows is not an error; these numbers let callers report
/// coverage without the engine changing that policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct JoinStats {
    /// Instrument rows handed to the engine.
    pub instruments: usize,
    /// Price pairs handed to the engine.
    pub price_pairs: usize,
    /// Records produced.
    pub joined: usize,
    /// Instruments with no price pair.
    pub without_prices: usize,
    /// Price pairs with no matching instrument.
    pub unmatched_prices: usize,
    /// Joined rows dropped because the start price was zero or negative.
    pub rejected_start_price: usize,
    /// Joined rows dropped because the return overflowed `Decimal`.
    pub overflowed_returns: usize,
    /// Instrument rows ignored because an earlier row had the same code.
    pub duplicate_instruments: usize,
}

/// A stateless calculator that joins instruments with their prices and
/// computes returns.
#[derive(Debug, Default)]
pub struct ReturnEngine {}

impl ReturnEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inner-joins `instruments` with `prices` on code and computes each return.
    ///
    /// The first instrument row for a code wins. Records with a non-positive
    /// start price, or a return too large for `Decimal`, are dropped and counted.
    pub fn compute(&self, instruments: Vec<Instrument>, prices: &PricePairs) -> ReturnSet {
        let mut stats = JoinStats {
            instruments: instruments.len(),
            price_pairs: prices.pairs.len(),
            ..JoinStats::default()
        };

        let by_code: HashMap<&str, &PricePair> =
            prices.pairs.iter().map(|p| (p.code.as_str(), p)).collect();
        let mut seen: HashSet<String> = HashSet::new();
        let mut records = Vec::new();

        for instrument in instruments {
            if !seen.insert(instrument.code.clone()) {
                stats.duplicate_instruments += 1;
                continue;
            }
            let Some(pair) = by_code.get(instrument.code.as_str()) else {
                stats.without_prices += 1;
                continue;
            };
            match ReturnRecord::new(instrument, pair) {
                Ok(record) => records.push(record),
                Err(e @ CoreError::NonPositiveStartPrice { .. }) => {
                    tracing::warn!(code = %pair.code, error = %e, "Dropping record with unusable start price.");
                    stats.rejected_start_price += 1;
                }
                Err(e) => {
                    tracing::warn!(code = %pair.code, error = %e, "Dropping record whose return cannot be computed.");
                    stats.overflowed_returns += 1;
                }
            }
        }

        stats.joined = records.len();
        stats.unmatched_prices = by_code.keys().filter(|code| !seen.contains(**code)).count();

        records.sort_by(descending);
        ReturnSet { records, stats }
    }
}

/// The joined records of one analysis, kept in ranking order.
///
/// Ranking order is `return_pct` descending; equal returns are ordered by code
/// ascending. Bottom-N uses `return_pct` ascending with the same code tie-break.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReturnSet {
    records: Vec<ReturnRecord>,
    stats: JoinStats,
}

impl ReturnSet {
    /// Every record, best return first.
    pub fn records(&self) -> &[ReturnRecord] {
        &self.records
    }

    /// The `n` highest returns, best first.
    pub fn top(&self, n: usize) -> Vec<&ReturnRecord> {
        self.records.iter().take(n).collect()
    }

    /// The `n` lowest returns, worst first.
    pub fn bottom(&self, n: usize) -> Vec<&ReturnRecord> {
        let mut ascending: Vec<&ReturnRecord> = self.records.iter().collect();
        ascending.sort_by(|a, b| a.return_pct.cmp(&b.return_pct).then_with(|| a.code().cmp(b.code())));
        ascending.truncate(n);
        ascending
    }

    /// Number of analyzed records.
    pub fn total(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn stats(&self) -> &JoinStats {
        &self.stats
    }
}

fn descending(a: &ReturnRecord, b: &ReturnRecord) -> Ordering {
    b.return_pct
        .cmp(&a.return_pct)
        .then_with(|| a.code().cmp(b.code()))
}
