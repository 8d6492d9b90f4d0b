//! Historical outcome batches used to bootstrap strategies.
//!
//! A batch is an ordered list of rows.  Each row carries the customer context and
//! zero or more observed outcomes keyed by product identifier.  A missing field
//! means "not observed", which is different from an outcome of `0`.

use rand::{Rng, RngCore};
use std::collections::BTreeMap;

use crate::Catalogue;

/// One historical observation row.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HistoryRecord {
    pub age: f64,
    pub wealth: f64,
    /// Observed outcome per product (`1.0` bought, `0.0` not bought; aggregated
    /// data may carry other counts).
    pub outcomes: BTreeMap<String, f64>,
}

impl HistoryRecord {
    pub fn new(age: f64, wealth: f64) -> Self {
        Self {
            age,
            wealth,
            outcomes: BTreeMap::new(),
        }
    }

    /// Builder-style outcome setter; accepts `bool` or numeric values.
    pub fn with_outcome(mut self, product: impl Into<String>, value: impl Into<f64>) -> Self {
        self.outcomes.insert(product.into(), value.into());
        self
    }

    pub fn outcome(&self, product: &str) -> Option<f64> {
        self.outcomes.get(product).copied()
    }
}

/// An ordered batch of [`HistoryRecord`]s.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct History {
    pub records: Vec<HistoryRecord>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: HistoryRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, HistoryRecord> {
        self.records.iter()
    }

    /// Sum of a product's outcome column.
    ///
    /// `None` when no row carries the field at all, i.e. the column does not
    /// exist in this batch.
    pub fn column_sum(&self, product: &str) -> Option<f64> {
        let mut seen = false;
        let mut sum = 0.0;
        for value in self.records.iter().filter_map(|r| r.outcome(product)) {
            seen = true;
            sum += value;
        }
        seen.then_some(sum)
    }
}

impl FromIterator<HistoryRecord> for History {
    fn from_iter<I: IntoIterator<Item = HistoryRecord>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a History {
    type Item = &'a HistoryRecord;
    type IntoIter = std::slice::Iter<'a, HistoryRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Draw a synthetic batch of `size` customers.
///
/// Each row has a uniform `(age, wealth)` in `[0, 1)^2` and one purchase draw per
/// catalogue product, so every product is observed in every row.
pub fn generate_history(catalogue: &Catalogue, size: usize, rng: &mut dyn RngCore) -> History {
    (0..size)
        .map(|_| {
            let age: f64 = rng.random();
            let wealth: f64 = rng.random();
            let mut record = HistoryRecord::new(age, wealth);
            for (id, product) in catalogue.iter() {
                record
                    .outcomes
                    .insert(id.to_string(), product.is_bought_by(age, wealth, rng).into());
            }
            record
        })
        .collect()
}
