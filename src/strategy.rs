//! The `Strategy` trait shared by every recommendation policy.
//!
//! A strategy is asked for a recommendation at a context, then told what happened:
//!
//! ```text
//!   get_recommendation(age, wealth) -> product
//!   pass_feedback(age, wealth, product, reward)
//! ```
//!
//! Bootstrapping from a historical batch goes through
//! [`Strategy::learn_from_history`].  There is deliberately no default body:
//! each policy either calls [`replay_history`] (feed every observed field
//! through `pass_feedback`, as if it had happened live) or aggregates the
//! batch itself.

use tracing::debug;

use crate::{Catalogue, History, Result};

/// Suffix appended to a strategy's name once it has learned from history.
pub const TRAINED_SUFFIX: &str = " - with training data";

/// Common interface for recommendation policies.
///
/// # Example
///
/// ```rust
/// use banditfriday::{Catalogue, ConstantProduct, Strategy, ThompsonSampling};
///
/// fn one_round<S: Strategy + ?Sized>(s: &mut S) -> banditfriday::Result<String> {
///     let product = s.get_recommendation(0.3, 0.7);
///     s.pass_feedback(0.3, 0.7, &product, 1.0)?;
///     Ok(product)
/// }
///
/// let catalogue = Catalogue::new()
///     .with("Beer", ConstantProduct(0.3))?
///     .with("Sushi", ConstantProduct(0.1))?;
/// let mut ts = ThompsonSampling::with_seed(&catalogue, 0)?;
/// let chosen = one_round(&mut ts)?;
/// assert!(catalogue.contains(&chosen));
/// # Ok::<(), banditfriday::Error>(())
/// ```
pub trait Strategy {
    /// Human-readable label used in reports.
    fn name(&self) -> String;

    /// The catalogue this strategy recommends from.
    fn catalogue(&self) -> &Catalogue;

    /// Recommend a product for a customer at `(age, wealth)`.
    ///
    /// Always returns an identifier from [`catalogue`](Self::catalogue).
    fn get_recommendation(&mut self, age: f64, wealth: f64) -> String;

    /// Report the outcome of recommending `product` at `(age, wealth)`.
    ///
    /// `reward` is `1.0` for a purchase and `0.0` otherwise; historical data may
    /// carry other numeric values.  Unknown products fail with
    /// [`Error::InvalidProduct`][crate::Error::InvalidProduct].
    fn pass_feedback(&mut self, age: f64, wealth: f64, product: &str, reward: f64) -> Result<()>;

    /// Seed internal state from a historical batch.
    fn learn_from_history(&mut self, history: &History) -> Result<()>;
}

/// Row-by-row replay of a historical batch through `pass_feedback`.
///
/// Rows are visited in order; within a row, products are visited in catalogue
/// order.  Fields naming products outside the catalogue are skipped, as are
/// catalogue products the row has no field for.
pub fn replay_history<S>(strategy: &mut S, history: &History) -> Result<()>
where
    S: Strategy + ?Sized,
{
    let ids = strategy.catalogue().ids().to_vec();
    let mut events = 0usize;
    for record in history {
        for id in &ids {
            if let Some(value) = record.outcome(id) {
                strategy.pass_feedback(record.age, record.wealth, id, value)?;
                events += 1;
            }
        }
    }
    debug!(
        strategy = %strategy.name(),
        rows = history.len(),
        events,
        "replayed history"
    );
    Ok(())
}

pub(crate) fn label(base: &str, trained: bool) -> String {
    if trained {
        format!("{base}{TRAINED_SUFFIX}")
    } else {
        base.to_string()
    }
}

impl<S: Strategy + ?Sized> Strategy for Box<S> {
    fn name(&self) -> String {
        (**self).name()
    }

    fn catalogue(&self) -> &Catalogue {
        (**self).catalogue()
    }

    fn get_recommendation(&mut self, age: f64, wealth: f64) -> String {
        (**self).get_recommendation(age, wealth)
    }

    fn pass_feedback(&mut self, age: f64, wealth: f64, product: &str, reward: f64) -> Result<()> {
        (**self).pass_feedback(age, wealth, product, reward)
    }

    fn learn_from_history(&mut self, history: &History) -> Result<()> {
        (**self).learn_from_history(history)
    }
}
