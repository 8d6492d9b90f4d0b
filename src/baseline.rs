//! Greedy popularity baseline.
//!
//! Ignores the context and always recommends the most popular product.
//!
//! Popularity has two sources that do not measure the same thing:
//! - live feedback counts *recommendations*: every `pass_feedback` adds one to the
//!   named product, whether or not it was bought;
//! - a historical batch counts *purchases*: each product's popularity is set to the
//!   sum of its outcome column.
//!
//! Both paths are kept as they are so results stay comparable with earlier runs.

use tracing::debug;

use crate::strategy::label;
use crate::utils::argmax_first;
use crate::{Catalogue, Error, History, Result, Strategy};

/// Recommend the product with the highest popularity count.
#[derive(Debug, Clone)]
pub struct BaselineStrategy {
    catalogue: Catalogue,
    popularity: Vec<f64>,
    trained: bool,
}

impl BaselineStrategy {
    pub fn new(catalogue: &Catalogue) -> Result<Self> {
        catalogue.require_non_empty()?;
        debug!(products = catalogue.len(), "constructing BaselineStrategy");
        Ok(Self {
            catalogue: catalogue.clone(),
            popularity: vec![0.0; catalogue.len()],
            trained: false,
        })
    }

    /// Construct, then seed popularity from `history`.
    pub fn with_history(mut self, history: &History) -> Result<Self> {
        self.learn_from_history(history)?;
        Ok(self)
    }

    /// Current popularity of `product`, or `None` if it is not in the catalogue.
    pub fn popularity(&self, product: &str) -> Option<f64> {
        self.catalogue.position(product).map(|i| self.popularity[i])
    }

    /// `(product, popularity)` pairs in catalogue order.
    pub fn popularity_counts(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.catalogue
            .ids()
            .iter()
            .map(String::as_str)
            .zip(self.popularity.iter().copied())
    }

    /// Sum of all popularity counts.
    pub fn total_popularity(&self) -> f64 {
        self.popularity.iter().sum()
    }
}

impl Strategy for BaselineStrategy {
    fn name(&self) -> String {
        label("BaselineStrategy", self.trained)
    }

    fn catalogue(&self) -> &Catalogue {
        &self.catalogue
    }

    fn get_recommendation(&mut self, _age: f64, _wealth: f64) -> String {
        let best = argmax_first(self.popularity.iter().copied());
        self.catalogue.ids()[best].clone()
    }

    fn pass_feedback(&mut self, _age: f64, _wealth: f64, product: &str, _reward: f64) -> Result<()> {
        let i = self
            .catalogue
            .position(product)
            .ok_or_else(|| Error::invalid_product(product))?;
        self.popularity[i] += 1.0;
        Ok(())
    }

    /// Overwrite popularity with each product's outcome-column sum.
    ///
    /// Products without a column in `history` keep their current count.
    fn learn_from_history(&mut self, history: &History) -> Result<()> {
        for (i, id) in self.catalogue.ids().iter().enumerate() {
            if let Some(sum) = history.column_sum(id) {
                self.popularity[i] = sum;
            }
        }
        self.trained = true;
        debug!(rows = history.len(), "seeded BaselineStrategy popularity from history");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ConstantProduct, HistoryRecord};
    use proptest::prelude::{any, prop_assert, prop_assert_eq, proptest};

    fn catalogue() -> Catalogue {
        Catalogue::new()
            .with("A", ConstantProduct(0.5))
            .unwrap()
            .with("B", ConstantProduct(0.5))
            .unwrap()
            .with("C", ConstantProduct(0.5))
            .unwrap()
    }

    #[test]
    fn empty_catalogue_is_rejected() {
        let err = BaselineStrategy::new(&Catalogue::new()).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn ties_go_to_the_first_product() {
        let mut s = BaselineStrategy::new(&catalogue()).unwrap();
        assert_eq!(s.get_recommendation(0.2, 0.8), "A");
        s.pass_feedback(0.0, 0.0, "C", 0.0).unwrap();
        s.pass_feedback(0.0, 0.0, "B", 0.0).unwrap();
        assert_eq!(s.get_recommendation(0.2, 0.8), "B");
    }

    #[test]
    fn live_feedback_counts_recommendations_not_purchases() {
        let mut s = BaselineStrategy::new(&catalogue()).unwrap();
        s.pass_feedback(0.5, 0.5, "B", 0.0).unwrap();
        s.pass_feedback(0.5, 0.5, "B", 0.0).unwrap();
        s.pass_feedback(0.5, 0.5, "A", 1.0).unwrap();
        assert_eq!(s.popularity("B"), Some(2.0));
        assert_eq!(s.popularity("A"), Some(1.0));
        assert_eq!(s.get_recommendation(0.5, 0.5), "B");
    }

    #[test]
    fn unknown_product_feedback_fails_without_side_effects() {
        let mut s = BaselineStrategy::new(&catalogue()).unwrap();
        let err = s.pass_feedback(0.5, 0.5, "Sushi", 1.0).unwrap_err();
        assert_eq!(
            err,
            Error::InvalidProduct {
                product: "Sushi".to_string()
            }
        );
        assert_eq!(s.total_popularity(), 0.0);
    }

    #[test]
    fn history_sets_popularity_to_purchase_sums() {
        let history: History = vec![
            HistoryRecord::new(0.1, 0.1)
                .with_outcome("A", false)
                .with_outcome("B", true),
            HistoryRecord::new(0.9, 0.9)
                .with_outcome("A", false)
                .with_outcome("B", true)
                .with_outcome("Sushi", true),
        ]
        .into_iter()
        .collect();

        let mut s = BaselineStrategy::new(&catalogue()).unwrap();
        // Pre-existing counts are overwritten for columns present in the batch.
        for _ in 0..5 {
            s.pass_feedback(0.0, 0.0, "A", 0.0).unwrap();
            s.pass_feedback(0.0, 0.0, "C", 0.0).unwrap();
        }
        let s = s.with_history(&history).unwrap();
        assert_eq!(s.popularity("A"), Some(0.0));
        assert_eq!(s.popularity("B"), Some(2.0));
        assert_eq!(s.popularity("C"), Some(5.0));
        assert_eq!(s.name(), "BaselineStrategy - with training data");
    }

    proptest! {
        #[test]
        fn popularity_total_tracks_feedback_calls(
            picks in proptest::collection::vec(0usize..3, 0..200),
            rewards in proptest::collection::vec(any::<bool>(), 200),
        ) {
            let c = catalogue();
            let mut s = BaselineStrategy::new(&c).unwrap();
            for (k, (&p, &r)) in picks.iter().zip(&rewards).enumerate() {
                s.pass_feedback(0.5, 0.5, &c.ids()[p], r.into()).unwrap();
                prop_assert_eq!(s.total_popularity(), (k + 1) as f64);

                let chosen = s.get_recommendation(0.5, 0.5);
                let best = s.popularity(&chosen).unwrap();
                for (_, count) in s.popularity_counts() {
                    prop_assert!(best >= count);
                }
            }
        }
    }
}
