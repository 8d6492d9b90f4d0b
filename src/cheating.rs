//! Oracle benchmark with access to the true probability surfaces.
//!
//! At construction every product's surface is sampled on a
//! `GRID_RESOLUTION x GRID_RESOLUTION` grid and the best product per cell is
//! stored.  After that the table is read-only: feedback is ignored.  Its total
//! reward is an upper bound for the learning strategies.
//!
//! Grid layout matches [`Product::probability_grid`][crate::Product::probability_grid]:
//! row = wealth, column = age.

use tracing::debug;

use crate::strategy::{label, replay_history};
use crate::utils::{argmax_first, bin_index};
use crate::{Catalogue, Error, History, Result, Strategy, GRID_RESOLUTION};

/// Recommend the product with the highest true probability at the context.
#[derive(Debug, Clone)]
pub struct CheatingStrategy {
    catalogue: Catalogue,
    /// `best[wealth_idx * GRID_RESOLUTION + age_idx]` = catalogue position.
    best: Vec<usize>,
    trained: bool,
}

impl CheatingStrategy {
    pub fn new(catalogue: &Catalogue) -> Result<Self> {
        catalogue.require_non_empty()?;
        let grids: Vec<Vec<Vec<f64>>> = catalogue
            .iter()
            .map(|(_, p)| p.probability_grid(GRID_RESOLUTION))
            .collect();

        let mut best = Vec::with_capacity(GRID_RESOLUTION * GRID_RESOLUTION);
        for w in 0..GRID_RESOLUTION {
            for a in 0..GRID_RESOLUTION {
                best.push(argmax_first(grids.iter().map(|g| g[w][a])));
            }
        }
        debug!(
            products = catalogue.len(),
            cells = best.len(),
            "built CheatingStrategy lookup table"
        );
        Ok(Self {
            catalogue: catalogue.clone(),
            best,
            trained: false,
        })
    }

    /// Replay `history` (a no-op for the table) and mark the strategy trained.
    pub fn with_history(mut self, history: &History) -> Result<Self> {
        self.learn_from_history(history)?;
        Ok(self)
    }

    /// Catalogue position of the best product at a grid cell, if the cell exists.
    pub fn best_index(&self, wealth_idx: usize, age_idx: usize) -> Option<usize> {
        if wealth_idx >= GRID_RESOLUTION || age_idx >= GRID_RESOLUTION {
            return None;
        }
        Some(self.best[wealth_idx * GRID_RESOLUTION + age_idx])
    }
}

impl Strategy for CheatingStrategy {
    fn name(&self) -> String {
        label("CheatingStrategy", self.trained)
    }

    fn catalogue(&self) -> &Catalogue {
        &self.catalogue
    }

    fn get_recommendation(&mut self, age: f64, wealth: f64) -> String {
        let w = bin_index(wealth, GRID_RESOLUTION);
        let a = bin_index(age, GRID_RESOLUTION);
        let i = self.best[w * GRID_RESOLUTION + a];
        self.catalogue.ids()[i].clone()
    }

    /// Fixed oracle: only checks that `product` exists.
    fn pass_feedback(&mut self, _age: f64, _wealth: f64, product: &str, _reward: f64) -> Result<()> {
        if !self.catalogue.contains(product) {
            return Err(Error::invalid_product(product));
        }
        Ok(())
    }

    fn learn_from_history(&mut self, history: &History) -> Result<()> {
        replay_history(self, history)?;
        self.trained = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ConstantProduct, SurfaceProduct};

    /// "Rich" depends on wealth only; "Staple" is flat.  Asymmetric on purpose.
    fn catalogue() -> Catalogue {
        Catalogue::new()
            .with("Staple", ConstantProduct(0.5))
            .unwrap()
            .with("Rich", SurfaceProduct::new(|_, wealth| wealth))
            .unwrap()
    }

    #[test]
    fn picks_the_true_best_product() {
        let mut s = CheatingStrategy::new(&catalogue()).unwrap();
        assert_eq!(s.get_recommendation(0.1, 0.2), "Staple");
        assert_eq!(s.get_recommendation(0.8, 0.9), "Rich");
    }

    #[test]
    fn axes_are_not_transposed() {
        let mut s = CheatingStrategy::new(&catalogue()).unwrap();
        assert_eq!(s.get_recommendation(0.9, 0.1), "Staple");
        assert_eq!(s.get_recommendation(0.1, 0.9), "Rich");

        // Row = wealth, column = age.  Grid wealth 50/99 > 0.5 is the first Rich row.
        assert_eq!(s.best_index(99, 0), Some(1));
        assert_eq!(s.best_index(0, 99), Some(0));
        assert_eq!(s.best_index(49, 99), Some(0));
        assert_eq!(s.best_index(50, 0), Some(1));
        assert_eq!(s.best_index(100, 0), None);
    }

    #[test]
    fn ties_go_to_catalogue_order() {
        let c = Catalogue::new()
            .with("first", ConstantProduct(0.4))
            .unwrap()
            .with("second", ConstantProduct(0.4))
            .unwrap();
        let mut s = CheatingStrategy::new(&c).unwrap();
        assert_eq!(s.get_recommendation(0.5, 0.5), "first");
    }

    #[test]
    fn boundary_and_out_of_range_contexts_saturate() {
        let mut s = CheatingStrategy::new(&catalogue()).unwrap();
        assert_eq!(s.get_recommendation(1.0, 1.0), "Rich");
        assert_eq!(s.get_recommendation(0.0, 0.0), "Staple");
        assert_eq!(s.get_recommendation(0.0, 1.0), "Rich");
        assert_eq!(s.get_recommendation(1.0, 0.0), "Staple");
        assert_eq!(s.get_recommendation(7.0, 3.0), "Rich");
        assert_eq!(s.get_recommendation(-1.0, -1.0), "Staple");
        assert_eq!(s.get_recommendation(f64::NAN, f64::NAN), "Staple");
    }

    #[test]
    fn feedback_never_changes_recommendations() {
        let mut s = CheatingStrategy::new(&catalogue()).unwrap();
        let contexts = [(0.1, 0.1), (0.5, 0.5), (0.9, 0.3), (0.3, 0.9)];
        let before: Vec<String> = contexts
            .iter()
            .map(|&(a, w)| s.get_recommendation(a, w))
            .collect();
        for &(a, w) in &contexts {
            for _ in 0..10 {
                s.pass_feedback(a, w, "Staple", 1.0).unwrap();
                s.pass_feedback(a, w, "Rich", 0.0).unwrap();
            }
        }
        let after: Vec<String> = contexts
            .iter()
            .map(|&(a, w)| s.get_recommendation(a, w))
            .collect();
        assert_eq!(before, after);
        assert!(s.pass_feedback(0.5, 0.5, "Beer", 1.0).is_err());
    }
}
