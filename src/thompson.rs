//! Thompson sampling over purchase rates.
//!
//! Each product keeps a trial count and a success count.  A recommendation draws
//! one sample per product from `Beta(successes + 1, failures + 1)` and picks the
//! largest, so under-sampled products still get explored.
//!
//! Notes:
//! - This policy is **seedable** so recommendations can be reproduced in tests.
//! - Default construction uses a fixed seed (deterministic by default).
//! - The context is ignored; wrap it in a [`BinnedStrategy`][crate::BinnedStrategy]
//!   to learn per region of the context space.

use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Beta, Distribution};
use tracing::debug;

use crate::strategy::{label, replay_history};
use crate::utils::{argmax_first, is_truthy};
use crate::{Catalogue, Error, History, Result, Strategy};

/// Trial/success counts for one product.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ArmStats {
    pub trials: u64,
    pub successes: u64,
}

impl ArmStats {
    pub fn failures(&self) -> u64 {
        self.trials.saturating_sub(self.successes)
    }

    /// Posterior shape parameters `(alpha, beta)` under a uniform prior.
    pub fn beta_params(&self) -> (f64, f64) {
        (self.successes as f64 + 1.0, self.failures() as f64 + 1.0)
    }

    /// Posterior mean purchase rate.
    pub fn expected_value(&self) -> f64 {
        let (a, b) = self.beta_params();
        a / (a + b)
    }
}

/// Seedable Thompson-sampling recommender.
#[derive(Debug, Clone)]
pub struct ThompsonSampling {
    catalogue: Catalogue,
    stats: Vec<ArmStats>,
    rng: StdRng,
    trained: bool,
}

impl ThompsonSampling {
    /// Create a recommender with a deterministic fixed seed (0).
    pub fn new(catalogue: &Catalogue) -> Result<Self> {
        Self::with_seed(catalogue, 0)
    }

    /// Create a recommender with a fixed seed (reproducible).
    pub fn with_seed(catalogue: &Catalogue, seed: u64) -> Result<Self> {
        catalogue.require_non_empty()?;
        debug!(products = catalogue.len(), seed, "constructing ThompsonSampling");
        Ok(Self {
            catalogue: catalogue.clone(),
            stats: vec![ArmStats::default(); catalogue.len()],
            rng: StdRng::seed_from_u64(seed),
            trained: false,
        })
    }

    /// Construct, then replay `history` through `pass_feedback`.
    pub fn with_history(mut self, history: &History) -> Result<Self> {
        self.learn_from_history(history)?;
        Ok(self)
    }

    pub fn stats(&self, product: &str) -> Option<ArmStats> {
        self.catalogue.position(product).map(|i| self.stats[i])
    }

    /// `(product, stats)` pairs in catalogue order.
    pub fn arm_stats(&self) -> impl Iterator<Item = (&str, ArmStats)> + '_ {
        self.catalogue
            .ids()
            .iter()
            .map(String::as_str)
            .zip(self.stats.iter().copied())
    }

    /// Forget everything learned; the RNG stream continues.
    pub fn reset(&mut self) {
        self.stats.fill(ArmStats::default());
        self.trained = false;
    }

    fn sample_beta(&mut self, alpha: f64, beta: f64) -> f64 {
        if !(alpha.is_finite() && beta.is_finite()) || alpha <= 0.0 || beta <= 0.0 {
            return 0.5;
        }
        match Beta::new(alpha, beta) {
            Ok(dist) => dist.sample(&mut self.rng),
            Err(_) => 0.5,
        }
    }
}

impl Strategy for ThompsonSampling {
    fn name(&self) -> String {
        label("ThompsonSampling", self.trained)
    }

    fn catalogue(&self) -> &Catalogue {
        &self.catalogue
    }

    /// Sample every posterior once and return the argmax (ties: catalogue order).
    fn get_recommendation(&mut self, _age: f64, _wealth: f64) -> String {
        let mut draws = Vec::with_capacity(self.stats.len());
        for i in 0..self.stats.len() {
            let (a, b) = self.stats[i].beta_params();
            draws.push(self.sample_beta(a, b));
        }
        let best = argmax_first(draws);
        self.catalogue.ids()[best].clone()
    }

    fn pass_feedback(&mut self, _age: f64, _wealth: f64, product: &str, reward: f64) -> Result<()> {
        let i = self
            .catalogue
            .position(product)
            .ok_or_else(|| Error::invalid_product(product))?;
        let s = &mut self.stats[i];
        s.trials = s.trials.saturating_add(1);
        if is_truthy(reward) {
            s.successes = s.successes.saturating_add(1);
        }
        Ok(())
    }

    fn learn_from_history(&mut self, history: &History) -> Result<()> {
        replay_history(self, history)?;
        self.trained = true;
        Ok(())
    }
}
