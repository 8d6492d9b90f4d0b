//! Online simulation loop.
//!
//! Every round draws a uniform context, asks the strategy for a recommendation,
//! draws whether the recommended product is bought at that exact context, and
//! feeds the outcome straight back:
//!
//! ```text
//!   (age, wealth) ~ U[0,1)^2
//!        │
//!        ▼
//!   strategy.get_recommendation ──► product.is_bought_by ──► strategy.pass_feedback
//! ```
//!
//! Strategies run one after the other, each to completion.  They share the
//! simulator's RNG stream, so two strategies do not see the same contexts.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{info, trace, warn};

use crate::{Catalogue, Error, Result, Strategy};

/// Configuration for a [`Simulator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimulationConfig {
    /// Rounds played per strategy.
    pub rounds: u64,
    /// Seed for context and purchase draws.
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            rounds: 100,
            seed: 0,
        }
    }
}

/// Result of running one strategy.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationReport {
    /// The strategy's [`name`](Strategy::name) when the run started.
    pub label: String,
    /// Rounds requested.
    pub rounds: u64,
    /// Rounds that finished, including feedback.  Equal to `rounds` unless the
    /// run failed.
    pub rounds_completed: u64,
    /// Purchases over the completed rounds.
    pub total_reward: u64,
    /// How often each product was recommended in completed rounds.
    pub recommendations: BTreeMap<String, u64>,
    /// The error that aborted the run, if any.
    pub failure: Option<Error>,
}

impl SimulationReport {
    pub fn succeeded(&self) -> bool {
        self.failure.is_none()
    }

    /// Purchases per completed round (0 when nothing completed).
    pub fn reward_rate(&self) -> f64 {
        if self.rounds_completed == 0 {
            0.0
        } else {
            self.total_reward as f64 / self.rounds_completed as f64
        }
    }
}

impl fmt::Display for SimulationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}. Total reward: {} out of {}",
            self.label, self.total_reward, self.rounds
        )?;
        if let Some(e) = &self.failure {
            write!(f, " (aborted after {} rounds: {e})", self.rounds_completed)?;
        }
        Ok(())
    }
}

/// Drives strategies against a product catalogue.
#[derive(Debug, Clone)]
pub struct Simulator {
    catalogue: Catalogue,
    cfg: SimulationConfig,
    rng: StdRng,
}

impl Simulator {
    pub fn new(catalogue: Catalogue, cfg: SimulationConfig) -> Result<Self> {
        catalogue.require_non_empty()?;
        Ok(Self {
            catalogue,
            rng: StdRng::seed_from_u64(cfg.seed),
            cfg,
        })
    }

    pub fn config(&self) -> SimulationConfig {
        self.cfg
    }

    pub fn catalogue(&self) -> &Catalogue {
        &self.catalogue
    }

    /// Run every strategy in order; a failing strategy does not stop the others.
    pub fn run<S>(&mut self, strategies: &mut [S]) -> Vec<SimulationReport>
    where
        S: Strategy,
    {
        strategies
            .iter_mut()
            .map(|s| self.run_strategy(s))
            .collect()
    }

    /// Play `rounds` rounds with one strategy.
    ///
    /// An error from the strategy, or a recommendation that is not in this
    /// simulator's catalogue, ends the run early.  The failing round does not
    /// count towards the totals.
    pub fn run_strategy<S>(&mut self, strategy: &mut S) -> SimulationReport
    where
        S: Strategy + ?Sized,
    {
        let mut report = SimulationReport {
            label: strategy.name(),
            rounds: self.cfg.rounds,
            rounds_completed: 0,
            total_reward: 0,
            recommendations: BTreeMap::new(),
            failure: None,
        };

        for round in 0..self.cfg.rounds {
            match self.play_round(strategy) {
                Ok((chosen, bought)) => {
                    trace!(round, product = %chosen, bought, "round finished");
                    report.rounds_completed += 1;
                    report.total_reward += u64::from(bought);
                    *report.recommendations.entry(chosen).or_insert(0) += 1;
                }
                Err(e) => {
                    warn!(
                        strategy = %report.label,
                        round,
                        error = %e,
                        "strategy failed; aborting its run"
                    );
                    report.failure = Some(e);
                    break;
                }
            }
        }

        info!(
            strategy = %report.label,
            total_reward = report.total_reward,
            rounds = report.rounds,
            "{report}"
        );
        report
    }

    fn play_round<S>(&mut self, strategy: &mut S) -> Result<(String, bool)>
    where
        S: Strategy + ?Sized,
    {
        let age: f64 = self.rng.random();
        let wealth: f64 = self.rng.random();

        let chosen = strategy.get_recommendation(age, wealth);
        let product = self
            .catalogue
            .get(&chosen)
            .ok_or_else(|| Error::invalid_product(&chosen))?;
        let bought = product.is_bought_by(age, wealth, &mut self.rng);

        let reward = if bought { 1.0 } else { 0.0 };
        strategy.pass_feedback(age, wealth, &chosen, reward)?;
        Ok((chosen, bought))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BaselineStrategy, ConstantProduct, History};

    fn catalogue() -> Catalogue {
        Catalogue::new()
            .with("A", ConstantProduct(1.0))
            .unwrap()
            .with("B", ConstantProduct(0.0))
            .unwrap()
    }

    /// Recommends a product the simulator does not know about.
    struct Rogue(Catalogue);

    impl Strategy for Rogue {
        fn name(&self) -> String {
            "Rogue".to_string()
        }
        fn catalogue(&self) -> &Catalogue {
            &self.0
        }
        fn get_recommendation(&mut self, _age: f64, _wealth: f64) -> String {
            "Caviar".to_string()
        }
        fn pass_feedback(&mut self, _: f64, _: f64, _: &str, _: f64) -> Result<()> {
            Ok(())
        }
        fn learn_from_history(&mut self, _history: &History) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn empty_catalogue_is_rejected() {
        let err = Simulator::new(Catalogue::new(), SimulationConfig::default()).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn simulator_exposes_its_setup() {
        let cfg = SimulationConfig { rounds: 12, seed: 5 };
        let sim = Simulator::new(catalogue(), cfg).unwrap();
        assert_eq!(sim.config(), cfg);
        assert_eq!(sim.catalogue().ids(), ["A".to_string(), "B".to_string()]);
        assert_eq!(SimulationConfig::default(), SimulationConfig { rounds: 100, seed: 0 });
    }

    #[test]
    fn baseline_locks_onto_the_first_product() {
        let c = catalogue();
        let mut sim = Simulator::new(c.clone(), SimulationConfig { rounds: 10, seed: 1 }).unwrap();
        let mut s = BaselineStrategy::new(&c).unwrap();
        let report = sim.run_strategy(&mut s);

        assert!(report.succeeded());
        assert_eq!(report.total_reward, 10);
        assert_eq!(report.rounds_completed, 10);
        assert_eq!(report.recommendations.get("A"), Some(&10));
        assert_eq!(report.reward_rate(), 1.0);
        assert_eq!(s.get_recommendation(0.5, 0.5), "A");
        assert_eq!(report.to_string(), "BaselineStrategy. Total reward: 10 out of 10");
    }

    #[test]
    fn failing_strategy_does_not_affect_the_next_one() {
        let c = catalogue();
        let mut sim = Simulator::new(c.clone(), SimulationConfig { rounds: 5, seed: 0 }).unwrap();
        let mut strategies: Vec<Box<dyn Strategy>> = vec![
            Box::new(Rogue(c.clone())),
            Box::new(BaselineStrategy::new(&c).unwrap()),
        ];
        let reports = sim.run(&mut strategies);

        assert_eq!(reports.len(), 2);
        assert_eq!(
            reports[0].failure,
            Some(Error::InvalidProduct {
                product: "Caviar".to_string()
            })
        );
        assert_eq!(reports[0].rounds_completed, 0);
        assert_eq!(reports[0].reward_rate(), 0.0);
        assert!(reports[0].to_string().contains("aborted after 0 rounds"));

        assert!(reports[1].succeeded());
        assert_eq!(reports[1].total_reward, 5);
    }

    #[test]
    fn feedback_errors_abort_the_run() {
        // The simulator knows "B" but the strategy's own catalogue does not.
        let narrow = Catalogue::new().with("A", ConstantProduct(1.0)).unwrap();
        let mut sim = Simulator::new(catalogue(), SimulationConfig { rounds: 3, seed: 0 }).unwrap();

        struct Liar(BaselineStrategy);
        impl Strategy for Liar {
            fn name(&self) -> String {
                "Liar".to_string()
            }
            fn catalogue(&self) -> &Catalogue {
                self.0.catalogue()
            }
            fn get_recommendation(&mut self, _: f64, _: f64) -> String {
                "B".to_string()
            }
            fn pass_feedback(&mut self, a: f64, w: f64, p: &str, r: f64) -> Result<()> {
                self.0.pass_feedback(a, w, p, r)
            }
            fn learn_from_history(&mut self, h: &History) -> Result<()> {
                self.0.learn_from_history(h)
            }
        }

        let mut liar = Liar(BaselineStrategy::new(&narrow).unwrap());
        let report = sim.run_strategy(&mut liar);
        assert_eq!(report.rounds_completed, 0);
        assert!(matches!(report.failure, Some(Error::InvalidProduct { .. })));
    }

    #[test]
    fn same_seed_same_reports() {
        let c = Catalogue::new()
            .with("A", ConstantProduct(0.3))
            .unwrap()
            .with("B", ConstantProduct(0.6))
            .unwrap();
        let cfg = SimulationConfig { rounds: 200, seed: 9 };
        let run = || {
            let mut sim = Simulator::new(c.clone(), cfg).unwrap();
            let mut s = crate::ThompsonSampling::with_seed(&c, 4).unwrap();
            sim.run_strategy(&mut s)
        };
        assert_eq!(run(), run());
    }
}
