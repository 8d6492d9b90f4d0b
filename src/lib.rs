//! `banditfriday`: contextual recommendation strategies and a purchase simulator.
//!
//! The setting is a multi-armed bandit with context.  Products (the arms) have a
//! hidden purchase probability that depends on a customer's `(age, wealth)`,
//! both normalised to `[0, 1]`.  A strategy sees the context, recommends one
//! product, and learns from whether it was bought.
//!
//! **Strategies** (all implement [`Strategy`]):
//! - [`BaselineStrategy`]: context-free popularity count.  Live feedback counts
//!   recommendations; a historical batch seeds purchase sums.
//! - [`ThompsonSampling`]: seedable Beta-Bernoulli Thompson sampling per product.
//! - [`CheatingStrategy`]: oracle that reads the true probability surfaces once
//!   and always recommends the best product.  An upper bound, not a learner.
//! - [`BinnedStrategy`]: cuts the context square into `n x n` cells and runs an
//!   independent inner strategy in each.  Composes with any strategy, itself
//!   included.
//!
//! **Driving them:**
//! - [`Simulator`]: draws contexts, asks for a recommendation, draws the purchase
//!   from the recommended [`Product`], feeds the outcome back, and reports a
//!   [`SimulationReport`] per strategy.
//! - [`History`] / [`replay_history`]: bootstrap strategies from past outcomes;
//!   [`generate_history`] draws a synthetic batch from a catalogue.
//!
//! **Goals:**
//! - **Reproducible**: every random source is seedable; the defaults use fixed seeds.
//! - **Owned state**: a strategy's counts are only touched by its own calls, and
//!   binned cells share nothing.
//! - **Saturating contexts**: out-of-range contexts clamp to the nearest grid
//!   cell instead of failing.
//!
//! **Non-goals:**
//! - Plotting probability surfaces, CSV/file I/O, persisting normalisation constants.
//! - A particular set of product curves: products are any [`Product`] implementation.
//!
//! # Grid convention
//!
//! Wherever a context is discretised (the oracle's `100 x 100` table, the binned
//! grid), rows are **wealth** and columns are **age**:
//!
//! ```text
//!   grid[bin(wealth)][bin(age)],   bin(x) = min(n - 1, floor(x * n))
//! ```
//!
//! # Example
//!
//! ```rust
//! use banditfriday::{
//!     BaselineStrategy, BinnedStrategy, Catalogue, CheatingStrategy, ConstantProduct,
//!     SimulationConfig, Simulator, Strategy, SurfaceProduct, ThompsonSampling,
//! };
//!
//! let catalogue = Catalogue::new()
//!     .with("Beer", SurfaceProduct::new(|age, wealth| {
//!         if age < 0.2 { 0.0 } else { 0.3 - age * 0.1 + (1.0 - wealth) * 0.2 }
//!     }))?
//!     .with("Potatoes", SurfaceProduct::new(|age, wealth| (age - wealth * wealth).max(0.0)))?
//!     .with("ToiletPaper", ConstantProduct(0.05))?;
//!
//! let mut strategies: Vec<Box<dyn Strategy>> = vec![
//!     Box::new(BaselineStrategy::new(&catalogue)?),
//!     Box::new(ThompsonSampling::with_seed(&catalogue, 1)?),
//!     Box::new(BinnedStrategy::new(&catalogue, 2, ThompsonSampling::new)?),
//!     Box::new(CheatingStrategy::new(&catalogue)?),
//! ];
//!
//! let mut sim = Simulator::new(catalogue, SimulationConfig { rounds: 500, seed: 7 })?;
//! for report in sim.run(&mut strategies) {
//!     assert!(report.succeeded());
//!     println!("{report}");
//! }
//! # Ok::<(), banditfriday::Error>(())
//! ```

#![forbid(unsafe_code)]

/// Resolution per axis of the oracle's lookup table and of
/// [`Product::probability_grid`] sampling used for normalisation.
pub const GRID_RESOLUTION: usize = 100;

mod error;
pub use error::*;

mod utils;
pub use utils::bin_index;

mod product;
pub use product::*;

mod history;
pub use history::*;

mod strategy;
pub use strategy::*;

mod baseline;
pub use baseline::*;

mod thompson;
pub use thompson::*;

mod cheating;
pub use cheating::*;

mod binned;
pub use binned::*;

mod simulation;
pub use simulation::*;
