//! Context binning: one independent inner strategy per grid cell.
//!
//! The unit square of contexts is cut into `n_bins x n_bins` equal cells.  Every
//! cell owns a freshly constructed inner strategy; a call at `(age, wealth)` is
//! routed to exactly one of them and no state is shared between cells.
//!
//! ```text
//!            age bin ->
//!   wealth   +--------+--------+
//!   bin      | (0, 0) | (0, 1) |
//!    |       +--------+--------+
//!    v       | (1, 0) | (1, 1) |
//!            +--------+--------+
//! ```
//!
//! Rows are wealth bins and columns are age bins, the same layout as the
//! oracle's lookup table.  Inner strategies can be anything implementing
//! [`Strategy`], including another `BinnedStrategy` or a `Box<dyn Strategy>`.

use std::collections::BTreeMap;
use tracing::debug;

use crate::strategy::TRAINED_SUFFIX;
use crate::utils::bin_index;
use crate::{Catalogue, Error, History, HistoryRecord, Result, Strategy};

/// Bins per axis used by [`BinnedStrategy::with_default_bins`].
pub const DEFAULT_BINS: usize = 2;

/// Composite strategy that partitions the context space.
#[derive(Debug, Clone)]
pub struct BinnedStrategy<S> {
    catalogue: Catalogue,
    n_bins: usize,
    /// Row-major: `cells[wealth_bin * n_bins + age_bin]`.
    cells: Vec<S>,
    inner_name: String,
    trained: bool,
}

impl<S: Strategy> BinnedStrategy<S> {
    /// Build an `n_bins x n_bins` grid, calling `factory` once per cell in
    /// row-major order.
    ///
    /// ```rust
    /// use banditfriday::{BinnedStrategy, Catalogue, ConstantProduct, Strategy, ThompsonSampling};
    ///
    /// let catalogue = Catalogue::new()
    ///     .with("Beer", ConstantProduct(0.3))?
    ///     .with("Sushi", ConstantProduct(0.1))?;
    ///
    /// let mut seed = 0;
    /// let binned = BinnedStrategy::new(&catalogue, 3, |c| {
    ///     seed += 1;
    ///     ThompsonSampling::with_seed(c, seed)
    /// })?;
    /// assert_eq!(binned.name(), "ThompsonSampling - Binned");
    /// # Ok::<(), banditfriday::Error>(())
    /// ```
    pub fn new<F>(catalogue: &Catalogue, n_bins: usize, mut factory: F) -> Result<Self>
    where
        F: FnMut(&Catalogue) -> Result<S>,
    {
        catalogue.require_non_empty()?;
        if n_bins == 0 {
            return Err(Error::Configuration(
                "binned strategy needs at least one bin per axis".to_string(),
            ));
        }
        let n_cells = n_bins.checked_mul(n_bins).ok_or_else(|| {
            Error::Configuration(format!("{n_bins} bins per axis overflow the cell grid"))
        })?;
        let cells = (0..n_cells)
            .map(|_| factory(catalogue))
            .collect::<Result<Vec<S>>>()?;
        let inner_name = cells[0].name();
        debug!(
            inner = %inner_name,
            n_bins,
            cells = cells.len(),
            "constructing BinnedStrategy"
        );
        Ok(Self {
            catalogue: catalogue.clone(),
            n_bins,
            cells,
            inner_name,
            trained: false,
        })
    }

    /// [`new`](Self::new) with [`DEFAULT_BINS`] bins per axis.
    pub fn with_default_bins<F>(catalogue: &Catalogue, factory: F) -> Result<Self>
    where
        F: FnMut(&Catalogue) -> Result<S>,
    {
        Self::new(catalogue, DEFAULT_BINS, factory)
    }

    /// Construct, then route `history` to the cells it falls in.
    pub fn with_history(mut self, history: &History) -> Result<Self> {
        self.learn_from_history(history)?;
        Ok(self)
    }

    pub fn n_bins(&self) -> usize {
        self.n_bins
    }

    /// The inner strategy at `(wealth_bin, age_bin)`.
    pub fn cell(&self, row: usize, col: usize) -> Option<&S> {
        if row >= self.n_bins || col >= self.n_bins {
            return None;
        }
        self.cells.get(row * self.n_bins + col)
    }

    /// The inner strategy serving contexts at `(age, wealth)`.
    pub fn cell_for(&self, age: f64, wealth: f64) -> &S {
        &self.cells[self.cell_index(age, wealth)]
    }

    /// `(wealth_bin, age_bin)` for a context.
    pub fn coordinates(&self, age: f64, wealth: f64) -> (usize, usize) {
        (bin_index(wealth, self.n_bins), bin_index(age, self.n_bins))
    }

    fn cell_index(&self, age: f64, wealth: f64) -> usize {
        let (row, col) = self.coordinates(age, wealth);
        row * self.n_bins + col
    }
}

impl<S: Strategy> Strategy for BinnedStrategy<S> {
    fn name(&self) -> String {
        let mut name = format!("{} - Binned", self.inner_name);
        if self.trained {
            name.push_str(TRAINED_SUFFIX);
        }
        name
    }

    fn catalogue(&self) -> &Catalogue {
        &self.catalogue
    }

    fn get_recommendation(&mut self, age: f64, wealth: f64) -> String {
        let i = self.cell_index(age, wealth);
        self.cells[i].get_recommendation(age, wealth)
    }

    fn pass_feedback(&mut self, age: f64, wealth: f64, product: &str, reward: f64) -> Result<()> {
        let i = self.cell_index(age, wealth);
        self.cells[i].pass_feedback(age, wealth, product, reward)
    }

    /// Split `history` by cell and let each cell learn from its own rows.
    ///
    /// Row order inside a cell is preserved.  Cells are visited in row-major
    /// order; cells without rows are not touched.
    fn learn_from_history(&mut self, history: &History) -> Result<()> {
        let mut groups: BTreeMap<usize, Vec<HistoryRecord>> = BTreeMap::new();
        for record in history {
            groups
                .entry(self.cell_index(record.age, record.wealth))
                .or_default()
                .push(record.clone());
        }
        debug!(
            strategy = %self.name(),
            rows = history.len(),
            groups = groups.len(),
            "partitioned history across bins"
        );
        for (i, records) in groups {
            self.cells[i].learn_from_history(&History { records })?;
        }
        self.trained = true;
        Ok(())
    }
}
