//! Products (the arms) and the ordered catalogue strategies recommend from.
//!
//! A [`Product`] only has to answer "how likely is a customer at this context to
//! buy me?".  Strategies never look inside the probability model; the oracle
//! ([`CheatingStrategy`][crate::CheatingStrategy]) is the single exception and
//! reads it once, through [`Product::probability_grid`], at construction time.
//!
//! Contexts are `(age, wealth)` pairs normalised to `[0, 1]`.

use rand::{Rng, RngCore};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::{Error, Result};

/// A recommendable product with a hidden purchase-probability surface.
pub trait Product: Send + Sync {
    /// Purchase probability for a customer at `(age, wealth)`.
    ///
    /// Values at or above `1.0` are treated as certainty, values at or below
    /// `0.0` (and NaN) as "never bought".
    fn probability(&self, age: f64, wealth: f64) -> f64;

    /// One Bernoulli draw with [`probability`](Self::probability).
    ///
    /// Always consumes exactly one uniform draw from `rng`, whatever the
    /// probability, so streams stay aligned across products.
    fn is_bought_by(&self, age: f64, wealth: f64, rng: &mut dyn RngCore) -> bool {
        let p = self.probability(age, wealth);
        rng.random::<f64>() < p
    }

    /// The probability surface sampled on an evenly spaced `resolution x resolution`
    /// grid over `[0, 1]^2`.
    ///
    /// Rows are wealth, columns are age: `grid[w][a] = probability(age_a, wealth_w)`.
    fn probability_grid(&self, resolution: usize) -> Vec<Vec<f64>> {
        let axis = linspace(resolution);
        axis.iter()
            .map(|&wealth| axis.iter().map(|&age| self.probability(age, wealth)).collect())
            .collect()
    }
}

/// `resolution` evenly spaced points from 0 to 1 inclusive.
pub(crate) fn linspace(resolution: usize) -> Vec<f64> {
    match resolution {
        0 => Vec::new(),
        1 => vec![0.0],
        n => {
            let step = 1.0 / (n - 1) as f64;
            (0..n).map(|i| (i as f64 * step).min(1.0)).collect()
        }
    }
}

/// A product bought with the same probability everywhere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantProduct(pub f64);

impl Product for ConstantProduct {
    fn probability(&self, _age: f64, _wealth: f64) -> f64 {
        self.0
    }
}

type Surface = dyn Fn(f64, f64) -> f64 + Send + Sync;

/// A product whose probability is an arbitrary function of `(age, wealth)`.
///
/// An optional normalisation factor scales the raw surface; scaled values are
/// capped at `1.0`.
pub struct SurfaceProduct {
    surface: Box<Surface>,
    normalization: Option<f64>,
}

impl SurfaceProduct {
    pub fn new<F>(surface: F) -> Self
    where
        F: Fn(f64, f64) -> f64 + Send + Sync + 'static,
    {
        Self {
            surface: Box::new(surface),
            normalization: None,
        }
    }

    /// Scale the raw surface by `factor` (result capped at `1.0`).
    pub fn with_normalization(mut self, factor: f64) -> Self {
        self.normalization = Some(factor);
        self
    }

    /// Pick the normalisation factor that makes the mean probability over the
    /// default grid equal to `target_mean`.
    ///
    /// Leaves the product unnormalised if the raw surface averages to zero (or
    /// is not finite).
    pub fn normalized_to_mean(mut self, target_mean: f64) -> Self {
        self.normalization = None;
        let grid = self.probability_grid(crate::GRID_RESOLUTION);
        let n = grid.iter().map(Vec::len).sum::<usize>().max(1);
        let mean = grid.iter().flatten().sum::<f64>() / n as f64;
        if mean.is_finite() && mean > 0.0 {
            self.normalization = Some(target_mean / mean);
        }
        self
    }

    pub fn normalization(&self) -> Option<f64> {
        self.normalization
    }
}

impl Product for SurfaceProduct {
    fn probability(&self, age: f64, wealth: f64) -> f64 {
        let raw = (self.surface)(age, wealth);
        match self.normalization {
            Some(factor) => (raw * factor).min(1.0),
            None => raw,
        }
    }
}

impl fmt::Debug for SurfaceProduct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SurfaceProduct")
            .field("normalization", &self.normalization)
            .finish_non_exhaustive()
    }
}

/// Ordered mapping from product identifier to [`Product`].
///
/// Iteration order is insertion order.  Tie-breaks in every strategy and the
/// oracle's lookup table depend on it, so a catalogue is never reordered after
/// construction.  Cloning is cheap: products are shared behind `Arc`.
#[derive(Clone, Default)]
pub struct Catalogue {
    ids: Vec<String>,
    products: Vec<Arc<dyn Product>>,
    index: BTreeMap<String, usize>,
}

impl Catalogue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalogue from `(id, product)` pairs, keeping their order.
    pub fn from_products<I, S>(products: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, Arc<dyn Product>)>,
        S: Into<String>,
    {
        let mut out = Self::new();
        for (id, product) in products {
            out.insert_shared(id, product)?;
        }
        Ok(out)
    }

    /// Append a product.  Identifiers must be unique.
    pub fn insert<P>(&mut self, id: impl Into<String>, product: P) -> Result<()>
    where
        P: Product + 'static,
    {
        self.insert_shared(id, Arc::new(product))
    }

    pub fn insert_shared(&mut self, id: impl Into<String>, product: Arc<dyn Product>) -> Result<()> {
        let id = id.into();
        if self.index.contains_key(&id) {
            return Err(Error::Configuration(format!("duplicate product `{id}`")));
        }
        self.index.insert(id.clone(), self.ids.len());
        self.ids.push(id);
        self.products.push(product);
        Ok(())
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with<P>(mut self, id: impl Into<String>, product: P) -> Result<Self>
    where
        P: Product + 'static,
    {
        self.insert(id, product)?;
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Identifiers in catalogue order.
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&dyn Product> {
        self.position(id).map(|i| self.products[i].as_ref())
    }

    pub fn id_at(&self, index: usize) -> Option<&str> {
        self.ids.get(index).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &dyn Product)> + '_ {
        self.ids
            .iter()
            .zip(&self.products)
            .map(|(id, p)| (id.as_str(), p.as_ref()))
    }

    /// Fail with a configuration error when there is nothing to recommend.
    pub(crate) fn require_non_empty(&self) -> Result<()> {
        if self.is_empty() {
            return Err(Error::Configuration(
                "catalogue must contain at least one product".to_string(),
            ));
        }
        Ok(())
    }
}

impl fmt::Debug for Catalogue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Catalogue").field("ids", &self.ids).finish()
    }
}
