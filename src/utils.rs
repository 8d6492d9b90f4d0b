//! Small numeric helpers shared by the strategies.

/// Map a coordinate in `[0, 1]` to one of `n_bins` equal-width bins.
///
/// `bin = min(n_bins - 1, floor(x * n_bins))`, so `x = 1.0` lands in the last
/// bin.  Out-of-range input saturates: negatives and NaN map to bin 0, values
/// above 1 to the last bin.  `n_bins == 0` is treated as a single bin.
///
/// ```rust
/// use banditfriday::bin_index;
///
/// assert_eq!(bin_index(0.49, 2), 0);
/// assert_eq!(bin_index(0.5, 2), 1);
/// assert_eq!(bin_index(1.0, 2), 1);
/// assert_eq!(bin_index(1.0, 100), 99);
/// assert_eq!(bin_index(-3.0, 4), 0);
/// ```
#[must_use]
pub fn bin_index(x: f64, n_bins: usize) -> usize {
    let n = n_bins.max(1);
    // Float-to-int `as` truncates and saturates (NaN -> 0).
    ((x * n as f64) as usize).min(n - 1)
}

/// Index of the first maximum.
///
/// Later values must be strictly greater to win, so ties keep the earliest
/// index.  NaN never wins; an empty or all-NaN input yields 0.
pub(crate) fn argmax_first<I>(values: I) -> usize
where
    I: IntoIterator<Item = f64>,
{
    let mut best = 0;
    let mut best_value = f64::NEG_INFINITY;
    for (i, v) in values.into_iter().enumerate() {
        if v > best_value {
            best = i;
            best_value = v;
        }
    }
    best
}

/// Rewards are numeric; anything non-zero counts as a purchase.
#[inline]
pub(crate) fn is_truthy(reward: f64) -> bool {
    reward != 0.0
}
