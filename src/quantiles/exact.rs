//! Exact percentile over a window snapshot
//!
//! Copies the window into a scratch buffer, sorts it and linearly
//! interpolates between the two order statistics around the requested rank.
//! Exact, but O(n log n) per query and O(n) memory; see
//! [`FastPercentile`](super::FastPercentile) for the constant-memory estimate.

use parking_lot::Mutex;
use tracing::debug;

use crate::error::{check_percentile, Result};
use crate::traits::Iterate;

/// Exact percentile reducer
///
/// The percentile is given on the 0..=100 scale, so `99.9` asks for the
/// 99.9th percentile. With `count` values sorted ascending the zero-based rank
/// is
///
/// ```text
/// rank = count × p / 100 − 1        clamped to [0, count − 1]
/// ```
///
/// and the result interpolates linearly between `floor(rank)` and the next
/// index, itself clamped to the last one. When the data cannot resolve the
/// requested precision (p99.9 of 100 values) the interpolation runs between
/// the maximum and itself and degrades gracefully to the maximum.
///
/// The scratch buffer is reused across calls and guarded by its own lock, so
/// a reducer can be shared between threads; concurrent queries serialize.
///
/// # Example
///
/// ```
/// use rollstats::quantiles::Percentile;
///
/// let values: Vec<f64> = (1..=100).map(f64::from).collect();
/// let p50 = Percentile::new(50.0).unwrap();
/// assert_eq!(p50.reduce(&values), 50.0);
/// ```
#[derive(Debug)]
pub struct Percentile {
    percentile: f64,
    scratch: Mutex<Vec<f64>>,
}

impl Percentile {
    /// Create a reducer for `percentile` in `[0, 100]`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::PercentileOutOfRange`](crate::error::ConfigError::PercentileOutOfRange)
    /// for a percentile outside `[0, 100]`.
    pub fn new(percentile: f64) -> Result<Self> {
        Self::with_prealloc(percentile, 0)
    }

    /// Like [`Percentile::new`], pre-sizing the scratch buffer for `prealloc` values
    pub fn with_prealloc(percentile: f64, prealloc: usize) -> Result<Self> {
        let percentile = check_percentile(percentile)?;
        debug!(percentile, prealloc, "created percentile reducer");
        Ok(Self {
            percentile,
            scratch: Mutex::new(Vec::with_capacity(prealloc)),
        })
    }

    /// The percentile this reducer computes
    pub fn percentile(&self) -> f64 {
        self.percentile
    }

    /// Compute the percentile of everything `it` currently holds
    ///
    /// Returns `0.0` for an empty window and the only value for a window of one.
    pub fn reduce<I: Iterate + ?Sized>(&self, it: &I) -> f64 {
        let mut scratch = self.scratch.lock();
        scratch.clear();
        it.iterate(&mut |v| scratch.push(v));
        interpolate(&mut scratch, self.percentile)
    }
}

fn interpolate(values: &mut [f64], percentile: f64) -> f64 {
    match values.len() {
        0 => 0.0,
        1 => values[0],
        len => {
            values.sort_unstable_by(f64::total_cmp);
            let last = len - 1;
            let rank = (percentile / 100.0 * len as f64 - 1.0).clamp(0.0, last as f64);
            let k = rank.floor() as usize;
            let fraction = rank - k as f64;
            let next = (k + 1).min(last);
            (1.0 - fraction) * values[k] + fraction * values[next]
        }
    }
}
