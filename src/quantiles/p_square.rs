//! P² streaming percentile estimator
//!
//! Jain & Chlamtac's P² algorithm estimates a single percentile of an
//! unbounded stream with five markers and no stored observations.
//!
//! # Algorithm
//!
//! Markers `0` and `4` track the minimum and maximum, marker `2` tracks the
//! target percentile `p`, and markers `1` and `3` sit halfway between. Each
//! marker has a height `q` (the estimate), an actual rank `n`, and a desired
//! rank `n'` that advances by `dn'` per observation.
//!
//! 1. The first five observations are kept raw. On the fifth they are
//!    sorted into the heights, with ranks `0..=4` and desired ranks
//!    `[0, 2p, 4p, 2 + 2p, 4]`.
//! 2. Every later observation is placed into one of the four cells between
//!    markers (stretching the outer markers if it falls outside), shifting the
//!    rank of every marker above it.
//! 3. Any interior marker whose actual rank has drifted a full step from its
//!    desired rank, with room to move, is nudged one step: first by the
//!    piecewise-parabolic (P²) formula, falling back to linear interpolation
//!    if the parabola would overtake a neighbor.
//!
//! # Accuracy
//!
//! The estimate is approximate and converges as the stream grows. For
//! 10,000 values from a permuted 1..=10,000 the median, p90 and p99 land
//! within a fraction of a percent of the true values.

use tracing::debug;

use crate::error::{check_percentile, Result};
use crate::traits::Iterate;

const MARKERS: usize = 5;

/// Streaming percentile estimator with constant memory
///
/// # Example
///
/// ```
/// use rollstats::quantiles::PSquare;
///
/// let mut p99 = PSquare::new(99.0).unwrap();
/// for i in 1..=10_000 {
///     p99.add(i as f64);
/// }
/// assert!((p99.estimate() - 9_900.0).abs() < 99.0);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct PSquare {
    /// Target percentile on the 0..=100 scale
    percentile: f64,
    /// Target percentile as a fraction in [0, 1]
    p: f64,
    /// Finite observations seen
    count: u64,
    /// Marker heights; raw observations while priming
    heights: [f64; MARKERS],
    /// Actual marker ranks
    positions: [i64; MARKERS],
    /// Desired marker ranks
    desired: [f64; MARKERS],
    /// Per-observation increments of the desired ranks
    increments: [f64; MARKERS],
}

impl PSquare {
    /// Create an estimator for `percentile` in `[0, 100]`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::PercentileOutOfRange`](crate::error::ConfigError::PercentileOutOfRange)
    /// for a percentile outside `[0, 100]`.
    pub fn new(percentile: f64) -> Result<Self> {
        let percentile = check_percentile(percentile)?;
        let p = percentile / 100.0;
        Ok(Self {
            percentile,
            p,
            count: 0,
            heights: [0.0; MARKERS],
            positions: [0, 1, 2, 3, 4],
            desired: [0.0, 2.0 * p, 4.0 * p, 2.0 + 2.0 * p, 4.0],
            increments: [0.0, p / 2.0, p, (1.0 + p) / 2.0, 1.0],
        })
    }

    /// The percentile being estimated, on the 0..=100 scale
    pub fn percentile(&self) -> f64 {
        self.percentile
    }

    /// Number of observations seen
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Check if no observations have been seen
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Add an observation
    ///
    /// NaN and infinite values are ignored: the marker updates would turn an
    /// infinity into `inf - inf` and carry it into the interior markers.
    pub fn add(&mut self, value: f64) {
        if !value.is_finite() {
            return;
        }

        if self.count < MARKERS as u64 {
            self.heights[self.count as usize] = value;
            self.count += 1;
            if self.count == MARKERS as u64 {
                self.heights.sort_unstable_by(f64::total_cmp);
            }
            return;
        }
        self.count += 1;

        let cell = self.locate(value);
        for position in &mut self.positions[cell + 1..] {
            *position += 1;
        }
        for (desired, increment) in self.desired.iter_mut().zip(self.increments) {
            *desired += increment;
        }

        for i in 1..MARKERS - 1 {
            self.adjust(i);
        }
    }

    /// Current estimate
    ///
    /// Returns `0.0` before any observation and the largest observation while
    /// fewer than five have been seen.
    pub fn estimate(&self) -> f64 {
        match self.count {
            0 => 0.0,
            n if n < MARKERS as u64 => self.heights[..n as usize]
                .iter()
                .copied()
                .fold(f64::NEG_INFINITY, f64::max),
            _ => self.heights[2],
        }
    }

    /// Reset to the empty state, keeping the target percentile
    pub fn clear(&mut self) {
        *self = Self {
            count: 0,
            heights: [0.0; MARKERS],
            positions: [0, 1, 2, 3, 4],
            desired: [0.0, 2.0 * self.p, 4.0 * self.p, 2.0 + 2.0 * self.p, 4.0],
            ..*self
        };
    }

    /// Find the cell `k` with `q[k] <= value < q[k + 1]`, stretching the
    /// outer markers when `value` falls outside them.
    fn locate(&mut self, value: f64) -> usize {
        let q = &mut self.heights;
        if value < q[0] {
            q[0] = value;
            0
        } else if value < q[1] {
            0
        } else if value < q[2] {
            1
        } else if value < q[3] {
            2
        } else if value <= q[4] {
            3
        } else {
            q[4] = value;
            3
        }
    }

    fn adjust(&mut self, i: usize) {
        let n = &self.positions;
        let drift = self.desired[i] - n[i] as f64;
        let room_above = n[i + 1] - n[i] > 1;
        let room_below = n[i - 1] - n[i] < -1;
        if !((drift >= 1.0 && room_above) || (drift <= -1.0 && room_below)) {
            return;
        }

        let step: i64 = if drift > 0.0 { 1 } else { -1 };
        let q = &self.heights;
        let candidate = self.parabolic(i, step as f64);
        let height = if q[i - 1] < candidate && candidate < q[i + 1] {
            candidate
        } else {
            self.linear(i, step)
        };

        self.heights[i] = height;
        self.positions[i] += step;
    }

    fn parabolic(&self, i: usize, d: f64) -> f64 {
        let q = &self.heights;
        let n_prev = self.positions[i - 1] as f64;
        let n_i = self.positions[i] as f64;
        let n_next = self.positions[i + 1] as f64;

        q[i] + d / (n_next - n_prev)
            * ((n_i - n_prev + d) * (q[i + 1] - q[i]) / (n_next - n_i)
                + (n_next - n_i - d) * (q[i] - q[i - 1]) / (n_i - n_prev))
    }

    fn linear(&self, i: usize, step: i64) -> f64 {
        let j = (i as i64 + step) as usize;
        let q = &self.heights;
        let n = &self.positions;
        q[i] + step as f64 * (q[j] - q[i]) / (n[j] - n[i]) as f64
    }
}

impl Extend<f64> for PSquare {
    fn extend<T: IntoIterator<Item = f64>>(&mut self, iter: T) {
        for value in iter {
            self.add(value);
        }
    }
}

/// Estimate `percentile` of `samples` in a single pass
///
/// # Errors
///
/// Returns an error for a percentile outside `[0, 100]`.
pub fn estimate<T: IntoIterator<Item = f64>>(samples: T, percentile: f64) -> Result<f64> {
    let mut estimator = PSquare::new(percentile)?;
    estimator.extend(samples);
    Ok(estimator.estimate())
}

/// P² percentile reducer over a window
///
/// Replays the window into a fresh [`PSquare`] on every call. Memory use is
/// constant no matter how large the window is, at the price of an approximate
/// answer; use [`Percentile`](super::Percentile) when the exact value matters.
#[derive(Debug, Clone)]
pub struct FastPercentile {
    prototype: PSquare,
}

impl FastPercentile {
    /// Create a reducer for `percentile` in `[0, 100]`
    pub fn new(percentile: f64) -> Result<Self> {
        let prototype = PSquare::new(percentile)?;
        debug!(percentile, "created fast percentile reducer");
        Ok(Self { prototype })
    }

    /// The percentile this reducer estimates
    pub fn percentile(&self) -> f64 {
        self.prototype.percentile()
    }

    /// Estimate the percentile of everything `it` currently holds
    pub fn reduce<I: Iterate + ?Sized>(&self, it: &I) -> f64 {
        let mut estimator = self.prototype.clone();
        it.iterate(&mut |v| estimator.add(v));
        estimator.estimate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn permuted(n: u64) -> impl Iterator<Item = f64> {
        // 7919 is prime and coprime with 10_000, so this visits every value once.
        (0..n).map(move |i| ((i * 7919) % n + 1) as f64)
    }

    #[test]
    fn test_jain_chlamtac_example() {
        let data = [
            0.02, 0.15, 0.74, 0.83, 3.39, 22.37, 10.15, 15.43, 38.62, 15.92, 34.60, 10.28, 1.47,
            0.40, 0.05, 11.39, 0.27, 0.42, 0.09, 11.37,
        ];
        let result = estimate(data, 50.0).unwrap();
        assert!((result - 4.44).abs() < 0.01, "median={}", result);
    }

    #[test]
    fn test_ordered_stream_converges() {
        let n = 10_000u32;
        for p in [20.0, 50.0, 90.0, 99.0, 99.9] {
            let result = estimate((1..=n).map(f64::from), p).unwrap();
            let expected = n as f64 * p / 100.0;
            let relative = (result - expected).abs() / expected;
            assert!(relative < 0.01, "p{}: {} vs {}", p, result, expected);
        }
    }

    #[test]
    fn test_permuted_stream_converges() {
        for p in [10.0, 50.0, 90.0, 99.0] {
            let result = estimate(permuted(10_000), p).unwrap();
            let expected = 10_000.0 * p / 100.0;
            let relative = (result - expected).abs() / expected;
            assert!(relative < 0.01, "p{}: {} vs {}", p, result, expected);
        }
    }

    #[test]
    fn test_fewer_than_five_returns_max() {
        assert_eq!(estimate([], 50.0).unwrap(), 0.0);
        assert_eq!(estimate([3.0], 50.0).unwrap(), 3.0);
        assert_eq!(estimate([3.0, 1.0, 2.0], 50.0).unwrap(), 3.0);
        assert_eq!(estimate([-3.0, -1.0], 10.0).unwrap(), -1.0);
    }

    #[test]
    fn test_five_values_use_middle_marker() {
        assert_eq!(estimate([5.0, 4.0, 3.0, 2.0, 1.0], 90.0).unwrap(), 3.0);
    }

    #[test]
    fn test_markers_stay_ordered() {
        let mut estimator = PSquare::new(75.0).unwrap();
        estimator.extend(permuted(1_000));
        let q = estimator.heights;
        assert!(q.windows(2).all(|pair| pair[0] <= pair[1]), "{:?}", q);
        assert_eq!(q[0], 1.0);
        assert_eq!(q[4], 1_000.0);
        assert_eq!(estimator.positions[4], 999);
    }

    #[test]
    fn test_nan_is_ignored() {
        let mut estimator = PSquare::new(50.0).unwrap();
        estimator.add(f64::NAN);
        assert!(estimator.is_empty());
        estimator.extend([1.0, f64::NAN, 2.0]);
        assert_eq!(estimator.count(), 2);
        assert_eq!(estimator.estimate(), 2.0);
    }

    #[test]
    fn test_infinities_are_ignored() {
        let finite = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0];
        let expected = estimate(finite, 50.0).unwrap();

        let mut estimator = PSquare::new(50.0).unwrap();
        estimator.extend([1.0, 2.0, 3.0, 4.0, 5.0, f64::INFINITY, 6.0, 7.0, 8.0, 9.0]);
        estimator.add(f64::NEG_INFINITY);
        assert_eq!(estimator.count(), 9);
        assert!(estimator.estimate().is_finite());
        assert_eq!(estimator.estimate(), expected);
        assert!(estimator.heights.iter().all(|q| q.is_finite()));
    }

    #[test]
    fn test_clear() {
        let mut estimator = PSquare::new(90.0).unwrap();
        estimator.extend(permuted(100));
        estimator.clear();
        assert_eq!(estimator, PSquare::new(90.0).unwrap());
        assert_eq!(estimator.percentile(), 90.0);
    }

    #[test]
    fn test_fast_percentile_over_window() {
        let values: Vec<f64> = permuted(10_000).collect();
        let p90 = FastPercentile::new(90.0).unwrap();
        let result = p90.reduce(&values);
        assert!((result - 9_000.0).abs() < 90.0, "p90={}", result);
    }

    #[test]
    fn test_out_of_range_rejected() {
        assert!(PSquare::new(101.0).is_err());
        assert!(FastPercentile::new(-5.0).is_err());
        assert!(estimate([1.0], f64::NAN).is_err());
    }
}
