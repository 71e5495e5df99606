//! One-pass reducers
//!
//! Each reducer replays a window once and folds it into a scalar. Empty
//! windows reduce to `0.0` rather than NaN or an infinity.

use core::fmt;

use crate::traits::Iterate;

/// The one-pass reductions, for picking one at runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Reduction {
    /// See [`count`]
    Count,
    /// See [`sum`]
    Sum,
    /// See [`avg`]
    Avg,
    /// See [`min`]
    Min,
    /// See [`max`]
    Max,
}

impl Reduction {
    /// Apply the reduction to a window
    pub fn apply<I: Iterate + ?Sized>(self, it: &I) -> f64 {
        match self {
            Reduction::Count => count(it),
            Reduction::Sum => sum(it),
            Reduction::Avg => avg(it),
            Reduction::Min => min(it),
            Reduction::Max => max(it),
        }
    }

    /// Short lowercase label
    pub fn name(self) -> &'static str {
        match self {
            Reduction::Count => "count",
            Reduction::Sum => "sum",
            Reduction::Avg => "avg",
            Reduction::Min => "min",
            Reduction::Max => "max",
        }
    }
}

impl fmt::Display for Reduction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Number of values in the window
pub fn count<I: Iterate + ?Sized>(it: &I) -> f64 {
    let mut result = 0.0;
    it.iterate(&mut |_| result += 1.0);
    result
}

/// Sum of the values in the window
pub fn sum<I: Iterate + ?Sized>(it: &I) -> f64 {
    let mut result = 0.0;
    it.iterate(&mut |v| result += v);
    result
}

/// Arithmetic mean of the values in the window
pub fn avg<I: Iterate + ?Sized>(it: &I) -> f64 {
    let mut total = 0.0;
    let mut points = 0u64;
    it.iterate(&mut |v| {
        total += v;
        points += 1;
    });
    if points == 0 {
        return 0.0;
    }
    total / points as f64
}

/// Smallest value in the window
pub fn min<I: Iterate + ?Sized>(it: &I) -> f64 {
    fold_extreme(it, f64::min)
}

/// Largest value in the window
pub fn max<I: Iterate + ?Sized>(it: &I) -> f64 {
    fold_extreme(it, f64::max)
}

fn fold_extreme<I: Iterate + ?Sized>(it: &I, pick: fn(f64, f64) -> f64) -> f64 {
    let mut result: Option<f64> = None;
    it.iterate(&mut |v| {
        result = Some(match result {
            Some(current) => pick(current, v),
            None => v,
        });
    });
    result.unwrap_or(0.0)
}
