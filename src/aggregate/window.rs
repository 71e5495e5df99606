//! Aggregators that read a window directly

use tracing::debug;

use crate::error::Result;
use crate::quantiles::{FastPercentile, Percentile};
use crate::reduce::Reduction;
use crate::traits::{Aggregate, Aggregator, Iterate, Namer};

/// Applies one of the one-pass [`Reduction`]s to a window
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use rollstats::aggregate::SimpleAggregator;
/// use rollstats::traits::{Aggregator, Feed};
/// use rollstats::window::PointWindow;
///
/// let window = Arc::new(PointWindow::new(10).unwrap());
/// let sum = SimpleAggregator::sum(Arc::clone(&window));
///
/// for _ in 0..10 {
///     window.feed(1.0);
/// }
/// assert_eq!(sum.aggregate().value, 10.0);
/// ```
#[derive(Debug, Clone)]
pub struct SimpleAggregator<I> {
    iterator: I,
    reduction: Reduction,
}

impl<I: Iterate> SimpleAggregator<I> {
    /// Aggregate `iterator` with `reduction`
    pub fn new(reduction: Reduction, iterator: I) -> Self {
        Self {
            iterator,
            reduction,
        }
    }

    /// Number of values in the window
    pub fn count(iterator: I) -> Self {
        Self::new(Reduction::Count, iterator)
    }

    /// Sum of the values in the window
    pub fn sum(iterator: I) -> Self {
        Self::new(Reduction::Sum, iterator)
    }

    /// Mean of the values in the window
    pub fn avg(iterator: I) -> Self {
        Self::new(Reduction::Avg, iterator)
    }

    /// Smallest value in the window
    pub fn min(iterator: I) -> Self {
        Self::new(Reduction::Min, iterator)
    }

    /// Largest value in the window
    pub fn max(iterator: I) -> Self {
        Self::new(Reduction::Max, iterator)
    }

    /// The reduction applied
    pub fn reduction(&self) -> Reduction {
        self.reduction
    }
}

impl<I: Iterate + Send + Sync> Aggregator for SimpleAggregator<I> {
    fn aggregate(&self) -> Aggregate {
        Aggregate::named(self.reduction.name(), self.reduction.apply(&self.iterator))
    }
}

impl<I> Namer for SimpleAggregator<I> {
    fn name(&self) -> &str {
        self.reduction.name()
    }
}

/// Exact percentile of a window
///
/// If the percentile can be resolved exactly from the data the exact value is
/// returned; otherwise the two closest points are linearly interpolated. See
/// [`Percentile`] for the rank formula.
#[derive(Debug)]
pub struct PercentileAggregator<I> {
    iterator: I,
    reducer: Percentile,
    name: String,
}

impl<I: Iterate> PercentileAggregator<I> {
    /// Aggregate the `percentile` (0..=100) of `iterator`
    ///
    /// `prealloc` sizes the reusable scratch buffer; pass the expected window
    /// size to avoid regrowing it on the first few calls.
    pub fn new(percentile: f64, iterator: I, prealloc: usize) -> Result<Self> {
        let reducer = Percentile::with_prealloc(percentile, prealloc)?;
        Ok(Self {
            iterator,
            reducer,
            name: format!("p{}", percentile),
        })
    }
}

impl<I: Iterate + Send + Sync> Aggregator for PercentileAggregator<I> {
    fn aggregate(&self) -> Aggregate {
        Aggregate::named(self.name.clone(), self.reducer.reduce(&self.iterator))
    }
}

impl<I> Namer for PercentileAggregator<I> {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Estimated percentile of a window using the P² algorithm
///
/// Constant memory regardless of window size; the result approaches the
/// exact percentile as the window grows.
#[derive(Debug, Clone)]
pub struct FastPercentileAggregator<I> {
    iterator: I,
    reducer: FastPercentile,
    name: String,
}

impl<I: Iterate> FastPercentileAggregator<I> {
    /// Aggregate the estimated `percentile` (0..=100) of `iterator`
    pub fn new(percentile: f64, iterator: I) -> Result<Self> {
        let reducer = FastPercentile::new(percentile)?;
        debug!(percentile, "created fast percentile aggregator");
        Ok(Self {
            iterator,
            reducer,
            name: format!("fp{}", percentile),
        })
    }
}

impl<I: Iterate + Send + Sync> Aggregator for FastPercentileAggregator<I> {
    fn aggregate(&self) -> Aggregate {
        Aggregate::named(self.name.clone(), self.reducer.reduce(&self.iterator))
    }
}

impl<I> Namer for FastPercentileAggregator<I> {
    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::Feed;
    use crate::window::{ManualClock, PointWindow, TimeWindow};
    use std::sync::Arc;
    use std::time::Duration;

    fn filled(n: u32) -> Arc<PointWindow> {
        let window = Arc::new(PointWindow::new(n as usize).unwrap());
        for x in 1..=n {
            window.feed(f64::from(x));
        }
        window
    }

    #[test]
    fn test_count_of_unfilled_point_window_includes_padding() {
        let window = PointWindow::new(100).unwrap();
        let count = SimpleAggregator::count(&window);
        assert_eq!(count.aggregate().value, 100.0);
    }

    #[test]
    fn test_count_of_time_window() {
        let clock = Arc::new(ManualClock::new());
        let window = TimeWindow::with_clock(Duration::from_millis(1), 100, 100, clock).unwrap();
        for _ in 0..100 {
            window.feed(0.0);
        }
        let count = SimpleAggregator::count(&window);
        assert_eq!(count.aggregate().value, 100.0);
    }

    #[test]
    fn test_simple_aggregates() {
        let window = filled(100);
        assert_eq!(SimpleAggregator::sum(&*window).aggregate().value, 5050.0);
        assert_eq!(SimpleAggregator::avg(&*window).aggregate().value, 50.5);
        assert_eq!(SimpleAggregator::min(&*window).aggregate().value, 1.0);
        assert_eq!(SimpleAggregator::max(&*window).aggregate().value, 100.0);

        let avg = SimpleAggregator::avg(window);
        assert_eq!(avg.name(), "avg");
        assert_eq!(avg.aggregate().name, "avg");
        assert_eq!(avg.reduction(), Reduction::Avg);
    }

    #[test]
    fn test_percentile_aggregator() {
        let window = filled(100);
        for p in [20.0, 50.0, 99.0] {
            let agg = PercentileAggregator::new(p, Arc::clone(&window), 100).unwrap();
            assert_eq!(agg.aggregate().value, p);
        }
        let agg = PercentileAggregator::new(99.9, window, 0).unwrap();
        assert_eq!(agg.name(), "p99.9");
        assert!((agg.aggregate().value - 99.9).abs() < 1e-9);
    }

    #[test]
    fn test_fast_percentile_aggregator() {
        let window = filled(10_000);
        let agg = FastPercentileAggregator::new(99.9, window).unwrap();
        let result = agg.aggregate();
        assert_eq!(result.name, "fp99.9");
        assert!((result.value - 9_990.0).abs() < 99.9, "fp99.9={}", result.value);
    }

    #[test]
    fn test_invalid_percentile_rejected() {
        let window = filled(1);
        assert!(PercentileAggregator::new(120.0, Arc::clone(&window), 0).is_err());
        assert!(FastPercentileAggregator::new(-1.0, window).is_err());
    }
}
