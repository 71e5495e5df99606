//! Aggregators built on top of other aggregators

use tracing::debug;

use super::window::SimpleAggregator;
use crate::error::{ConfigError, Result};
use crate::traits::{Aggregate, Aggregator, Iterate, Namer};

/// Maps an aggregate onto the range `[lower, upper]`
///
/// Produces `(value - lower) / (upper - lower)`. Values at or below `lower`
/// map to exactly `0`; values above `upper` are not clamped and map past `1`.
///
/// # Example
///
/// ```
/// use rollstats::aggregate::{PercentageAggregator, SimpleAggregator};
/// use rollstats::traits::Aggregator;
///
/// let values = vec![25.0, 50.0];
/// let pct = PercentageAggregator::new(SimpleAggregator::sum(values), 50.0, 150.0).unwrap();
/// assert_eq!(pct.aggregate().value, 0.25);
/// ```
#[derive(Debug, Clone)]
pub struct PercentageAggregator<A> {
    aggregator: A,
    lower: f64,
    upper: f64,
    range: f64,
}

impl<A: Aggregator> PercentageAggregator<A> {
    /// Wrap `aggregator`, mapping its value onto `[lower, upper]`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidRange`] unless both bounds are finite and
    /// `lower < upper`.
    pub fn new(aggregator: A, lower: f64, upper: f64) -> Result<Self> {
        if !(lower.is_finite() && upper.is_finite() && lower < upper) {
            return Err(ConfigError::InvalidRange { lower, upper });
        }
        debug!(lower, upper, "created percentage aggregator");
        Ok(Self {
            aggregator,
            lower,
            upper,
            range: upper - lower,
        })
    }

    /// Bounds of the mapped range
    pub fn bounds(&self) -> (f64, f64) {
        (self.lower, self.upper)
    }
}

impl<A: Aggregator> Aggregator for PercentageAggregator<A> {
    fn aggregate(&self) -> Aggregate {
        let source = self.aggregator.aggregate();
        let shifted = source.value - self.lower;
        let value = if shifted <= 0.0 { 0.0 } else { shifted / self.range };
        Aggregate::named("percentage", value).with_source(source)
    }
}

impl<A> Namer for PercentageAggregator<A> {
    fn name(&self) -> &str {
        "percentage"
    }
}

/// Returns zero until a window holds at least `limit` values
///
/// Useful for keeping adaptive logic quiet until there is enough data to act
/// on. Once the limit is reached the wrapped aggregator is evaluated.
#[derive(Debug, Clone)]
pub struct LimitedAggregator<A, I> {
    evaluator: A,
    counter: SimpleAggregator<I>,
    limit: f64,
}

impl<A: Aggregator, I: Iterate> LimitedAggregator<A, I> {
    /// Gate `evaluator` on `iterator` holding at least `limit` values
    pub fn new(limit: usize, iterator: I, evaluator: A) -> Self {
        debug!(limit, "created limited aggregator");
        Self {
            evaluator,
            counter: SimpleAggregator::count(iterator),
            limit: limit as f64,
        }
    }
}

impl<A: Aggregator, I: Iterate + Send + Sync> Aggregator for LimitedAggregator<A, I> {
    fn aggregate(&self) -> Aggregate {
        let count = self.counter.aggregate();
        if count.value < self.limit {
            return Aggregate::named("limited", 0.0).with_source(count);
        }
        let source = self.evaluator.aggregate();
        Aggregate::named("limited", source.value).with_source(source)
    }
}

impl<A, I> Namer for LimitedAggregator<A, I> {
    fn name(&self) -> &str {
        "limited"
    }
}

/// Attaches a label to another aggregator's result
///
/// The labelled aggregate carries the same value and links the wrapped one as
/// its source.
#[derive(Debug, Clone)]
pub struct NamedAggregator<A> {
    name: String,
    aggregator: A,
}

impl<A: Aggregator> NamedAggregator<A> {
    /// Label `aggregator` as `name`
    pub fn new(name: impl Into<String>, aggregator: A) -> Self {
        Self {
            name: name.into(),
            aggregator,
        }
    }
}

impl<A: Aggregator> Aggregator for NamedAggregator<A> {
    fn aggregate(&self) -> Aggregate {
        let source = self.aggregator.aggregate();
        Aggregate::named(self.name.clone(), source.value).with_source(source)
    }
}

impl<A> Namer for NamedAggregator<A> {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Replays the results of several aggregators as a window
///
/// Lets rollups of several windows be reduced again, e.g. the worst p99
/// across a set of endpoints.
///
/// # Example
///
/// ```
/// use rollstats::aggregate::{AggregatorIterator, SimpleAggregator};
/// use rollstats::reduce;
///
/// let per_endpoint = AggregatorIterator::new(vec![
///     Box::new(SimpleAggregator::max(vec![3.0, 9.0])),
///     Box::new(SimpleAggregator::max(vec![4.0, 7.0])),
/// ]);
/// assert_eq!(reduce::max(&per_endpoint), 9.0);
/// ```
#[derive(Default)]
pub struct AggregatorIterator {
    aggregators: Vec<Box<dyn Aggregator>>,
}

impl AggregatorIterator {
    /// Replay the results of `aggregators`, in order
    pub fn new(aggregators: Vec<Box<dyn Aggregator>>) -> Self {
        Self { aggregators }
    }

    /// Add another aggregator to the replay
    pub fn push(&mut self, aggregator: impl Aggregator + 'static) {
        self.aggregators.push(Box::new(aggregator));
    }

    /// Number of aggregators replayed
    pub fn len(&self) -> usize {
        self.aggregators.len()
    }

    /// Check if there is nothing to replay
    pub fn is_empty(&self) -> bool {
        self.aggregators.is_empty()
    }
}

impl Iterate for AggregatorIterator {
    fn iterate(&self, visit: &mut dyn FnMut(f64)) {
        for aggregator in &self.aggregators {
            visit(aggregator.aggregate().value);
        }
    }
}

impl core::fmt::Debug for AggregatorIterator {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AggregatorIterator")
            .field("aggregators", &self.aggregators.len())
            .finish()
    }
}
