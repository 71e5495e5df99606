//! Declarative construction of windows and rollups
//!
//! Lets a service describe its windows and rollups in its own configuration
//! file and build them at startup. With the `serde` feature both config types
//! (de)serialize; the window flavor and rollup kind are picked by a `kind`
//! tag:
//!
//! ```json
//! {
//!   "window": { "kind": "time", "bucket_duration_ms": 1000, "buckets": 60 },
//!   "rollup": { "kind": "percentile", "percentile": 99.0, "percentage": { "lower": 200.0, "upper": 1000.0 } }
//! }
//! ```

use std::time::Duration;

use tracing::debug;

use crate::aggregate::{
    FastPercentileAggregator, LimitedAggregator, NamedAggregator, PercentageAggregator,
    PercentileAggregator, SimpleAggregator,
};
use crate::error::Result;
use crate::reduce::Reduction;
use crate::traits::{Iterate, Rollup};
use crate::window::{PointWindow, RollingWindow, TimeWindow};

/// Which window to build
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum WindowConfig {
    /// The last `capacity` values
    Point { capacity: usize },
    /// Values from the last `buckets × bucket_duration_ms` milliseconds
    Time {
        bucket_duration_ms: u64,
        buckets: usize,
        #[cfg_attr(feature = "serde", serde(default))]
        prealloc: usize,
    },
}

impl WindowConfig {
    /// Validate the configuration and build the window
    pub fn build(&self) -> Result<RollingWindow> {
        debug!(config = ?self, "building window");
        match *self {
            WindowConfig::Point { capacity } => PointWindow::new(capacity).map(RollingWindow::Point),
            WindowConfig::Time {
                bucket_duration_ms,
                buckets,
                prealloc,
            } => TimeWindow::with_prealloc(
                Duration::from_millis(bucket_duration_ms),
                buckets,
                prealloc,
            )
            .map(RollingWindow::Time),
        }
    }
}

/// The rollup that reads the window
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum RollupKind {
    Count,
    Sum,
    Avg,
    Min,
    Max,
    /// Exact percentile on the 0..=100 scale
    Percentile {
        percentile: f64,
        #[cfg_attr(feature = "serde", serde(default))]
        prealloc: usize,
    },
    /// P² estimated percentile on the 0..=100 scale
    FastPercentile { percentile: f64 },
}

/// Bounds for mapping a rollup onto `[lower, upper]`
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RangeConfig {
    pub lower: f64,
    pub upper: f64,
}

/// A rollup and the wrappers around it
///
/// Wrappers apply inside out: the percentage mapping wraps the base rollup,
/// the sample gate wraps that, and the name labels the outermost result.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RollupConfig {
    /// Label for the outermost result
    #[cfg_attr(feature = "serde", serde(default))]
    pub name: Option<String>,
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub kind: RollupKind,
    /// Map the result onto a range
    #[cfg_attr(feature = "serde", serde(default))]
    pub percentage: Option<RangeConfig>,
    /// Report zero until the window holds this many values
    #[cfg_attr(feature = "serde", serde(default))]
    pub min_samples: Option<usize>,
}

impl RollupConfig {
    /// A bare rollup with no wrappers
    pub fn new(kind: RollupKind) -> Self {
        Self {
            name: None,
            kind,
            percentage: None,
            min_samples: None,
        }
    }

    /// Validate the configuration and build the rollup over `iterator`
    pub fn build<I>(&self, iterator: I) -> Result<Box<dyn Rollup>>
    where
        I: Iterate + Clone + Send + Sync + 'static,
    {
        debug!(config = ?self, "building rollup");
        let mut rollup: Box<dyn Rollup> = match self.kind {
            RollupKind::Count => Box::new(SimpleAggregator::new(Reduction::Count, iterator.clone())),
            RollupKind::Sum => Box::new(SimpleAggregator::new(Reduction::Sum, iterator.clone())),
            RollupKind::Avg => Box::new(SimpleAggregator::new(Reduction::Avg, iterator.clone())),
            RollupKind::Min => Box::new(SimpleAggregator::new(Reduction::Min, iterator.clone())),
            RollupKind::Max => Box::new(SimpleAggregator::new(Reduction::Max, iterator.clone())),
            RollupKind::Percentile {
                percentile,
                prealloc,
            } => Box::new(PercentileAggregator::new(
                percentile,
                iterator.clone(),
                prealloc,
            )?),
            RollupKind::FastPercentile { percentile } => Box::new(FastPercentileAggregator::new(
                percentile,
                iterator.clone(),
            )?),
        };

        if let Some(range) = self.percentage {
            rollup = Box::new(PercentageAggregator::new(rollup, range.lower, range.upper)?);
        }
        if let Some(limit) = self.min_samples {
            rollup = Box::new(LimitedAggregator::new(limit, iterator, rollup));
        }
        if let Some(name) = &self.name {
            rollup = Box::new(NamedAggregator::new(name.clone(), rollup));
        }
        Ok(rollup)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;
    use crate::traits::{Aggregator, Feed};
    use std::sync::Arc;

    #[test]
    fn test_build_windows() {
        let point = WindowConfig::Point { capacity: 3 }.build().unwrap();
        assert!(matches!(point, RollingWindow::Point(_)));

        let time = WindowConfig::Time {
            bucket_duration_ms: 1_000,
            buckets: 60,
            prealloc: 8,
        }
        .build()
        .unwrap();
        match time {
            RollingWindow::Time(w) => assert_eq!(w.span(), Duration::from_secs(60)),
            other => panic!("expected time window, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_window_config() {
        let err = WindowConfig::Point { capacity: 0 }.build().unwrap_err();
        assert_eq!(err, ConfigError::ZeroCapacity);
        let err = WindowConfig::Time {
            bucket_duration_ms: 0,
            buckets: 10,
            prealloc: 0,
        }
        .build()
        .unwrap_err();
        assert_eq!(err, ConfigError::ZeroBucketDuration);
    }

    #[test]
    fn test_build_composed_rollup() {
        let window = Arc::new(WindowConfig::Point { capacity: 4 }.build().unwrap());
        for v in [10.0, 20.0, 30.0, 40.0] {
            window.feed(v);
        }

        let config = RollupConfig {
            name: Some("load".into()),
            kind: RollupKind::Avg,
            percentage: Some(RangeConfig {
                lower: 0.0,
                upper: 50.0,
            }),
            min_samples: Some(4),
        };
        let rollup = config.build(Arc::clone(&window)).unwrap();
        assert_eq!(rollup.name(), "load");

        let result = rollup.aggregate();
        assert_eq!(result.value, 0.5);
        let names: Vec<&str> = result.chain().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["load", "limited", "percentage", "avg"]);
    }

    #[test]
    fn test_build_percentile_rollups() {
        let values: Arc<Vec<f64>> = Arc::new((1..=100).map(f64::from).collect());
        let exact = RollupConfig::new(RollupKind::Percentile {
            percentile: 50.0,
            prealloc: 100,
        })
        .build(Arc::clone(&values))
        .unwrap();
        assert_eq!(exact.aggregate().value, 50.0);

        let fast = RollupConfig::new(RollupKind::FastPercentile { percentile: 50.0 })
            .build(Arc::clone(&values))
            .unwrap();
        assert!((fast.aggregate().value - 50.0).abs() < 5.0);

        let invalid = RollupConfig::new(RollupKind::Percentile {
            percentile: 150.0,
            prealloc: 0,
        });
        assert!(invalid.build(values).is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_deserialize() {
        let window: WindowConfig =
            serde_json::from_str(r#"{"kind": "time", "bucket_duration_ms": 500, "buckets": 20}"#)
                .unwrap();
        assert_eq!(
            window,
            WindowConfig::Time {
                bucket_duration_ms: 500,
                buckets: 20,
                prealloc: 0
            }
        );

        let rollup: RollupConfig = serde_json::from_str(
            r#"{"kind": "fast_percentile", "percentile": 99.9, "min_samples": 50}"#,
        )
        .unwrap();
        assert_eq!(rollup.kind, RollupKind::FastPercentile { percentile: 99.9 });
        assert_eq!(rollup.min_samples, Some(50));
        assert_eq!(rollup.name, None);

        let count: RollupConfig = serde_json::from_str(r#"{"kind": "count"}"#).unwrap();
        assert_eq!(count, RollupConfig::new(RollupKind::Count));
    }
}
