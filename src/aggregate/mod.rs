//! Rollups over windows
//!
//! An [`Aggregator`](crate::traits::Aggregator) compacts a window into a
//! single [`Aggregate`](crate::traits::Aggregate). The aggregators here come
//! in two groups:
//!
//! - reading a window directly: [`SimpleAggregator`] (count, sum, avg, min,
//!   max), [`PercentileAggregator`] and [`FastPercentileAggregator`]
//! - wrapping another aggregator: [`PercentageAggregator`],
//!   [`LimitedAggregator`] and [`NamedAggregator`]
//!
//! Wrapping aggregators link the result they wrapped as the `source` of their
//! own, so the provenance of any value can be walked back to the window.
//! [`AggregatorIterator`] closes the loop by replaying aggregate values as a
//! window of their own.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use std::time::Duration;
//! use rollstats::aggregate::{LimitedAggregator, NamedAggregator, PercentageAggregator, PercentileAggregator};
//! use rollstats::traits::{Aggregator, Feed};
//! use rollstats::window::TimeWindow;
//!
//! let latency = Arc::new(TimeWindow::new(Duration::from_secs(1), 30).unwrap());
//! let p99 = PercentileAggregator::new(99.0, Arc::clone(&latency), 1024).unwrap();
//!
//! // Shed load proportionally as p99 climbs from 200ms to 1s, but only once
//! // there are at least 100 samples to go on.
//! let shed = NamedAggregator::new(
//!     "shed_ratio",
//!     LimitedAggregator::new(
//!         100,
//!         Arc::clone(&latency),
//!         PercentageAggregator::new(p99, 200.0, 1000.0).unwrap(),
//!     ),
//! );
//!
//! latency.feed(150.0);
//! assert_eq!(shed.aggregate().value, 0.0);
//! ```

mod compose;
mod window;

pub use compose::{AggregatorIterator, LimitedAggregator, NamedAggregator, PercentageAggregator};
pub use window::{FastPercentileAggregator, PercentileAggregator, SimpleAggregator};
