//! # Rollstats
//!
//! Rolling windows and rollup statistics for metrics pipelines and adaptive
//! decision logic such as rate limiting and load shedding.
//!
//! Rollstats keeps a bounded, continuously updated window of numeric samples,
//! by count or by elapsed time, and computes rollups over it: count, sum,
//! average, min, max and percentiles.
//!
//! ## Features
//!
//! - **Count-bounded windows**: the last N samples, overwritten in place
//! - **Time-bucketed windows**: the last `buckets × duration` of samples,
//!   kept consistent across gaps in arrival without a background task
//! - **Exact percentiles**: snapshot, sort and interpolate
//! - **Streaming percentiles**: the P² estimator in constant memory
//! - **Composable rollups**: range mapping, sample-count gating and named
//!   provenance chains on top of any aggregator
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use rollstats::prelude::*;
//!
//! // One minute of request latencies in one-second buckets
//! let latency = Arc::new(TimeWindow::new(Duration::from_secs(1), 60).unwrap());
//! let p99 = PercentileAggregator::new(99.0, Arc::clone(&latency), 1024).unwrap();
//!
//! for ms in [12.0, 15.0, 11.0, 240.0, 13.0] {
//!     latency.feed(ms);
//! }
//! println!("p99 latency: {}ms", p99.aggregate().value);
//! ```
//!
//! ## Concurrency
//!
//! Windows are shared by reference (typically through an `Arc`) and lock
//! internally: any number of threads may feed and read the same window.
//! Count-bounded windows allow concurrent readers; time-bucketed windows
//! serialize readers and writers because both repair the bucket ring.
//!
//! ## Feature Flags
//!
//! Algorithm families (all on by default):
//! - `window`: count-bounded and time-bucketed windows
//! - `quantiles`: exact and P² percentiles
//! - `aggregate`: aggregators and declarative configuration
//!   (implies `window` and `quantiles`)
//! - `full`: everything, including `serde`
//!
//! Platform features:
//! - `serde`: (de)serialization of aggregates and configuration

#![cfg_attr(docsrs, feature(doc_cfg))]

// Core traits always available
pub mod error;
pub mod reduce;
pub mod traits;

#[cfg(feature = "window")]
#[cfg_attr(docsrs, doc(cfg(feature = "window")))]
pub mod window;

#[cfg(feature = "quantiles")]
#[cfg_attr(docsrs, doc(cfg(feature = "quantiles")))]
pub mod quantiles;

#[cfg(feature = "aggregate")]
#[cfg_attr(docsrs, doc(cfg(feature = "aggregate")))]
pub mod aggregate;

#[cfg(feature = "aggregate")]
#[cfg_attr(docsrs, doc(cfg(feature = "aggregate")))]
pub mod config;

pub mod prelude {
    pub use crate::error::ConfigError;
    pub use crate::reduce::Reduction;
    pub use crate::traits::*;

    #[cfg(feature = "window")]
    pub use crate::window::{PointWindow, RollingWindow, TimeWindow};

    #[cfg(feature = "quantiles")]
    pub use crate::quantiles::{FastPercentile, PSquare, Percentile};

    #[cfg(feature = "aggregate")]
    pub use crate::aggregate::{
        AggregatorIterator, FastPercentileAggregator, LimitedAggregator, NamedAggregator,
        PercentageAggregator, PercentileAggregator, SimpleAggregator,
    };
}

pub use error::ConfigError;

#[cfg(feature = "window")]
pub use window::{PointWindow, TimeWindow};

#[cfg(feature = "quantiles")]
pub use quantiles::{PSquare, Percentile};
