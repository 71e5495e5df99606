//! Percentile computation over rolling windows
//!
//! # Algorithms
//!
//! - [`Percentile`]: exact; snapshots and sorts the window, then interpolates
//! - [`PSquare`]: streaming P² estimator with five markers and O(1) memory
//! - [`FastPercentile`]: runs [`PSquare`] over a window replay
//!
//! # Example
//!
//! ```
//! use rollstats::quantiles::{FastPercentile, Percentile};
//!
//! let values: Vec<f64> = (1..=10_000).map(f64::from).collect();
//!
//! let exact = Percentile::new(99.0).unwrap().reduce(&values);
//! let fast = FastPercentile::new(99.0).unwrap().reduce(&values);
//!
//! assert_eq!(exact, 9_900.0);
//! assert!((fast - exact).abs() / exact < 0.01);
//! ```

mod exact;
mod p_square;

pub use exact::Percentile;
pub use p_square::{estimate, FastPercentile, PSquare};
