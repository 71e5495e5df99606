//! Count-bounded rolling window
//!
//! Keeps the last N values fed, regardless of when they arrived.

use parking_lot::RwLock;
use tracing::debug;

use crate::error::{ConfigError, Result};
use crate::traits::{Feed, Iterate};

/// Rolling window over the last `capacity` values
///
/// Slots start out as `0.0`, so a window that has not yet filled replays
/// padding zeros rather than a shorter sequence. Once full, each new value
/// overwrites the oldest one in place.
///
/// Writers serialize on an exclusive lock; readers share a read lock and can
/// replay concurrently.
///
/// # Example
///
/// ```
/// use rollstats::window::PointWindow;
/// use rollstats::traits::{Feed, Iterate};
///
/// let window = PointWindow::new(3).unwrap();
/// for v in [1.0, 2.0, 3.0, 4.0] {
///     window.feed(v);
/// }
///
/// let mut seen = Vec::new();
/// window.iterate(&mut |v| seen.push(v));
/// assert_eq!(seen, [4.0, 2.0, 3.0]);
/// ```
#[derive(Debug)]
pub struct PointWindow {
    inner: RwLock<PointInner>,
}

#[derive(Debug)]
struct PointInner {
    values: Vec<f64>,
    /// Next slot to write
    cursor: usize,
}

impl PointWindow {
    /// Create a window holding the last `capacity` values
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroCapacity`] if `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        debug!(capacity, "created point window");
        Ok(Self {
            inner: RwLock::new(PointInner {
                values: vec![0.0; capacity],
                cursor: 0,
            }),
        })
    }

    /// Number of slots in the window
    pub fn capacity(&self) -> usize {
        self.inner.read().values.len()
    }
}

impl Feed for PointWindow {
    fn feed(&self, value: f64) {
        let mut inner = self.inner.write();
        let cursor = inner.cursor;
        inner.values[cursor] = value;
        inner.cursor = (cursor + 1) % inner.values.len();
    }
}

impl Iterate for PointWindow {
    /// Replays every slot in storage order.
    ///
    /// The read lock is held for the whole replay, so `visit` must not feed
    /// the same window.
    fn iterate(&self, visit: &mut dyn FnMut(f64)) {
        let inner = self.inner.read();
        for &value in &inner.values {
            visit(value);
        }
    }
}
