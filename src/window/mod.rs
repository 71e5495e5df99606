//! Rolling windows
//!
//! A window accepts samples through [`Feed`] and replays its current contents
//! through [`Iterate`]. Two flavors are provided:
//!
//! - [`PointWindow`]: the last N values, regardless of arrival time
//! - [`TimeWindow`]: every value that arrived within the last
//!   `buckets × bucket_duration`, repaired lazily as time moves on
//!
//! [`RollingWindow`] wraps either one when the choice is made at runtime,
//! e.g. from configuration.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use rollstats::window::{PointWindow, RollingWindow, TimeWindow};
//! use rollstats::traits::{Feed, Iterate};
//!
//! let windows = [
//!     RollingWindow::from(PointWindow::new(100).unwrap()),
//!     RollingWindow::from(TimeWindow::new(Duration::from_secs(1), 60).unwrap()),
//! ];
//!
//! for window in &windows {
//!     window.feed(42.0);
//! }
//! ```

mod clock;
mod point;
mod time;

pub use clock::{Clock, ManualClock, SystemClock};
pub use point::PointWindow;
pub use time::TimeWindow;

use crate::traits::{Feed, Iterate};

/// A window whose flavor is picked at construction time
#[derive(Debug)]
pub enum RollingWindow {
    /// Count-bounded window
    Point(PointWindow),
    /// Time-bucketed window on the system clock
    Time(TimeWindow),
}

impl From<PointWindow> for RollingWindow {
    fn from(window: PointWindow) -> Self {
        RollingWindow::Point(window)
    }
}

impl From<TimeWindow> for RollingWindow {
    fn from(window: TimeWindow) -> Self {
        RollingWindow::Time(window)
    }
}

impl Feed for RollingWindow {
    fn feed(&self, value: f64) {
        match self {
            RollingWindow::Point(w) => w.feed(value),
            RollingWindow::Time(w) => w.feed(value),
        }
    }
}

impl Iterate for RollingWindow {
    fn iterate(&self, visit: &mut dyn FnMut(f64)) {
        match self {
            RollingWindow::Point(w) => w.iterate(visit),
            RollingWindow::Time(w) => w.iterate(visit),
        }
    }
}
