//! Time-bucketed rolling window
//!
//! Wall-clock time is sliced into buckets of a fixed duration. A bucket's
//! index is `floor(now / bucket_duration)` and its slot in the ring is that
//! index modulo the bucket count, so slots are reused cyclically as time moves
//! on.
//!
//! Nothing runs in the background. Instead every `feed` and `iterate` first
//! repairs the ring: slots whose bucket has rolled out of the live window since
//! the last touch are cleared before the value is written or the window is
//! replayed. Both paths mutate the ring, so both take the same exclusive lock.

use std::time::Duration;

use parking_lot::Mutex;
use tracing::{debug, trace};

use super::clock::{Clock, SystemClock};
use crate::error::{ConfigError, Result};
use crate::traits::{Feed, Iterate};

/// Rolling window over the last `buckets × bucket_duration` of wall-clock time
///
/// Data points that arrive a whole window apart leave the window holding only
/// the newest one. Buckets skipped over while no data arrived are emptied so
/// the window stays consistent.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use std::time::Duration;
/// use rollstats::window::{ManualClock, TimeWindow};
/// use rollstats::traits::{Feed, Iterate};
///
/// let clock = Arc::new(ManualClock::new());
/// let window = TimeWindow::with_clock(Duration::from_secs(1), 3, 0, Arc::clone(&clock)).unwrap();
///
/// window.feed(1.0);
/// clock.advance(Duration::from_secs(1));
/// window.feed(2.0);
/// clock.advance(Duration::from_secs(3));
/// window.feed(3.0);
///
/// let mut seen = Vec::new();
/// window.iterate(&mut |v| seen.push(v));
/// assert_eq!(seen, [3.0]);
/// ```
#[derive(Debug)]
pub struct TimeWindow<C = SystemClock> {
    bucket_duration: Duration,
    bucket_nanos: u128,
    buckets: usize,
    clock: C,
    ring: Mutex<Ring>,
}

#[derive(Debug)]
struct Ring {
    buckets: Vec<Vec<f64>>,
    /// Bucket index of the most recent touch
    last_index: u64,
    /// Ring slot of the most recent touch
    last_offset: usize,
}

impl TimeWindow<SystemClock> {
    /// Create a window of `buckets` slots, each spanning `bucket_duration`
    ///
    /// # Errors
    ///
    /// Returns an error if `bucket_duration` is zero or `buckets` is zero.
    pub fn new(bucket_duration: Duration, buckets: usize) -> Result<Self> {
        Self::with_clock(bucket_duration, buckets, 0, SystemClock)
    }

    /// Like [`TimeWindow::new`], pre-sizing every bucket for `prealloc` values
    ///
    /// The hint only affects allocation, never which values are kept.
    pub fn with_prealloc(bucket_duration: Duration, buckets: usize, prealloc: usize) -> Result<Self> {
        Self::with_clock(bucket_duration, buckets, prealloc, SystemClock)
    }
}

impl<C: Clock> TimeWindow<C> {
    /// Create a window that reads time from `clock`
    pub fn with_clock(
        bucket_duration: Duration,
        buckets: usize,
        prealloc: usize,
        clock: C,
    ) -> Result<Self> {
        if buckets == 0 {
            return Err(ConfigError::ZeroBucketCount);
        }
        let bucket_nanos = bucket_duration.as_nanos();
        if bucket_nanos == 0 {
            return Err(ConfigError::ZeroBucketDuration);
        }
        debug!(?bucket_duration, buckets, prealloc, "created time window");

        Ok(Self {
            bucket_duration,
            bucket_nanos,
            buckets,
            clock,
            ring: Mutex::new(Ring {
                buckets: (0..buckets).map(|_| Vec::with_capacity(prealloc)).collect(),
                last_index: 0,
                last_offset: 0,
            }),
        })
    }

    /// Duration covered by a single bucket
    pub fn bucket_duration(&self) -> Duration {
        self.bucket_duration
    }

    /// Number of buckets in the ring
    pub fn bucket_count(&self) -> usize {
        self.buckets
    }

    /// Total span of the window
    pub fn span(&self) -> Duration {
        let buckets = u32::try_from(self.buckets).unwrap_or(u32::MAX);
        self.bucket_duration.saturating_mul(buckets)
    }

    /// The clock this window reads
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Map a reading of the clock to `(bucket index, ring offset)`
    pub(crate) fn select_bucket(&self, now: Duration, buckets: usize) -> (u64, usize) {
        let index = u64::try_from(now.as_nanos() / self.bucket_nanos).unwrap_or(u64::MAX);
        let offset = (index % buckets as u64) as usize;
        (index, offset)
    }

    /// Repair the ring for the current time and return the slot "now" maps to.
    fn touch(&self, ring: &mut Ring) -> usize {
        let (mut index, mut offset) = self.select_bucket(self.clock.now(), self.buckets);
        if index < ring.last_index {
            // Clock went backwards: keep writing to the last touched bucket.
            trace!(index, last_index = ring.last_index, "clock regression");
            index = ring.last_index;
            offset = ring.last_offset;
        }

        ring.keep_consistent(index, offset);
        ring.last_index = index;
        ring.last_offset = offset;
        offset
    }
}

impl Ring {
    fn keep_consistent(&mut self, index: u64, offset: usize) {
        let elapsed = index - self.last_index;
        if elapsed == 0 {
            return;
        }

        let buckets = self.buckets.len();
        if elapsed >= buckets as u64 {
            // More time has passed than the window spans.
            trace!(elapsed, "window stale, clearing all buckets");
            self.buckets.iter_mut().for_each(Vec::clear);
            return;
        }

        // Retire every slot after the last touched one, up to and including
        // the current one, in ring order.
        let distance = (offset + buckets - self.last_offset) % buckets;
        for step in 1..=distance {
            self.buckets[(self.last_offset + step) % buckets].clear();
        }
        trace!(retired = distance, "cleared stale buckets");
    }
}

impl<C: Clock> Feed for TimeWindow<C> {
    fn feed(&self, value: f64) {
        let mut ring = self.ring.lock();
        let offset = self.touch(&mut ring);
        ring.buckets[offset].push(value);
    }
}

impl<C: Clock> Iterate for TimeWindow<C> {
    /// Replays every live value, bucket by bucket in storage order.
    ///
    /// The window lock is held for the whole replay, so `visit` must not feed
    /// the same window.
    fn iterate(&self, visit: &mut dyn FnMut(f64)) {
        let mut ring = self.ring.lock();
        self.touch(&mut ring);
        for bucket in &ring.buckets {
            for &value in bucket {
                visit(value);
            }
        }
    }
}
