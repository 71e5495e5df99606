//! Core traits for rolling windows and rollups
//!
//! Producers push samples through [`Feed`], consumers replay the current
//! contents of a window through [`Iterate`]. Reducers and aggregators only
//! ever see the [`Iterate`] side, so they never mutate the window and the
//! window never knows who is reading it.

use std::sync::Arc;

/// A rolled up value
///
/// When one rollup wraps another (a percentage mapping over a sum, say) the
/// wrapped result is kept in `source`, forming a provenance chain that ends at
/// the rollup that read the window directly.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Aggregate {
    /// Rollup that this value was derived from
    pub source: Option<Box<Aggregate>>,
    /// Label of the rollup that produced the value
    pub name: String,
    /// Rolled up value
    pub value: f64,
}

impl Aggregate {
    /// Create an unnamed aggregate with no source
    pub fn new(value: f64) -> Self {
        Self {
            source: None,
            name: String::new(),
            value,
        }
    }

    /// Create a named aggregate with no source
    pub fn named(name: impl Into<String>, value: f64) -> Self {
        Self {
            source: None,
            name: name.into(),
            value,
        }
    }

    /// Attach the aggregate this one was derived from
    pub fn with_source(mut self, source: Aggregate) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Walk the provenance chain, starting with `self`
    pub fn chain(&self) -> impl Iterator<Item = &Aggregate> {
        core::iter::successors(Some(self), |a| a.source.as_deref())
    }
}

/// Accepts samples into a rolling window
pub trait Feed {
    /// Add a value to the window
    fn feed(&self, value: f64);
}

/// Replays the current contents of a window
pub trait Iterate {
    /// Call `visit` once for every value currently in the window
    fn iterate(&self, visit: &mut dyn FnMut(f64));
}

/// A rolling window: something that can be fed and replayed
///
/// Implemented automatically for every type that is both [`Feed`] and
/// [`Iterate`] and safe to share across threads. Use it as the bound for code
/// that owns a window without caring which flavor it is:
///
/// ```
/// use std::sync::Arc;
/// use std::thread;
/// use rollstats::reduce;
/// use rollstats::traits::Window;
/// use rollstats::window::PointWindow;
///
/// fn record_in_background<W: Window + 'static>(window: &Arc<W>, samples: Vec<f64>) {
///     let window = Arc::clone(window);
///     thread::spawn(move || samples.into_iter().for_each(|v| window.feed(v)))
///         .join()
///         .unwrap();
/// }
///
/// let window = Arc::new(PointWindow::new(3).unwrap());
/// record_in_background(&window, vec![1.0, 2.0, 3.0]);
/// assert_eq!(reduce::sum(&*window), 6.0);
/// ```
pub trait Window: Feed + Iterate + Send + Sync {}

impl<T> Window for T where T: Feed + Iterate + Send + Sync + ?Sized {}

/// Compacts a window into a single [`Aggregate`]
pub trait Aggregator: Send + Sync {
    /// Compute the rolled up value
    fn aggregate(&self) -> Aggregate;
}

/// A named component
pub trait Namer {
    /// Label used when reporting this component
    fn name(&self) -> &str;
}

/// An annotated [`Aggregator`]
pub trait Rollup: Aggregator + Namer {}

impl<T> Rollup for T where T: Aggregator + Namer + ?Sized {}

macro_rules! forward_pointer_impls {
    ($($ptr:ty),*) => {$(
        impl<T: Feed + ?Sized> Feed for $ptr {
            #[inline]
            fn feed(&self, value: f64) {
                (**self).feed(value)
            }
        }

        impl<T: Iterate + ?Sized> Iterate for $ptr {
            #[inline]
            fn iterate(&self, visit: &mut dyn FnMut(f64)) {
                (**self).iterate(visit)
            }
        }

        impl<T: Aggregator + ?Sized> Aggregator for $ptr {
            #[inline]
            fn aggregate(&self) -> Aggregate {
                (**self).aggregate()
            }
        }
    )*};
}

forward_pointer_impls!(&T, Box<T>, Arc<T>);

impl Iterate for [f64] {
    fn iterate(&self, visit: &mut dyn FnMut(f64)) {
        for &value in self {
            visit(value);
        }
    }
}

impl Iterate for Vec<f64> {
    fn iterate(&self, visit: &mut dyn FnMut(f64)) {
        self.as_slice().iterate(visit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregate_chain() {
        let sum = Aggregate::named("sum", 10.0);
        let pct = Aggregate::named("pct", 0.5).with_source(sum.clone());
        let names: Vec<&str> = pct.chain().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["pct", "sum"]);
        assert_eq!(pct.source.as_deref(), Some(&sum));
    }

    #[test]
    fn test_slice_iterate_visits_in_order() {
        let values = vec![3.0, 1.0, 2.0];
        let mut seen = Vec::new();
        values.iterate(&mut |v| seen.push(v));
        assert_eq!(seen, values);
    }

    #[test]
    fn test_pointer_forwarding() {
        let values: Arc<Vec<f64>> = Arc::new(vec![1.0, 2.0]);
        let boxed: Box<dyn Iterate> = Box::new(Arc::clone(&values));
        let mut total = 0.0;
        (&boxed).iterate(&mut |v| total += v);
        assert_eq!(total, 3.0);
    }
}
