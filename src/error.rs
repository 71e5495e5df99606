//! Construction errors
//!
//! Windows, reducers and aggregators validate their parameters up front so a
//! bad configuration fails loudly instead of producing silently wrong rollups.
//! Once constructed, feeding and aggregating never fail.

use thiserror::Error;

/// Invalid parameters given to a window, reducer or aggregator
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// A count-bounded window needs room for at least one value
    #[error("window capacity must be positive")]
    ZeroCapacity,

    /// A time-bucketed window needs at least one bucket
    #[error("bucket count must be positive")]
    ZeroBucketCount,

    /// Bucket duration must be at least one nanosecond
    #[error("bucket duration must be positive")]
    ZeroBucketDuration,

    /// Percentiles are given on the 0..=100 scale
    #[error("percentile must be within [0, 100], got {percentile}")]
    PercentileOutOfRange { percentile: f64 },

    /// Percentage mapping needs finite bounds with `lower < upper`
    #[error("invalid range: lower {lower} must be finite and below upper {upper}")]
    InvalidRange { lower: f64, upper: f64 },
}

/// Result alias for fallible constructors
pub type Result<T> = core::result::Result<T, ConfigError>;

pub(crate) fn check_percentile(percentile: f64) -> Result<f64> {
    if (0.0..=100.0).contains(&percentile) {
        Ok(percentile)
    } else {
        Err(ConfigError::PercentileOutOfRange { percentile })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_percentile() {
        assert_eq!(check_percentile(0.0), Ok(0.0));
        assert_eq!(check_percentile(99.9), Ok(99.9));
        assert_eq!(check_percentile(100.0), Ok(100.0));
        assert!(check_percentile(-0.1).is_err());
        assert!(check_percentile(100.1).is_err());
        assert!(check_percentile(f64::NAN).is_err());
    }

    #[test]
    fn test_display() {
        let err = ConfigError::PercentileOutOfRange { percentile: 101.0 };
        assert_eq!(err.to_string(), "percentile must be within [0, 100], got 101");
    }
}
