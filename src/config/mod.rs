//! Configuration for buffers and pools.
//!
//! This module provides types to configure allocation behavior:
//!
//! - [`BufferConfig`] - Initial capacity and growth granularity of a [`Buffer`](crate::Buffer)
//! - [`PoolConfig`] - Sizing and calibration behavior of a [`BufferPool`](crate::BufferPool)
//!
//! # Example
//!
//! ```
//! use bytepool::{BufferConfig, PoolConfig};
//!
//! // A buffer that grows in 16 KiB steps
//! let config = BufferConfig::new(1024, 16 * 1024)?;
//!
//! // A pool with calibration disabled
//! let config = PoolConfig::new(4096)?.with_dynamic(false);
//!
//! # Ok::<(), bytepool::BufferError>(())
//! ```

use crate::error::BufferError;

/// Default growth granularity (one 4 KiB page).
pub const DEFAULT_GROWTH_HINT: usize = 4 * 1024;

/// Smallest tracked buffer size in the pool histogram (64 bytes).
pub const MIN_HINT: usize = 1 << MIN_BIT_SIZE;

/// Number of logarithmic histogram buckets.
pub const STEPS: usize = 20;

/// Size of the top histogram bucket (32 MiB).
pub const MAX_SIZE: usize = 1 << (MIN_BIT_SIZE + STEPS - 1);

/// Releases recorded between two calibrations.
pub const DEFAULT_CALIBRATE_THRESHOLD: u64 = 42_000;

/// Share of observed releases the max poolable size must cover.
pub const DEFAULT_MAX_PERCENTILE: f64 = 0.95;

/// Default upper bound on idle buffers held by a pool.
pub const DEFAULT_MAX_IDLE: usize = 1024;

pub(crate) const MIN_BIT_SIZE: usize = 6;

/// Configuration for a single [`Buffer`](crate::Buffer).
///
/// # Example
///
/// ```
/// use bytepool::{Buffer, BufferConfig};
///
/// let config = BufferConfig::default().with_capacity(100);
/// let buf = Buffer::with_config(config);
/// assert_eq!(buf.capacity(), 4096);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferConfig {
    /// Initial capacity hint, rounded up to the growth hint.
    capacity: usize,

    /// Growth granularity in bytes.
    growth_hint: usize,
}

impl BufferConfig {
    /// Creates a buffer configuration.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::InvalidConfig`] if `growth_hint` is zero or not
    /// a power of two.
    pub fn new(capacity: usize, growth_hint: usize) -> Result<Self, BufferError> {
        if !growth_hint.is_power_of_two() {
            return Err(BufferError::InvalidConfig {
                message: "growth hint must be a non-zero power of 2",
            });
        }

        Ok(Self {
            capacity,
            growth_hint,
        })
    }

    /// Sets the initial capacity hint.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the growth granularity.
    ///
    /// Note: This does not validate the configuration. Use
    /// [`BufferConfig::validate`] to check if the configuration is valid.
    pub fn with_growth_hint(mut self, growth_hint: usize) -> Self {
        self.growth_hint = growth_hint;
        self
    }

    /// Returns the initial capacity hint.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the growth granularity.
    pub fn growth_hint(&self) -> usize {
        self.growth_hint
    }

    /// Validates the current configuration.
    pub fn validate(&self) -> Result<(), BufferError> {
        Self::new(self.capacity, self.growth_hint).map(|_| ())
    }
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            capacity: 0,
            growth_hint: DEFAULT_GROWTH_HINT,
        }
    }
}

/// Configuration for a [`BufferPool`](crate::BufferPool).
///
/// The pool starts out handing out buffers of `default_hint` bytes. When
/// `dynamic` is set, every `calibrate_threshold` releases the pool recomputes
/// its default size from the most common released capacity, and its maximum
/// poolable size from the capacities covering `max_percentile` of releases.
///
/// # Example
///
/// ```
/// use bytepool::PoolConfig;
///
/// let config = PoolConfig::new(512)?
///     .with_calibrate_threshold(1000)
///     .with_max_idle(64);
/// assert_eq!(config.default_hint(), 512);
/// # Ok::<(), bytepool::BufferError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoolConfig {
    default_hint: usize,
    growth_hint: usize,
    dynamic: bool,
    calibrate_threshold: u64,
    max_percentile: f64,
    max_idle: usize,
}

impl PoolConfig {
    /// Creates a pool configuration with the given starting buffer size.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::InvalidConfig`] if `default_hint` lies outside
    /// `[MIN_HINT, MAX_SIZE]`.
    pub fn new(default_hint: usize) -> Result<Self, BufferError> {
        Self {
            default_hint,
            ..Self::default()
        }
        .checked()
    }

    /// Sets the starting buffer size.
    ///
    /// Note: This does not validate the configuration. Use
    /// [`PoolConfig::validate`] to check if the configuration is valid.
    pub fn with_default_hint(mut self, default_hint: usize) -> Self {
        self.default_hint = default_hint;
        self
    }

    /// Sets the growth granularity of buffers created by the pool.
    pub fn with_growth_hint(mut self, growth_hint: usize) -> Self {
        self.growth_hint = growth_hint;
        self
    }

    /// Enables or disables calibration.
    pub fn with_dynamic(mut self, dynamic: bool) -> Self {
        self.dynamic = dynamic;
        self
    }

    /// Sets how many releases are observed between calibrations.
    pub fn with_calibrate_threshold(mut self, threshold: u64) -> Self {
        self.calibrate_threshold = threshold;
        self
    }

    /// Sets the share of releases the max poolable size must cover.
    pub fn with_max_percentile(mut self, percentile: f64) -> Self {
        self.max_percentile = percentile;
        self
    }

    /// Sets the maximum number of idle buffers kept by the pool.
    pub fn with_max_idle(mut self, max_idle: usize) -> Self {
        self.max_idle = max_idle;
        self
    }

    /// Returns the starting buffer size.
    pub fn default_hint(&self) -> usize {
        self.default_hint
    }

    /// Returns the growth granularity of pooled buffers.
    pub fn growth_hint(&self) -> usize {
        self.growth_hint
    }

    /// Returns whether calibration is enabled.
    pub fn dynamic(&self) -> bool {
        self.dynamic
    }

    /// Returns the number of releases between calibrations.
    pub fn calibrate_threshold(&self) -> u64 {
        self.calibrate_threshold
    }

    /// Returns the coverage target of the max poolable size.
    pub fn max_percentile(&self) -> f64 {
        self.max_percentile
    }

    /// Returns the idle buffer limit.
    pub fn max_idle(&self) -> usize {
        self.max_idle
    }

    /// Validates the current configuration.
    ///
    /// # Example
    ///
    /// ```
    /// use bytepool::PoolConfig;
    ///
    /// let config = PoolConfig::default().with_max_percentile(1.5);
    /// assert!(config.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<(), BufferError> {
        self.checked().map(|_| ())
    }

    fn checked(self) -> Result<Self, BufferError> {
        if self.default_hint < MIN_HINT || self.default_hint > MAX_SIZE {
            return Err(BufferError::InvalidConfig {
                message: "default hint must lie between MIN_HINT and MAX_SIZE",
            });
        }

        if !self.growth_hint.is_power_of_two() {
            return Err(BufferError::InvalidConfig {
                message: "growth hint must be a non-zero power of 2",
            });
        }

        if self.calibrate_threshold == 0 {
            return Err(BufferError::InvalidConfig {
                message: "calibrate threshold must be non-zero",
            });
        }

        if !(self.max_percentile > 0.0 && self.max_percentile <= 1.0) {
            return Err(BufferError::InvalidConfig {
                message: "max percentile must lie in (0, 1]",
            });
        }

        if self.max_idle == 0 {
            return Err(BufferError::InvalidConfig {
                message: "max idle must be non-zero",
            });
        }

        Ok(self)
    }

    pub(crate) fn buffer_config(&self, capacity: usize) -> BufferConfig {
        BufferConfig {
            capacity,
            growth_hint: self.growth_hint,
        }
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            default_hint: MIN_HINT,
            growth_hint: DEFAULT_GROWTH_HINT,
            dynamic: true,
            calibrate_threshold: DEFAULT_CALIBRATE_THRESHOLD,
            max_percentile: DEFAULT_MAX_PERCENTILE,
            max_idle: DEFAULT_MAX_IDLE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants() {
        assert_eq!(MIN_HINT, 64);
        assert_eq!(MAX_SIZE, 32 * 1024 * 1024);
    }

    #[test]
    fn test_default_buffer_config() {
        let config = BufferConfig::default();
        assert_eq!(config.capacity(), 0);
        assert_eq!(config.growth_hint(), DEFAULT_GROWTH_HINT);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_growth_hint() {
        assert!(BufferConfig::new(0, 0).is_err());
        assert!(BufferConfig::new(0, 3000).is_err());
        assert!(BufferConfig::default().with_growth_hint(100).validate().is_err());
    }

    #[test]
    fn test_pool_builder_pattern() {
        let config = PoolConfig::default()
            .with_default_hint(1024)
            .with_dynamic(false)
            .with_calibrate_threshold(10)
            .with_max_percentile(0.5)
            .with_max_idle(8);

        assert_eq!(config.default_hint(), 1024);
        assert!(!config.dynamic());
        assert_eq!(config.calibrate_threshold(), 10);
        assert_eq!(config.max_percentile(), 0.5);
        assert_eq!(config.max_idle(), 8);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_pool_config() {
        assert!(PoolConfig::new(MIN_HINT - 1).is_err());
        assert!(PoolConfig::new(MAX_SIZE + 1).is_err());
        assert!(PoolConfig::default().with_calibrate_threshold(0).validate().is_err());
        assert!(PoolConfig::default().with_max_percentile(0.0).validate().is_err());
        assert!(PoolConfig::default().with_max_idle(0).validate().is_err());
    }
}
