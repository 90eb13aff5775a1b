//! Lock-free capacity histogram and the calibration math.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::config::{MIN_BIT_SIZE, MIN_HINT, STEPS};

/// Call counters for logarithmic capacity buckets.
///
/// Bucket `i` counts capacities in `(MIN_HINT << (i - 1), MIN_HINT << i]`;
/// the first bucket also takes everything below, the last everything above.
#[derive(Debug, Default)]
pub(crate) struct Histogram {
    calls: [AtomicU64; STEPS],
}

/// Tuning parameters derived from one window of observations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Calibration {
    pub(crate) default_hint: usize,
    pub(crate) max_poolable: usize,
    pub(crate) calls: u64,
}

impl Histogram {
    /// Bucket index for a buffer of `capacity` bytes.
    pub(crate) fn index(capacity: usize) -> usize {
        let n = capacity.saturating_sub(1) >> MIN_BIT_SIZE;
        let idx = (usize::BITS - n.leading_zeros()) as usize;
        idx.min(STEPS - 1)
    }

    /// Upper bound of bucket `idx`.
    pub(crate) fn bucket_size(idx: usize) -> usize {
        MIN_HINT << idx
    }

    pub(crate) fn record(&self, capacity: usize) {
        self.calls[Self::index(capacity)].fetch_add(1, Ordering::Relaxed);
    }

    /// Atomically takes every counter, leaving zeros behind.
    ///
    /// Records racing with the drain land in the next window.
    pub(crate) fn drain(&self) -> [u64; STEPS] {
        std::array::from_fn(|i| self.calls[i].swap(0, Ordering::Relaxed))
    }
}

/// Derives new tuning parameters from drained bucket counts.
///
/// The default hint is the most frequent bucket. The max poolable size is the
/// largest bucket among the most frequent ones that together cover
/// `percentile` of all calls. Returns `None` for an empty window.
pub(crate) fn calibrate(counts: &[u64; STEPS], percentile: f64) -> Option<Calibration> {
    let total: u64 = counts.iter().sum();
    if total == 0 {
        return None;
    }

    let mut buckets: Vec<(u64, usize)> = counts
        .iter()
        .enumerate()
        .map(|(i, &calls)| (calls, Histogram::bucket_size(i)))
        .collect();
    // Stable, so ties keep the smaller bucket first.
    buckets.sort_by(|a, b| b.0.cmp(&a.0));

    let default_hint = buckets[0].1;
    let mut max_poolable = default_hint;

    let max_sum = (total as f64 * percentile) as u64;
    let mut sum = 0u64;
    for &(calls, size) in &buckets {
        if sum > max_sum || calls == 0 {
            break;
        }
        sum += calls;
        max_poolable = max_poolable.max(size);
    }

    Some(Calibration {
        default_hint,
        max_poolable,
        calls: total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index() {
        assert_eq!(Histogram::index(0), 0);
        assert_eq!(Histogram::index(1), 0);
        assert_eq!(Histogram::index(64), 0);
        assert_eq!(Histogram::index(65), 1);
        assert_eq!(Histogram::index(128), 1);
        assert_eq!(Histogram::index(129), 2);
        assert_eq!(Histogram::index(4096), 6);
        assert_eq!(Histogram::index(4097), 7);
        assert_eq!(Histogram::index(32 * 1024 * 1024), STEPS - 1);
        assert_eq!(Histogram::index(usize::MAX), STEPS - 1);
    }

    #[test]
    fn test_bucket_size_matches_index() {
        for idx in 0..STEPS {
            assert_eq!(Histogram::index(Histogram::bucket_size(idx)), idx);
        }
    }

    #[test]
    fn test_record_and_drain() {
        let h = Histogram::default();
        h.record(4096);
        h.record(4096);
        h.record(100);

        let counts = h.drain();
        assert_eq!(counts[6], 2);
        assert_eq!(counts[1], 1);
        assert_eq!(h.drain(), [0; STEPS]);
    }

    #[test]
    fn test_calibrate_empty_window() {
        assert_eq!(calibrate(&[0; STEPS], 0.95), None);
    }

    #[test]
    fn test_calibrate_single_bucket() {
        let mut counts = [0; STEPS];
        counts[6] = 42_001;
        let c = calibrate(&counts, 0.95).unwrap();
        assert_eq!(c.default_hint, 4096);
        assert_eq!(c.max_poolable, 4096);
        assert_eq!(c.calls, 42_001);
    }

    #[test]
    fn test_calibrate_sheds_rare_outliers() {
        let mut counts = [0; STEPS];
        counts[2] = 900; // 256 bytes
        counts[4] = 90; // 1 KiB
        counts[15] = 10; // 2 MiB
        let c = calibrate(&counts, 0.95).unwrap();
        assert_eq!(c.default_hint, 256);
        assert_eq!(c.max_poolable, 1024);
    }

    #[test]
    fn test_calibrate_includes_common_large_buckets() {
        let mut counts = [0; STEPS];
        counts[0] = 500;
        counts[10] = 400;
        counts[3] = 100;
        let c = calibrate(&counts, 0.95).unwrap();
        assert_eq!(c.default_hint, 64);
        assert_eq!(c.max_poolable, 64 << 10);
    }
}
