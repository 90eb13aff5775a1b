//! Self-calibrating pool of reusable buffers.

use std::iter;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

use crossbeam_queue::ArrayQueue;
use tracing::{debug, trace};

use crate::buffer::Buffer;
use crate::config::{MAX_SIZE, PoolConfig};
use crate::pool::guard::PooledBuffer;
use crate::pool::histogram::{self, Histogram};
use crate::pool::local::{self, LOCAL_CAPACITY};

static NEXT_POOL_ID: AtomicU64 = AtomicU64::new(0);

/// A thread-safe pool of [`Buffer`]s that tunes its allocation sizes.
///
/// Every successful release records the buffer's capacity. After enough
/// releases the pool recalibrates: new buffers are sized after the most
/// common capacity, and buffers larger than what covers the bulk of traffic
/// are no longer kept.
///
/// Idle buffers are reused most-recent-first. Each thread keeps a small stack
/// of the buffers it released last; overflow goes to a shared lock-free list
/// that any thread can acquire from.
///
/// Acquire and release never block. Counters are atomics; calibration is
/// guarded by a latch, and a thread that loses the race skips it.
///
/// # Example
///
/// ```
/// use bytepool::{BufferPool, PoolConfig};
///
/// let pool = BufferPool::new(PoolConfig::default());
///
/// let mut buf = pool.acquire();
/// buf.write(b"request")?;
/// assert_eq!(buf.peek(16), b"request");
/// pool.release(buf);
///
/// assert_eq!(pool.idle(), 1);
/// # Ok::<(), bytepool::BufferError>(())
/// ```
#[derive(Debug)]
pub struct BufferPool {
    id: u64,
    free: ArrayQueue<Buffer>,
    histogram: Histogram,
    window: AtomicU64,
    calibrating: AtomicBool,
    default_hint: AtomicUsize,
    max_poolable: AtomicUsize,
    config: PoolConfig,
}

impl BufferPool {
    /// Creates a pool.
    ///
    /// The configuration is used as given; see [`PoolConfig::validate`].
    pub fn new(config: PoolConfig) -> Self {
        Self {
            id: NEXT_POOL_ID.fetch_add(1, Ordering::Relaxed),
            free: ArrayQueue::new(config.max_idle().max(1)),
            histogram: Histogram::default(),
            window: AtomicU64::new(0),
            calibrating: AtomicBool::new(false),
            default_hint: AtomicUsize::new(config.default_hint()),
            max_poolable: AtomicUsize::new(MAX_SIZE),
            config,
        }
    }

    /// The process-wide pool, built on first use with [`PoolConfig::default`].
    pub fn global() -> &'static BufferPool {
        static GLOBAL: OnceLock<BufferPool> = OnceLock::new();
        GLOBAL.get_or_init(|| BufferPool::new(PoolConfig::default()))
    }

    /// Takes an idle buffer, or creates one of the current default size.
    ///
    /// The calling thread's most recently released buffer is preferred.
    /// Idle buffers larger than the current [`BufferPool::max_poolable`] are
    /// dropped on the way.
    pub fn acquire(&self) -> Buffer {
        let max = self.max_poolable.load(Ordering::Relaxed);
        let idle = iter::from_fn(|| local::pop(self.id))
            .chain(iter::from_fn(|| self.free.pop()));

        for buf in idle {
            let capacity = buf.capacity();
            if max == 0 || capacity <= max {
                return buf;
            }
            trace!(capacity, max_poolable = max, "dropping stale oversized buffer");
        }

        let capacity = self.default_hint.load(Ordering::Relaxed);
        Buffer::with_config(self.config.buffer_config(capacity))
    }

    /// Like [`BufferPool::acquire`], wrapped in a guard that releases the
    /// buffer back to this pool when dropped.
    pub fn take(&self) -> PooledBuffer<'_> {
        PooledBuffer::new(self, self.acquire())
    }

    /// Hands a buffer back to the pool.
    ///
    /// A buffer with an outstanding borrow cannot be reset and is dropped. A
    /// buffer larger than [`BufferPool::max_poolable`] is dropped as well.
    ///
    /// The buffer goes onto the calling thread's stack. When that stack is
    /// full its oldest entry moves to the shared list, and is dropped if the
    /// shared list already holds `max_idle` buffers.
    pub fn release(&self, mut buf: Buffer) {
        if buf.reset().is_err() {
            trace!("dropping borrowed buffer on release");
            return;
        }

        let capacity = buf.capacity();

        if self.config.dynamic() {
            self.histogram.record(capacity);
            let window = self.window.fetch_add(1, Ordering::Relaxed) + 1;
            if window > self.config.calibrate_threshold() {
                self.calibrate();
            }
        }

        let max = self.max_poolable.load(Ordering::Relaxed);
        if max != 0 && capacity > max {
            trace!(capacity, max_poolable = max, "dropping oversized buffer");
            return;
        }

        let limit = LOCAL_CAPACITY.min(self.config.max_idle());
        if let Some(spilled) = local::push(self.id, buf, limit) {
            // A full shared list evicts the spilled buffer.
            let _ = self.free.push(spilled);
        }
    }

    /// Recomputes the default hint and max poolable size from the releases
    /// observed since the last calibration.
    ///
    /// Runs at most once at a time; concurrent callers return immediately.
    pub fn calibrate(&self) {
        if self
            .calibrating
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            return;
        }

        self.window.store(0, Ordering::Relaxed);
        let counts = self.histogram.drain();

        if let Some(c) = histogram::calibrate(&counts, self.config.max_percentile()) {
            self.default_hint.store(c.default_hint, Ordering::Relaxed);
            self.max_poolable.store(c.max_poolable, Ordering::Relaxed);
            debug!(
                default_hint = c.default_hint,
                max_poolable = c.max_poolable,
                calls = c.calls,
                "buffer pool calibrated"
            );
        }

        self.calibrating.store(false, Ordering::Release);
    }

    /// Capacity requested for newly created buffers.
    pub fn default_hint(&self) -> usize {
        self.default_hint.load(Ordering::Relaxed)
    }

    /// Largest capacity the pool keeps; zero means unbounded.
    pub fn max_poolable(&self) -> usize {
        self.max_poolable.load(Ordering::Relaxed)
    }

    /// Number of idle buffers the calling thread can acquire: its own stack
    /// plus the shared list.
    pub fn idle(&self) -> usize {
        local::len(self.id) + self.free.len()
    }

    /// The configuration this pool was built with.
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }
}

impl Default for BufferPool {
    fn default() -> Self {
        Self::new(PoolConfig::default())
    }
}

impl Drop for BufferPool {
    fn drop(&mut self) {
        // Other threads release theirs when they exit.
        local::purge(self.id);
    }
}
