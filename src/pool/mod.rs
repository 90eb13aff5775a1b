//! Adaptive buffer pooling.
//!
//! - [`BufferPool`] - Per-thread LIFO stacks over a lock-free shared list, with workload calibration
//! - [`PooledBuffer`] - Guard releasing a buffer on drop
//!
//! [`acquire`] and [`release`] work on the process-wide
//! [`BufferPool::global`] instance.

mod adaptive;
mod guard;
mod histogram;
mod local;

pub use adaptive::BufferPool;
pub use guard::PooledBuffer;

use crate::buffer::Buffer;

/// Takes a buffer from the process-wide pool.
pub fn acquire() -> Buffer {
    BufferPool::global().acquire()
}

/// Returns a buffer to the process-wide pool.
pub fn release(buf: Buffer) {
    BufferPool::global().release(buf)
}
