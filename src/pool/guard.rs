//! RAII handle that returns a buffer to its pool.

use std::mem::{self, ManuallyDrop};
use std::ops::{Deref, DerefMut};

use crate::buffer::Buffer;
use crate::pool::BufferPool;

/// A [`Buffer`] on loan from a [`BufferPool`].
///
/// Dereferences to the buffer and releases it back to the pool on drop.
///
/// # Example
///
/// ```
/// use bytepool::BufferPool;
///
/// let pool = BufferPool::default();
/// {
///     let mut buf = pool.take();
///     buf.write(b"scratch")?;
/// }
/// assert_eq!(pool.idle(), 1);
/// # Ok::<(), bytepool::BufferError>(())
/// ```
#[derive(Debug)]
pub struct PooledBuffer<'a> {
    pool: &'a BufferPool,
    buf: Buffer,
}

impl<'a> PooledBuffer<'a> {
    pub(crate) fn new(pool: &'a BufferPool, buf: Buffer) -> Self {
        Self { pool, buf }
    }

    /// Detaches the buffer from the pool; it will not be released.
    pub fn into_inner(self) -> Buffer {
        let mut this = ManuallyDrop::new(self);
        mem::take(&mut this.buf)
    }
}

impl Deref for PooledBuffer<'_> {
    type Target = Buffer;

    fn deref(&self) -> &Buffer {
        &self.buf
    }
}

impl DerefMut for PooledBuffer<'_> {
    fn deref_mut(&mut self) -> &mut Buffer {
        &mut self.buf
    }
}

impl Drop for PooledBuffer<'_> {
    fn drop(&mut self) {
        self.pool.release(mem::take(&mut self.buf));
    }
}
