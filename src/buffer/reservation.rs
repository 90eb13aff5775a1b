//! Scoped borrow of a buffer's free region.

use std::ops::{Deref, DerefMut};

use crate::buffer::Buffer;
use crate::error::BufferError;

/// A borrowed region of a [`Buffer`], committed with [`Reservation::commit`].
///
/// While a `Reservation` is alive it holds the buffer mutably, so no other
/// operation can touch the buffer until the region is committed or dropped.
/// Dropping it without committing abandons the region.
///
/// # Example
///
/// ```
/// use std::io::Read;
/// use bytepool::Buffer;
///
/// let mut socket = &b"payload"[..];
/// let mut buf = Buffer::new();
///
/// let mut region = buf.reserve(64)?;
/// let n = socket.read(&mut region)?;
/// region.commit(n)?;
///
/// assert_eq!(buf.peek(64), b"payload");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct Reservation<'a> {
    buf: &'a mut Buffer,
}

impl Buffer {
    /// Borrows `size` bytes behind a guard instead of a raw slice.
    ///
    /// Fails under the same conditions as [`Buffer::borrow`].
    pub fn reserve(&mut self, size: usize) -> Result<Reservation<'_>, BufferError> {
        self.borrow(size)?;
        Ok(Reservation { buf: self })
    }
}

impl Reservation<'_> {
    /// Commits the first `used` bytes of the region to the readable data.
    ///
    /// # Errors
    ///
    /// [`BufferError::ReturnExceedsBorrow`] if `used` exceeds the region; the
    /// whole region is then abandoned.
    pub fn commit(mut self, used: usize) -> Result<(), BufferError> {
        self.buf.give_back(used)
    }
}

impl Deref for Reservation<'_> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.buf.borrowed()
    }
}

impl DerefMut for Reservation<'_> {
    fn deref_mut(&mut self) -> &mut [u8] {
        self.buf.borrowed_mut()
    }
}

impl Drop for Reservation<'_> {
    fn drop(&mut self) {
        // No-op after a successful commit.
        let _ = self.buf.give_back(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserve_commit() {
        let mut buf = Buffer::new();
        buf.write(b"ab").unwrap();

        let mut region = buf.reserve(4).unwrap();
        assert_eq!(region.len(), 4);
        region[..2].copy_from_slice(b"cd");
        region.commit(2).unwrap();

        assert!(!buf.borrowing());
        assert_eq!(buf.peek(10), b"abcd");
    }

    #[test]
    fn test_drop_abandons_region() {
        let mut buf = Buffer::new();
        {
            let mut region = buf.reserve(8).unwrap();
            region.fill(b'x');
        }
        assert!(!buf.borrowing());
        assert!(buf.is_empty());
        buf.write(b"ok").unwrap();
        assert_eq!(buf.peek(10), b"ok");
    }

    #[test]
    fn test_commit_too_much_abandons() {
        let mut buf = Buffer::new();
        let region = buf.reserve(2).unwrap();
        assert!(region.commit(3).is_err());
        assert!(!buf.borrowing());
        assert!(buf.is_empty());
    }

    #[test]
    fn test_reserve_zero() {
        let mut buf = Buffer::new();
        assert!(matches!(buf.reserve(0), Err(BufferError::ZeroSizeBorrow)));
    }
}
