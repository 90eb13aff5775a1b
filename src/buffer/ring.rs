//! The growable buffer with read, write and allocation cursors.

use std::fmt;
use std::io::{self, Read, Write};

use bytes::Bytes;
use tracing::trace;

use crate::config::BufferConfig;
use crate::error::BufferError;
use crate::util::{self, MAX_CAPACITY};

/// A reusable, growable byte buffer.
///
/// The backing store is one contiguous allocation split by three cursors:
///
/// ```text
///  0        read       write      alloc      capacity
///  |consumed |  unread  | borrowed |   free    |
/// ```
///
/// Bytes are appended at the write cursor and consumed from the read cursor.
/// A region past the write cursor can be [borrowed](Buffer::borrow), filled
/// in place (for example straight from a socket) and then committed with
/// [`give_back`](Buffer::give_back), avoiding an intermediate copy.
///
/// Growth rounds up to a multiple of the growth hint. Before allocating, the
/// buffer first tries to reclaim consumed space by moving the unread region to
/// the front.
///
/// # Example
///
/// ```
/// use bytepool::Buffer;
///
/// let mut buf = Buffer::new();
/// buf.write(b"0123456789")?;
/// assert_eq!(buf.peek(5), b"01234");
///
/// buf.discard(5);
/// assert_eq!(&buf.next(5)?[..], b"56789");
/// assert!(buf.is_empty());
/// # Ok::<(), bytepool::BufferError>(())
/// ```
#[derive(Clone)]
pub struct Buffer {
    data: Vec<u8>,
    r: usize,
    w: usize,
    a: usize,
    growth_hint: usize,
}

impl Buffer {
    /// Creates an empty buffer. Nothing is allocated until the first write.
    pub fn new() -> Self {
        Self::with_config(BufferConfig::default())
    }

    /// Creates a buffer with room for at least `capacity` bytes.
    ///
    /// The capacity is rounded up to the default growth hint.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_config(BufferConfig::default().with_capacity(capacity))
    }

    /// Creates a buffer from a configuration.
    ///
    /// A capacity hint too large to represent is ignored and the buffer starts
    /// unallocated.
    pub fn with_config(config: BufferConfig) -> Self {
        let growth_hint = config.growth_hint().max(1);
        let data = match util::round_up(config.capacity(), growth_hint) {
            Some(capacity) => vec![0; capacity],
            None => Vec::new(),
        };

        Self {
            data,
            r: 0,
            w: 0,
            a: 0,
            growth_hint,
        }
    }

    /// Number of unread bytes.
    pub fn len(&self) -> usize {
        self.w - self.r
    }

    /// Returns `true` if there are no unread bytes.
    pub fn is_empty(&self) -> bool {
        self.w == self.r
    }

    /// Size of the backing store.
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Allocation granularity of this buffer.
    pub fn growth_hint(&self) -> usize {
        self.growth_hint
    }

    /// Returns `true` while a borrowed region is outstanding.
    pub fn borrowing(&self) -> bool {
        self.a != self.w
    }

    pub(crate) fn unread(&self) -> &[u8] {
        &self.data[self.r..self.w]
    }

    pub(crate) fn borrowed(&self) -> &[u8] {
        &self.data[self.w..self.a]
    }

    pub(crate) fn borrowed_mut(&mut self) -> &mut [u8] {
        &mut self.data[self.w..self.a]
    }

    // ------------------------------------------------------------------
    // Read side
    // ------------------------------------------------------------------

    /// Returns up to `n` unread bytes without consuming them.
    ///
    /// The slice borrows the buffer, so it cannot outlive the next mutation.
    /// Use [`Buffer::clone_bytes`] or [`Buffer::next`] to keep data around.
    pub fn peek(&self, n: usize) -> &[u8] {
        let n = n.min(self.len());
        &self.data[self.r..self.r + n]
    }

    /// Consumes up to `n` unread bytes into an owned [`Bytes`].
    ///
    /// # Errors
    ///
    /// [`BufferError::EndOfData`] if the buffer is empty. A request larger
    /// than [`Buffer::len`] is clamped rather than rejected.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self, n: usize) -> Result<Bytes, BufferError> {
        if self.is_empty() {
            return Err(BufferError::EndOfData);
        }

        let n = n.min(self.len());
        let out = Bytes::copy_from_slice(&self.data[self.r..self.r + n]);
        self.r += n;
        self.shrink();
        Ok(out)
    }

    /// Copies unread bytes into `dst`, returning how many were copied.
    ///
    /// An empty `dst` is a no-op returning `Ok(0)`.
    ///
    /// # Errors
    ///
    /// [`BufferError::EndOfData`] if the buffer is empty.
    pub fn read(&mut self, dst: &mut [u8]) -> Result<usize, BufferError> {
        if dst.is_empty() {
            return Ok(0);
        }
        if self.is_empty() {
            return Err(BufferError::EndOfData);
        }

        let n = dst.len().min(self.len());
        dst[..n].copy_from_slice(&self.data[self.r..self.r + n]);
        self.r += n;
        self.shrink();
        Ok(n)
    }

    /// Consumes a single byte.
    pub fn read_byte(&mut self) -> Result<u8, BufferError> {
        if self.is_empty() {
            return Err(BufferError::EndOfData);
        }

        let b = self.data[self.r];
        self.r += 1;
        self.shrink();
        Ok(b)
    }

    /// Consumes bytes up to and including the first `delim`.
    ///
    /// When `delim` does not occur, every unread byte is returned and no error
    /// is raised. Callers tell a complete line from a partial one by checking
    /// whether the result ends with `delim`.
    ///
    /// # Errors
    ///
    /// [`BufferError::EndOfData`] if the buffer was already empty.
    ///
    /// # Example
    ///
    /// ```
    /// use bytepool::Buffer;
    ///
    /// let mut buf = Buffer::new();
    /// buf.write(b"ab,cd")?;
    /// assert_eq!(&buf.read_bytes(b',')?[..], b"ab,");
    /// assert_eq!(&buf.read_bytes(b',')?[..], b"cd");
    /// assert!(buf.read_bytes(b',').is_err());
    /// # Ok::<(), bytepool::BufferError>(())
    /// ```
    pub fn read_bytes(&mut self, delim: u8) -> Result<Bytes, BufferError> {
        if self.is_empty() {
            return Err(BufferError::EndOfData);
        }

        let end = match self.index(delim) {
            Some(i) => self.r + i + 1,
            None => self.w,
        };
        let line = Bytes::copy_from_slice(&self.data[self.r..end]);
        self.r = end;
        self.shrink();
        Ok(line)
    }

    /// Offset of the first `delim` relative to the read cursor.
    ///
    /// Returns `None` when the byte is absent, including on an empty buffer.
    pub fn index(&self, delim: u8) -> Option<usize> {
        self.unread().iter().position(|&b| b == delim)
    }

    /// Skips up to `n` unread bytes, returning how many were skipped.
    pub fn discard(&mut self, n: usize) -> usize {
        let n = n.min(self.len());
        self.r += n;
        self.shrink();
        n
    }

    /// Returns an owned copy of every unread byte without consuming them.
    ///
    /// Unlike [`Buffer::peek`], the result stays valid after the buffer is
    /// mutated, reset or recycled.
    pub fn clone_bytes(&self) -> Bytes {
        Bytes::copy_from_slice(self.unread())
    }

    // ------------------------------------------------------------------
    // Write side
    // ------------------------------------------------------------------

    /// Appends `src`, growing the backing store as needed.
    ///
    /// # Errors
    ///
    /// - [`BufferError::WriteBeforeCommit`] while a region is borrowed
    /// - [`BufferError::TooLarge`] if the buffer cannot grow enough
    pub fn write(&mut self, src: &[u8]) -> Result<usize, BufferError> {
        self.ensure_writable()?;
        if src.is_empty() {
            return Ok(0);
        }

        self.reserve_free(src.len())?;
        self.data[self.w..self.w + src.len()].copy_from_slice(src);
        self.w += src.len();
        self.a = self.w;
        Ok(src.len())
    }

    /// Appends a single byte.
    pub fn write_byte(&mut self, b: u8) -> Result<(), BufferError> {
        self.write(&[b]).map(|_| ())
    }

    /// Appends the UTF-8 bytes of `s`.
    pub fn write_str(&mut self, s: &str) -> Result<usize, BufferError> {
        self.write(s.as_bytes())
    }

    /// Replaces the unread region with `src`.
    ///
    /// Bytes already consumed are left alone; the write cursor is rewound to
    /// the read cursor and `src` is written from there.
    pub fn set(&mut self, src: &[u8]) -> Result<usize, BufferError> {
        self.ensure_writable()?;
        self.w = self.r;
        self.a = self.w;
        self.shrink();
        self.write(src)
    }

    /// Replaces the unread region with the UTF-8 bytes of `s`.
    pub fn set_str(&mut self, s: &str) -> Result<usize, BufferError> {
        self.set(s.as_bytes())
    }

    /// Reads from `source` until it reports end-of-data (`Ok(0)`).
    ///
    /// The buffer grows by its growth hint each time it runs out of room.
    /// Returns the number of bytes read. Errors other than
    /// [`io::ErrorKind::Interrupted`] stop the loop and are returned as
    /// [`BufferError::Io`]; bytes read before the error stay in the buffer.
    pub fn read_from<R: Read>(&mut self, source: R) -> Result<usize, BufferError> {
        let chunk = self.growth_hint;
        self.read_from_chunked(source, chunk)
    }

    /// Like [`Buffer::read_from`], growing by `hint` rounded up to a
    /// power-of-two multiple of the growth hint.
    pub fn read_from_with_hint<R: Read>(
        &mut self,
        source: R,
        hint: usize,
    ) -> Result<usize, BufferError> {
        let chunk = util::round_up_pow2_multiple(hint, self.growth_hint)
            .ok_or(BufferError::TooLarge { requested: hint })?;
        self.read_from_chunked(source, chunk)
    }

    fn read_from_chunked<R: Read>(
        &mut self,
        mut source: R,
        chunk: usize,
    ) -> Result<usize, BufferError> {
        self.ensure_writable()?;

        let mut total = 0;
        loop {
            if self.w == self.capacity() {
                self.grow(chunk)?;
            }
            let free = self.capacity() - self.w;
            match source.read(&mut self.data[self.w..]) {
                Ok(0) => return Ok(total),
                Ok(n) => {
                    // A source may not claim more than it was given.
                    let n = n.min(free);
                    self.w += n;
                    self.a = self.w;
                    total += n;
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Reads at most `n` bytes from `source`.
    ///
    /// Room for all `n` bytes is reserved up front. Stops early if the source
    /// ends; returns the number of bytes actually read.
    pub fn read_from_limited<R: Read>(
        &mut self,
        mut source: R,
        n: usize,
    ) -> Result<usize, BufferError> {
        self.ensure_writable()?;
        if n == 0 {
            return Ok(0);
        }
        self.reserve_free(n)?;

        let mut total = 0;
        while total < n {
            let end = self.w + (n - total);
            match source.read(&mut self.data[self.w..end]) {
                Ok(0) => break,
                Ok(k) => {
                    let k = k.min(end - self.w);
                    self.w += k;
                    self.a = self.w;
                    total += k;
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(total)
    }

    /// Drains every unread byte into `sink`, looping over short writes.
    ///
    /// Returns the number of bytes the sink accepted. A sink error stops the
    /// drain immediately; bytes accepted before it stay consumed.
    pub fn write_to<W: Write>(&mut self, sink: W) -> Result<usize, BufferError> {
        self.write_to_limited(sink, usize::MAX)
    }

    /// Drains at most `n` unread bytes into `sink`.
    pub fn write_to_limited<W: Write>(
        &mut self,
        mut sink: W,
        n: usize,
    ) -> Result<usize, BufferError> {
        let mut total = 0;
        let result = loop {
            if total == n || self.is_empty() {
                break Ok(total);
            }

            let end = self.r + (n - total).min(self.len());
            match sink.write(&self.data[self.r..end]) {
                Ok(0) => break Err(io::Error::from(io::ErrorKind::WriteZero).into()),
                Ok(k) => {
                    let k = k.min(end - self.r);
                    self.r += k;
                    total += k;
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => break Err(e.into()),
            }
        };
        self.shrink();
        result
    }

    // ------------------------------------------------------------------
    // Borrow / return
    // ------------------------------------------------------------------

    /// Borrows `size` writable bytes just past the write cursor.
    ///
    /// The region is not readable until committed with
    /// [`Buffer::give_back`]. Until then every write-side operation fails
    /// with [`BufferError::WriteBeforeCommit`].
    ///
    /// # Example
    ///
    /// ```
    /// use bytepool::Buffer;
    ///
    /// let mut buf = Buffer::new();
    /// buf.write(b"0123456789")?;
    ///
    /// let region = buf.borrow(5)?;
    /// region[..3].copy_from_slice(b"abc");
    /// buf.give_back(3)?;
    ///
    /// buf.write(b"012")?;
    /// assert_eq!(buf.peek(100), b"0123456789abc012");
    /// # Ok::<(), bytepool::BufferError>(())
    /// ```
    pub fn borrow(&mut self, size: usize) -> Result<&mut [u8], BufferError> {
        self.ensure_writable()?;
        if size == 0 {
            return Err(BufferError::ZeroSizeBorrow);
        }

        self.reserve_free(size)?;
        self.a = self.w + size;
        Ok(self.borrowed_mut())
    }

    /// Ends the outstanding borrow, committing its first `used` bytes.
    ///
    /// `used == 0` abandons the region. Without an outstanding borrow this is
    /// a no-op.
    ///
    /// # Errors
    ///
    /// [`BufferError::ReturnExceedsBorrow`] if `used` is larger than the
    /// borrowed region; the borrow stays outstanding.
    pub fn give_back(&mut self, used: usize) -> Result<(), BufferError> {
        if !self.borrowing() {
            return Ok(());
        }

        let borrowed = self.a - self.w;
        if used > borrowed {
            return Err(BufferError::ReturnExceedsBorrow { used, borrowed });
        }

        self.w += used;
        self.a = self.w;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Reset, shrink, grow
    // ------------------------------------------------------------------

    /// Empties the buffer, keeping its backing store.
    ///
    /// # Errors
    ///
    /// [`BufferError::WriteBeforeCommit`] while a region is borrowed; the
    /// buffer is left untouched.
    pub fn reset(&mut self) -> Result<(), BufferError> {
        self.ensure_writable()?;
        self.r = 0;
        self.w = 0;
        self.a = 0;
        Ok(())
    }

    fn ensure_writable(&self) -> Result<(), BufferError> {
        if self.borrowing() {
            return Err(BufferError::WriteBeforeCommit);
        }
        Ok(())
    }

    // Collapse the cursors once everything has been consumed.
    fn shrink(&mut self) {
        if self.r == self.w && !self.borrowing() {
            self.r = 0;
            self.w = 0;
            self.a = 0;
        }
    }

    fn reserve_free(&mut self, n: usize) -> Result<(), BufferError> {
        if self.capacity() - self.w < n {
            self.grow(n)?;
        }
        Ok(())
    }

    /// Makes room for `n` bytes past the write cursor.
    ///
    /// Consumed space is reclaimed first by moving the unread region to the
    /// front. Only when that is not enough is a larger store allocated, sized
    /// up by the deficit rounded to the growth hint. Sizes are checked before
    /// anything is touched.
    fn grow(&mut self, n: usize) -> Result<(), BufferError> {
        let too_large = || BufferError::TooLarge { requested: n };

        let len = self.len();
        let capacity = self.capacity();
        let required = len
            .checked_add(n)
            .filter(|&required| required <= MAX_CAPACITY)
            .ok_or_else(too_large)?;

        if required <= capacity {
            self.data.copy_within(self.r..self.w, 0);
            self.r = 0;
            self.w = len;
            self.a = len;
            return Ok(());
        }

        // Also covers the unallocated buffer, where capacity and len are zero.
        let new_capacity = util::round_up(required - capacity, self.growth_hint)
            .and_then(|deficit| capacity.checked_add(deficit))
            .filter(|&total| total <= MAX_CAPACITY)
            .ok_or_else(too_large)?;

        let mut data = Vec::with_capacity(new_capacity);
        data.extend_from_slice(self.unread());
        data.resize(new_capacity, 0);

        trace!(old_capacity = capacity, new_capacity, len, "buffer reallocated");

        self.data = data;
        self.r = 0;
        self.w = len;
        self.a = len;
        Ok(())
    }
}

impl Default for Buffer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Buffer")
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .field("borrowed", &(self.a - self.w))
            .field("growth_hint", &self.growth_hint)
            .finish()
    }
}
