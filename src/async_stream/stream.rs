//! Async frame stream over a [`Buffer`].
//!
//! Reads from a `futures_io::AsyncRead` straight into the buffer's borrowed
//! region and yields delimiter-terminated frames. Works with tokio,
//! async-std, smol or any futures-compatible runtime.
//!
//! # Example
//!
//! ```ignore
//! use futures_util::StreamExt;
//! use bytepool::{frames_async, BufferConfig};
//! use futures_io::AsyncRead;
//!
//! async fn demo<R: AsyncRead>(reader: R) -> Result<(), bytepool::BufferError> {
//!     let stream = frames_async(reader, b'\n', BufferConfig::default());
//!     futures_util::pin_mut!(stream);
//!
//!     while let Some(line) = stream.next().await {
//!         println!("line: {} bytes", line?.len());
//!     }
//!     Ok(())
//! }
//! ```

use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures_core::Stream;
use futures_io::AsyncRead;
use pin_project_lite::pin_project;

use crate::buffer::Buffer;
use crate::config::BufferConfig;
use crate::error::BufferError;

pin_project! {
    /// A stream of delimiter-terminated frames read from an async reader.
    ///
    /// Each frame includes its delimiter, except a trailing partial frame
    /// flushed once the reader reaches end-of-data. A reader error is yielded
    /// once and ends the stream.
    pub struct FrameStream<R> {
        #[pin]
        reader: R,
        buf: Buffer,
        delim: u8,
        read_size: usize,
        // Unread bytes already known to hold no delimiter
        scanned: usize,
        eof: bool,
        done: bool,
    }
}

impl<R> FrameStream<R> {
    /// Creates a frame stream using `buf` as its read buffer.
    ///
    /// Bytes already in `buf` are treated as the start of the stream.
    pub fn with_buffer(reader: R, delim: u8, buf: Buffer) -> Self {
        let read_size = buf.growth_hint();
        Self {
            reader,
            buf,
            delim,
            read_size,
            scanned: 0,
            eof: false,
            done: false,
        }
    }

    /// Returns the reader and the buffer, including any unread bytes.
    pub fn into_parts(self) -> (R, Buffer) {
        (self.reader, self.buf)
    }
}

impl<R: AsyncRead> Stream for FrameStream<R> {
    type Item = Result<Bytes, BufferError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        if *this.done {
            return Poll::Ready(None);
        }

        loop {
            let unread = this.buf.peek(usize::MAX);
            let found = unread[*this.scanned..].iter().position(|&b| b == *this.delim);
            match found {
                Some(i) => {
                    let end = *this.scanned + i + 1;
                    *this.scanned = 0;
                    return Poll::Ready(Some(this.buf.next(end)));
                }
                None => *this.scanned = unread.len(),
            }

            if *this.eof {
                *this.done = true;
                if this.buf.is_empty() {
                    return Poll::Ready(None);
                }
                let len = this.buf.len();
                return Poll::Ready(Some(this.buf.next(len)));
            }

            // Read straight into the buffer's free region
            let region = match this.buf.borrow(*this.read_size) {
                Ok(region) => region,
                Err(e) => {
                    *this.done = true;
                    return Poll::Ready(Some(Err(e)));
                }
            };

            let polled = this.reader.as_mut().poll_read(cx, region);
            let used = match &polled {
                Poll::Ready(Ok(n)) => *n,
                _ => 0,
            };
            if let Err(e) = this.buf.give_back(used) {
                *this.done = true;
                return Poll::Ready(Some(Err(e)));
            }

            match polled {
                Poll::Pending => return Poll::Pending,
                Poll::Ready(Err(e)) => {
                    *this.done = true;
                    return Poll::Ready(Some(Err(BufferError::Io(e))));
                }
                Poll::Ready(Ok(0)) => *this.eof = true,
                Poll::Ready(Ok(_)) => {}
            }
        }
    }
}

/// Creates a frame stream from an async reader.
///
/// Uses `futures_io::AsyncRead` for runtime-agnostic async I/O. For tokio,
/// convert with `tokio_util::compat`:
///
/// ```ignore
/// use tokio_util::compat::TokioAsyncReadCompatExt;
/// use bytepool::{frames_async, BufferConfig};
///
/// let socket = tokio::net::TcpStream::connect("127.0.0.1:6379").await?;
/// let frames = frames_async(socket.compat(), b'\n', BufferConfig::default());
/// ```
///
/// # Arguments
///
/// * `reader` - An async reader implementing `AsyncRead`
/// * `delim` - The byte terminating each frame
/// * `config` - Initial capacity and read size of the internal buffer
pub fn frames_async<R: AsyncRead>(reader: R, delim: u8, config: BufferConfig) -> FrameStream<R> {
    FrameStream::with_buffer(reader, delim, Buffer::with_config(config))
}
