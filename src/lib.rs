//! bytepool
//!
//! Reusable byte buffers with a zero-copy borrow protocol and a self-tuning pool.
//!
//! `bytepool` is meant for hot I/O paths such as socket read/parse loops,
//! where an extra allocation and copy per operation shows up in throughput:
//!
//! - [`Buffer`] keeps read, write and allocation cursors over one backing
//!   store, reclaims consumed space before growing, and lends out its free
//!   region so readers can fill it in place.
//! - [`BufferPool`] recycles buffers and periodically recalibrates the size
//!   of new buffers and the largest size worth keeping from what it sees.
//!
//! The crate intentionally:
//! - does NOT synchronize a single `Buffer` (only the pool is shared)
//! - does NOT implement sockets, files or protocols
//! - does NOT retry failed I/O
//!
//! # Borrow, fill, commit
//!
//! ```
//! use std::io::Read;
//! use bytepool::{Buffer, BufferError};
//!
//! fn main() -> Result<(), BufferError> {
//!     let mut socket = &b"GET / HTTP/1.1\r\n"[..];
//!     let mut buf = Buffer::new();
//!
//!     let region = buf.borrow(4096)?;
//!     let n = socket.read(region)?;
//!     buf.give_back(n)?;
//!
//!     let line = buf.read_bytes(b'\n')?;
//!     assert_eq!(&line[..], b"GET / HTTP/1.1\r\n");
//!     Ok(())
//! }
//! ```
//!
//! # Pooling
//!
//! ```
//! use bytepool::BufferPool;
//!
//! let pool = BufferPool::default();
//! let mut buf = pool.acquire();
//! buf.write(b"payload")?;
//! pool.release(buf);
//! # Ok::<(), bytepool::BufferError>(())
//! ```
//!
//! # Async (feature = "async-io")
//!
//! ```ignore
//! use futures_util::StreamExt;
//! use bytepool::{frames_async, BufferConfig};
//! use futures_io::AsyncRead;
//!
//! async fn demo<R: AsyncRead + Unpin>(reader: R) -> Result<(), bytepool::BufferError> {
//!     let mut lines = frames_async(reader, b'\n', BufferConfig::default());
//!
//!     while let Some(line) = lines.next().await {
//!         println!("line {}", line?.len());
//!     }
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod buffer;
mod config;
mod error;
mod pool;

mod util; // internal size arithmetic

#[cfg(feature = "async-io")]
mod async_stream;

//
// Public surface
//

pub use buffer::{Buffer, Reservation};
pub use config::{
    BufferConfig, DEFAULT_CALIBRATE_THRESHOLD, DEFAULT_GROWTH_HINT, DEFAULT_MAX_IDLE,
    DEFAULT_MAX_PERCENTILE, MAX_SIZE, MIN_HINT, PoolConfig, STEPS,
};
pub use error::BufferError;
pub use pool::{BufferPool, PooledBuffer, acquire, release};

#[cfg(feature = "async-io")]
pub use async_stream::{FrameStream, frames_async};
