//! Async streaming support for buffers.
//!
//! This module provides asynchronous framing using the `futures-io::AsyncRead`
//! trait, making it runtime-agnostic and compatible with tokio, async-std,
//! smol, and other async runtimes.
//!
//! - [`frames_async`] - Creates an async stream of delimited frames from an async reader
//!
//! This module requires the `async-io` feature to be enabled.

mod stream;

pub use stream::{FrameStream, frames_async};
