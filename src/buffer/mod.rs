//! The growable byte buffer and its zero-copy borrow protocol.
//!
//! - [`Buffer`] - Cursor-based buffer with compaction-before-grow
//! - [`Reservation`] - Guard over a borrowed region

mod io;
mod reservation;
mod ring;

pub use reservation::Reservation;
pub use ring::Buffer;
