//! Error types for bytepool.

use std::fmt;
use std::io;

/// Errors returned by [`Buffer`](crate::Buffer) and the pool configuration.
#[derive(Debug)]
pub enum BufferError {
    /// Growing the backing store would exceed the representable capacity.
    ///
    /// The buffer is left exactly as it was before the call.
    TooLarge {
        /// Bytes that were needed beyond the write cursor.
        requested: usize,
    },

    /// A write-side or reset operation was attempted while a borrowed region
    /// is outstanding. Call [`Buffer::give_back`](crate::Buffer::give_back) first.
    WriteBeforeCommit,

    /// [`Buffer::borrow`](crate::Buffer::borrow) was called with a size of zero.
    ZeroSizeBorrow,

    /// More bytes were committed than had been borrowed.
    ReturnExceedsBorrow {
        /// Bytes the caller tried to commit.
        used: usize,
        /// Size of the outstanding borrowed region.
        borrowed: usize,
    },

    /// The buffer holds no unread bytes.
    ///
    /// This is not a failure of the buffer; nothing more is available right now.
    EndOfData,

    /// An I/O error reported by a source or sink, passed through verbatim.
    Io(io::Error),

    /// Invalid configuration parameter.
    InvalidConfig {
        /// Description of what was invalid.
        message: &'static str,
    },
}

impl BufferError {
    /// Returns `true` for [`BufferError::EndOfData`].
    pub fn is_end_of_data(&self) -> bool {
        matches!(self, BufferError::EndOfData)
    }
}

impl fmt::Display for BufferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BufferError::TooLarge { requested } => {
                write!(f, "buffer too large: cannot grow by {} bytes", requested)
            }
            BufferError::WriteBeforeCommit => {
                write!(f, "cannot write while a borrowed region is outstanding")
            }
            BufferError::ZeroSizeBorrow => write!(f, "cannot borrow zero bytes"),
            BufferError::ReturnExceedsBorrow { used, borrowed } => {
                write!(
                    f,
                    "returned {} bytes but only {} were borrowed",
                    used, borrowed
                )
            }
            BufferError::EndOfData => write!(f, "end of data"),
            BufferError::Io(e) => write!(f, "io error: {}", e),
            BufferError::InvalidConfig { message } => {
                write!(f, "invalid config: {}", message)
            }
        }
    }
}

impl std::error::Error for BufferError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BufferError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for BufferError {
    fn from(e: io::Error) -> Self {
        BufferError::Io(e)
    }
}

impl From<BufferError> for io::Error {
    fn from(e: BufferError) -> Self {
        match e {
            BufferError::Io(e) => e,
            BufferError::EndOfData => io::Error::new(io::ErrorKind::UnexpectedEof, e),
            BufferError::TooLarge { .. } => io::Error::new(io::ErrorKind::OutOfMemory, e),
            BufferError::WriteBeforeCommit => io::Error::new(io::ErrorKind::WouldBlock, e),
            _ => io::Error::new(io::ErrorKind::InvalidInput, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "test");
        let err: BufferError = io_err.into();
        assert!(matches!(err, BufferError::Io(_)));
    }

    #[test]
    fn test_into_io_error_keeps_inner() {
        let err = BufferError::Io(io::Error::new(io::ErrorKind::BrokenPipe, "gone"));
        let io_err: io::Error = err.into();
        assert_eq!(io_err.kind(), io::ErrorKind::BrokenPipe);

        let io_err: io::Error = BufferError::WriteBeforeCommit.into();
        assert_eq!(io_err.kind(), io::ErrorKind::WouldBlock);
    }

    #[test]
    fn test_display() {
        let err = BufferError::ReturnExceedsBorrow {
            used: 10,
            borrowed: 5,
        };
        assert!(err.to_string().contains("only 5 were borrowed"));
        assert!(BufferError::EndOfData.is_end_of_data());
    }
}
