//! Standard I/O and `bytes` trait implementations for [`Buffer`].
//!
//! These let a buffer stand in anywhere a `std::io` reader or writer, or a
//! `bytes::Buf`, is expected. End-of-data maps to the usual `Ok(0)`.

use std::io;

use bytes::Buf;

use crate::buffer::Buffer;
use crate::error::BufferError;

impl io::Read for Buffer {
    fn read(&mut self, dst: &mut [u8]) -> io::Result<usize> {
        match Buffer::read(self, dst) {
            Err(BufferError::EndOfData) => Ok(0),
            other => other.map_err(Into::into),
        }
    }
}

impl io::BufRead for Buffer {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        Ok(self.unread())
    }

    fn consume(&mut self, amt: usize) {
        self.discard(amt);
    }
}

impl io::Write for Buffer {
    fn write(&mut self, src: &[u8]) -> io::Result<usize> {
        Buffer::write(self, src).map_err(Into::into)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Buf for Buffer {
    fn remaining(&self) -> usize {
        self.len()
    }

    fn chunk(&self) -> &[u8] {
        self.unread()
    }

    fn advance(&mut self, cnt: usize) {
        assert!(
            cnt <= self.len(),
            "cannot advance past `remaining`: {} <= {}",
            cnt,
            self.len()
        );
        self.discard(cnt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, Read, Write};

    #[test]
    fn test_io_read_reports_eof_as_zero() {
        let mut buf = Buffer::new();
        let mut dst = [0u8; 4];
        assert_eq!(Read::read(&mut buf, &mut dst).unwrap(), 0);

        Buffer::write(&mut buf, b"abc").unwrap();
        let mut out = String::new();
        buf.read_to_string(&mut out).unwrap();
        assert_eq!(out, "abc");
    }

    #[test]
    fn test_io_write_and_copy() {
        let mut buf = Buffer::new();
        write!(buf, "{}-{}", 1, 2).unwrap();
        io::copy(&mut &b"xyz"[..], &mut buf).unwrap();

        let mut out = Vec::new();
        io::copy(&mut buf, &mut out).unwrap();
        assert_eq!(out, b"1-2xyz");
    }

    #[test]
    fn test_io_write_while_borrowing() {
        let mut buf = Buffer::new();
        buf.borrow(1).unwrap();
        let err = Write::write(&mut buf, b"x").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::WouldBlock);
    }

    #[test]
    fn test_buf_read_lines() {
        let mut buf = Buffer::new();
        Buffer::write(&mut buf, b"one\ntwo\nthree").unwrap();
        let lines: Vec<String> = buf.lines().collect::<Result<_, _>>().unwrap();
        assert_eq!(lines, ["one", "two", "three"]);
    }

    #[test]
    fn test_bytes_buf() {
        let mut buf = Buffer::new();
        Buffer::write(&mut buf, &[0x00, 0x2a, 0xff, 0x01]).unwrap();
        assert_eq!(buf.remaining(), 4);
        assert_eq!(buf.get_u16(), 0x002a);
        assert_eq!(buf.get_u8(), 0xff);
        assert_eq!(buf.chunk(), &[0x01]);
        Buf::advance(&mut buf, 1);
        assert!(!buf.has_remaining());
    }

    #[test]
    #[should_panic]
    fn test_buf_advance_past_end() {
        let mut buf = Buffer::new();
        Buf::advance(&mut buf, 1);
    }
}
