// Integration tests for the async frame stream (feature = "async-io")
// Tests cover: tokio compat, partial trailing frames, reader errors

#![cfg(feature = "async-io")]

use std::pin::Pin;
use std::task::{Context, Poll};

use bytepool::{Buffer, BufferConfig, BufferError, BufferPool, FrameStream, frames_async};
use futures_util::StreamExt;
use tokio::io::AsyncWriteExt;
use tokio_util::compat::TokioAsyncReadCompatExt;

#[tokio::test]
async fn test_frames_over_tokio_duplex() {
    let (mut client, server) = tokio::io::duplex(8);

    let writer = tokio::spawn(async move {
        for i in 0..20 {
            client
                .write_all(format!("msg {i}\r\n").as_bytes())
                .await
                .unwrap();
        }
        client.write_all(b"tail").await.unwrap();
    });

    let frames: Vec<_> = frames_async(server.compat(), b'\n', BufferConfig::default())
        .collect::<Vec<_>>()
        .await
        .into_iter()
        .collect::<Result<_, _>>()
        .unwrap();
    writer.await.unwrap();

    assert_eq!(frames.len(), 21);
    assert_eq!(&frames[0][..], b"msg 0\r\n");
    assert_eq!(&frames[19][..], b"msg 19\r\n");
    assert_eq!(&frames[20][..], b"tail", "partial frame flushed at end-of-data");
}

#[test]
fn test_frames_with_pooled_buffer() {
    let pool = BufferPool::default();
    let mut buf = pool.acquire();
    buf.write(b"left").unwrap();

    let reader: &[u8] = b"over\nnext\n";
    let stream = FrameStream::with_buffer(reader, b'\n', buf);
    let frames: Vec<_> = tokio_test::block_on(stream.collect::<Vec<_>>());

    assert_eq!(frames.len(), 2);
    assert_eq!(&frames[0].as_ref().unwrap()[..], b"leftover\n");
    assert_eq!(&frames[1].as_ref().unwrap()[..], b"next\n");
}

/// Reader that yields one chunk and then fails.
struct BrokenReader {
    sent: bool,
}

impl futures_io::AsyncRead for BrokenReader {
    fn poll_read(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut [u8],
    ) -> Poll<std::io::Result<usize>> {
        if self.sent {
            return Poll::Ready(Err(std::io::ErrorKind::BrokenPipe.into()));
        }
        self.sent = true;
        buf[..6].copy_from_slice(b"ok\npar");
        Poll::Ready(Ok(6))
    }
}

#[tokio::test]
async fn test_reader_error_ends_stream() {
    let mut stream = frames_async(BrokenReader { sent: false }, b'\n', BufferConfig::default());

    assert_eq!(&stream.next().await.unwrap().unwrap()[..], b"ok\n");
    match stream.next().await {
        Some(Err(BufferError::Io(e))) => assert_eq!(e.kind(), std::io::ErrorKind::BrokenPipe),
        other => panic!("expected io error, got {other:?}"),
    }
    assert!(stream.next().await.is_none());

    let (_, buf): (_, Buffer) = stream.into_parts();
    assert_eq!(buf.peek(8), b"par");
}
