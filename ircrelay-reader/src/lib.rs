//! Asynchronous CR LF line framing over an `AsyncRead`.
//!
//! This is the transport-facing half of the Line Codec combined with the
//! Connection Driver's byte accumulation: [`Lines`] is a `Stream` of
//! complete lines (CR LF stripped) pulled out of an arbitrary byte stream.
//! Partial tails are kept across reads; there is no cap on how long a
//! single buffered line may grow before its terminator arrives.

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Stream;
use tokio::io::{AsyncRead, ReadBuf};

const READ_CHUNK: usize = 4096;

/// A stream of CR LF-terminated lines read out of `R`.
///
/// Yields `Ok(line)` for each complete line (without the CR LF), and ends
/// the stream on a clean peer half-close (a zero-byte read). Any partial
/// line still in the buffer at that point is discarded, since the
/// Connection Driver only ever dispatches complete lines. A genuine I/O
/// error is surfaced as `Some(Err(_))` and also ends the stream.
pub struct Lines<R> {
    reader: R,
    buf: Vec<u8>,
    scanned: usize,
    read_buf: Box<[u8]>,
    eof: bool,
}

impl<R: AsyncRead + Unpin> Lines<R> {
    pub fn new(reader: R) -> Self {
        Lines {
            reader,
            buf: Vec::new(),
            scanned: 0,
            read_buf: vec![0u8; READ_CHUNK].into_boxed_slice(),
            eof: false,
        }
    }

    /// Pop one complete line off the front of the buffer, if any.
    fn take_line(&mut self) -> Option<Vec<u8>> {
        let pos = find_crlf(&self.buf[self.scanned..])?;
        let end = self.scanned + pos;
        let line = self.buf[..end].to_vec();
        self.buf.drain(..end + 2);
        self.scanned = 0;
        Some(line)
    }
}

impl<R: AsyncRead + Unpin> Stream for Lines<R> {
    type Item = io::Result<Vec<u8>>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = Pin::get_mut(self);
        loop {
            if let Some(line) = this.take_line() {
                return Poll::Ready(Some(Ok(line)));
            }
            // No CR LF yet: remember how much of the buffer we already
            // scanned (minus one byte, in case a CR landed right at the
            // end) so the next call doesn't rescan from the start.
            this.scanned = this.buf.len().saturating_sub(1);

            if this.eof {
                return Poll::Ready(None);
            }

            let mut read_buf = ReadBuf::new(&mut this.read_buf);
            match Pin::new(&mut this.reader).poll_read(cx, &mut read_buf) {
                Poll::Ready(Ok(())) => {
                    let n = read_buf.filled().len();
                    if n == 0 {
                        this.eof = true;
                        continue;
                    }
                    this.buf.extend_from_slice(read_buf.filled());
                }
                Poll::Ready(Err(err)) => return Poll::Ready(Some(Err(err))),
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

/// Find the first `\r\n` in `buf`, returning the index of the `\r`.
fn find_crlf(buf: &[u8]) -> Option<usize> {
    let mut start = 0;
    while let Some(rel) = memchr::memchr(b'\r', &buf[start..]) {
        let pos = start + rel;
        if buf.get(pos + 1) == Some(&b'\n') {
            return Some(pos);
        }
        start = pos + 1;
    }
    None
}
