//! Bridge from a blocking tail session to an async response body.

use std::io;

use bytes::{BufMut, Bytes, BytesMut};
use tailer::LineSink;
use tokio::sync::mpsc;

use super::page;

/// Buffers HTML between flushes and hands each flush to the response body.
///
/// Only for use off the async runtime (`spawn_blocking`): sends block while
/// the channel is full, which is what throttles a session to the speed of
/// its client.
pub struct ChannelSink {
    tx: mpsc::Sender<Bytes>,
    buf: BytesMut,
    /// Lines buffered since the last successful send.
    pending: u64,
    sent: u64,
}

impl ChannelSink {
    pub fn new(tx: mpsc::Sender<Bytes>) -> Self {
        Self { tx, buf: BytesMut::with_capacity(8 * 1024), pending: 0, sent: 0 }
    }

    /// Log lines handed to the response body so far.
    pub fn lines_sent(&self) -> u64 {
        self.sent
    }
}

impl LineSink for ChannelSink {
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.buf.put_slice(line.as_bytes());
        self.buf.put_u8(b'\n');
        self.pending += 1;
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.buf.is_empty() {
            // check the receiver anyway so an idle session notices a gone client
            return if self.tx.is_closed() {
                Err(io::Error::new(io::ErrorKind::BrokenPipe, "viewer disconnected"))
            } else {
                Ok(())
            };
        }

        let chunk = self.buf.split().freeze();
        self.tx
            .blocking_send(chunk)
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "viewer disconnected"))?;
        self.sent += std::mem::take(&mut self.pending);
        Ok(())
    }

    fn notice(&mut self, text: &str) -> io::Result<()> {
        self.buf.put_slice(text.as_bytes());
        self.buf.put_slice(b"<BR>\n");
        Ok(())
    }

    fn caught_up(&mut self) -> io::Result<()> {
        self.buf.put_slice(page::SCROLL_TO_BOTTOM.as_bytes());
        Ok(())
    }
}
