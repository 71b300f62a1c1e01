//! Emit filtered lines from an offset, then follow the file for a
//! fixed number of rounds.
//!
//! A round drains every line currently in the file, flushes, and sleeps.
//! The first drain is the catch-up over history and is flushed in batches;
//! later rounds pick up whatever the writer appended meanwhile.

use std::io::{self, Write};
use std::thread;

use tracing::{debug, trace};

use crate::conf::TailerConfig;
use crate::file::LogFile;
use crate::request::{Clock, ViewRequest};

/// Destination for the lines of a session.
///
/// Lines are passed through untouched; any escaping is the sink's business.
pub trait LineSink {
    fn write_line(&mut self, line: &str) -> io::Result<()>;

    fn flush(&mut self) -> io::Result<()>;

    /// Status text that is not a log line, such as the empty-window notice.
    fn notice(&mut self, text: &str) -> io::Result<()> {
        self.write_line(text)
    }

    /// Called once, after the first drain reaches end of file.
    fn caught_up(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Newline-terminated lines into any writer.
pub struct WriteSink<W: Write> {
    inner: W,
}

impl<W: Write> WriteSink<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> LineSink for WriteSink<W> {
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.inner.write_all(line.as_bytes())?;
        self.inner.write_all(b"\n")
    }

    fn flush(&mut self) -> io::Result<()> {
        Write::flush(&mut self.inner)
    }
}

impl<S: LineSink + ?Sized> LineSink for &mut S {
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        (**self).write_line(line)
    }

    fn flush(&mut self) -> io::Result<()> {
        (**self).flush()
    }

    fn notice(&mut self, text: &str) -> io::Result<()> {
        (**self).notice(text)
    }

    fn caught_up(&mut self) -> io::Result<()> {
        (**self).caught_up()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamSummary {
    pub start_offset: u64,
    pub lines_scanned: u64,
    pub lines_emitted: u64,
    pub rounds_completed: u32,
}

/// Stream lines of `file` from `offset` through the request's filters.
///
/// Runs `config.rounds` rounds and returns early only on I/O errors, which
/// include a sink whose reader has gone away.
pub fn stream_filtered<S: LineSink>(
    file: &mut LogFile,
    offset: u64,
    request: &ViewRequest,
    clock: &Clock,
    config: &TailerConfig,
    sink: S,
) -> io::Result<StreamSummary> {
    stream_rounds(file, offset, request, clock, config, sink, |_| {})
}

/// [`stream_filtered`] that reports the rounds still to run after each
/// completed round.
pub fn stream_rounds<S: LineSink, F: FnMut(u32)>(
    file: &mut LogFile,
    offset: u64,
    request: &ViewRequest,
    clock: &Clock,
    config: &TailerConfig,
    mut sink: S,
    mut on_round: F,
) -> io::Result<StreamSummary> {
    let filter = request.line_filter(clock);
    let mut summary = StreamSummary { start_offset: offset, ..StreamSummary::default() };
    let mut buf = Vec::new();
    let mut to_flush = config.flush_batch;
    let mut caught_up = false;

    file.seek_to(offset)?;

    let mut rounds = config.rounds;
    while rounds > 0 {
        loop {
            // a record still being written waits for the next round
            let n = file.read_complete_line(&mut buf)?;
            if n == 0 {
                break;
            }
            summary.lines_scanned += 1;

            let text = String::from_utf8_lossy(&buf);
            let line = text.trim_end();

            if !filter.accepts(line) {
                continue;
            }

            if !caught_up {
                to_flush = to_flush.saturating_sub(1);
                if to_flush == 0 {
                    to_flush = config.flush_batch;
                    sink.flush()?;
                }
            }

            sink.write_line(line)?;
            summary.lines_emitted += 1;
        }

        if !caught_up {
            caught_up = true;
            if summary.lines_emitted == 0 {
                sink.notice(&request.empty_notice())?;
            }
            sink.caught_up()?;
            trace!(lines = summary.lines_emitted, "Caught up with log history");
        }

        resync(file)?;
        sink.flush()?;

        rounds -= 1;
        summary.rounds_completed += 1;
        on_round(rounds);
        if rounds > 0 {
            thread::sleep(config.round_interval());
        }
    }

    if let Some(content) = &filter.content {
        let (scanned, matched, bytes) = content.stats();
        debug!(pattern = content.pattern(), scanned, matched, bytes, "Content filter stats");
    }

    Ok(summary)
}

/// Re-seek before the next round. A file that shrank was truncated or
/// rotated in place, so reading resumes from its new end.
fn resync(file: &mut LogFile) -> io::Result<()> {
    let position = file.position();
    if file.len()? < position {
        debug!(path = %file.path().display(), "Log shrank while tailing, jumping to end");
        file.seek_to_end()?;
    } else {
        file.seek_to(position)?;
    }
    Ok(())
}
