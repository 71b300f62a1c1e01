//! One viewer request from open to close.
//!
//! `Searching -> Streaming(rounds) -> ... -> Closed`. The session owns its
//! file handle, so every exit path (normal end, I/O error, a sink that
//! stopped listening, a panic unwinding through `run`) closes the file when
//! the session is dropped.

use tracing::{debug, info, trace};

use crate::conf::TailerConfig;
use crate::error::TailError;
use crate::file::LogFile;
use crate::request::{Clock, ViewRequest};
use crate::search::{self, SearchOutcome, SearchStop};
use crate::stream::{self, LineSink, StreamSummary};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Searching,
    Streaming { rounds_left: u32 },
    Closed,
}

#[derive(Debug)]
pub struct TailSession {
    file: LogFile,
    request: ViewRequest,
    config: TailerConfig,
    clock: Clock,
    state: SessionState,
}

impl TailSession {
    /// Open the requested log. Fails with [`TailError::LogUnavailable`]
    /// before anything is written, so callers can answer with a plain
    /// error instead of a page.
    pub fn open(request: ViewRequest, config: TailerConfig) -> Result<Self, TailError> {
        let clock = Clock::system(config.timezone);
        Self::open_at(request, config, clock)
    }

    /// Like [`TailSession::open`] with an explicit clock.
    pub fn open_at(request: ViewRequest, config: TailerConfig, clock: Clock) -> Result<Self, TailError> {
        let file = LogFile::open(&request.source_path)?;
        debug!(path = %request.source_path.display(), window = %request.window, "Opened log for viewing");

        Ok(Self {
            file,
            request,
            config,
            clock,
            state: SessionState::Searching,
        })
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn request(&self) -> &ViewRequest {
        &self.request
    }

    /// Find the window start and stream from it until the round budget is spent.
    pub fn run<S: LineSink>(mut self, sink: S) -> Result<StreamSummary, TailError> {
        let outcome = self.search()?;

        self.state = SessionState::Streaming { rounds_left: self.config.rounds };
        let result = {
            let state = &mut self.state;
            let path = &self.request.source_path;
            stream::stream_rounds(
                &mut self.file,
                outcome.offset,
                &self.request,
                &self.clock,
                &self.config,
                sink,
                |rounds_left| {
                    *state = SessionState::Streaming { rounds_left };
                    trace!(path = %path.display(), rounds_left, "Round complete");
                },
            )
        };
        let streamed = self.state;
        self.state = SessionState::Closed;

        let summary = result.map_err(|e| {
            debug!(state = ?streamed, error = %e, "Log view ended early");
            e
        })?;
        info!(
            path = %self.request.source_path.display(),
            state = ?streamed,
            offset = summary.start_offset,
            scanned = summary.lines_scanned,
            emitted = summary.lines_emitted,
            rounds = summary.rounds_completed,
            "Log view finished"
        );
        Ok(summary)
    }

    fn search(&mut self) -> Result<SearchOutcome, TailError> {
        self.state = SessionState::Searching;
        let outcome = search::search_window_start(
            &mut self.file,
            self.request.window,
            &self.clock,
            &self.config,
        )?;

        if matches!(outcome.stop, SearchStop::IterationCap | SearchStop::NoProgress) {
            debug!(
                path = %self.request.source_path.display(),
                offset = outcome.offset,
                stop = ?outcome.stop,
                "Window search did not converge, streaming from best offset"
            );
        }

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::LevelFilter;
    use crate::line::TimestampZone;
    use crate::request::Window;
    use crate::stream::WriteSink;
    use std::io::Write;

    const NOW: i64 = 1_704_067_200;

    fn stamp(unix: i64) -> String {
        TimestampZone::Utc.format(unix).unwrap()
    }

    fn config() -> TailerConfig {
        TailerConfig { rounds: 2, round_interval_ms: 0, timezone: TimestampZone::Utc, ..TailerConfig::default() }
    }

    fn write_log(dir: &tempfile::TempDir, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    fn view(request: ViewRequest) -> String {
        let session = TailSession::open_at(request, config(), Clock::fixed(NOW, TimestampZone::Utc)).unwrap();
        assert_eq!(session.state(), SessionState::Searching);
        let mut sink = WriteSink::new(Vec::new());
        session.run(&mut sink).unwrap();
        String::from_utf8(sink.into_inner()).unwrap()
    }

    #[test]
    fn test_last_hour_excludes_older_lines() {
        let dir = tempfile::tempdir().unwrap();
        // written a second before the viewer asks
        let t = NOW - 1;
        let contents = format!(
            "{} INFO: T-3600\n{} INFO: T-1800\n{} INFO: T-60\n",
            stamp(t - 3_600),
            stamp(t - 1_800),
            stamp(t - 60),
        );
        let path = write_log(&dir, "spip_recv.log", &contents);

        let out = view(ViewRequest::new(path).with_window(Window::hours(1)));
        assert!(!out.contains("T-3600"), "output was: {}", out);
        assert!(out.contains("T-1800"));
        assert!(out.contains("T-60"));
    }

    #[test]
    fn test_warn_level_shows_only_warnings() {
        let dir = tempfile::tempdir().unwrap();
        let contents = "[2024-01-01-00:00:00.000000] WARN: disk full\n\
                        [2024-01-01-00:00:01.000000] INFO: ok\n";
        let path = write_log(&dir, "spip_proc.log", contents);

        let out = view(
            ViewRequest::new(path)
                .with_window(Window::All)
                .with_level(LevelFilter::Warn),
        );
        assert_eq!(out, "[2024-01-01-00:00:00.000000] WARN: disk full\n");
    }

    #[test]
    fn test_missing_log_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let err = TailSession::open(ViewRequest::new(dir.path().join("nope.log")), config()).unwrap_err();
        assert!(err.is_unavailable());
    }

    #[test]
    fn test_all_window_shows_every_line_regardless_of_age() {
        let dir = tempfile::tempdir().unwrap();
        let contents = format!(
            "{} INFO: ancient\ncontinuation\n{} ERROR: recent\n",
            stamp(NOW - 86_400 * 365),
            stamp(NOW - 5),
        );
        let path = write_log(&dir, "spip_tcs.log", &contents);

        let out = view(ViewRequest::new(path).with_window(Window::All));
        assert_eq!(out.lines().count(), 3);
        assert!(out.starts_with(&stamp(NOW - 86_400 * 365)));
    }

    #[test]
    fn test_run_reports_summary() {
        let dir = tempfile::tempdir().unwrap();
        let contents = format!("{} INFO: a\n{} INFO: b\n", stamp(NOW - 10), stamp(NOW - 5));
        let path = write_log(&dir, "spip_lmc.log", &contents);

        let session = TailSession::open_at(
            ViewRequest::new(path).with_window(Window::Seconds(7)),
            config(),
            Clock::fixed(NOW, TimestampZone::Utc),
        )
        .unwrap();
        let summary = session.run(WriteSink::new(std::io::sink())).unwrap();
        assert_eq!(summary.lines_emitted, 1);
        assert_eq!(summary.rounds_completed, 2);
        // the search skipped the older line entirely
        assert_eq!(summary.lines_scanned, 1);
        assert!(summary.start_offset > 0);
    }
}
