//! Find where the requested time window starts in a log file.
//!
//! A bounded binary search over byte offsets. Every timestamped line before
//! `min_offset` is older than the target; the line at `max_offset` is the
//! earliest known line that is not (or end of file). Probes land in
//! `[min_offset, probe_limit)`, where `probe_limit` shrinks past stretches
//! of continuation lines that carry no timestamp.
//!
//! On convergence the answer is `max_offset`, exactly the first line inside
//! the window. When the search stops early it answers `min_offset`, which is
//! never past that line. Lines written while the search runs, or timestamps
//! that go backwards, can leave the answer off; the stream's own time filter
//! hides anything older than the window, so an early offset only costs
//! reading.

use std::io;

use tracing::{debug, trace};

use crate::conf::TailerConfig;
use crate::file::LogFile;
use crate::line;
use crate::request::{Clock, Window};

/// Transient state of one search. `0 <= min <= mid <= max <= file size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchState {
    pub min_offset: u64,
    pub max_offset: u64,
    pub mid_offset: u64,
    pub probe_limit: u64,
    pub last_matched_time: Option<i64>,
    pub last_probe: Option<u64>,
    pub iterations_remaining: u32,
}

impl SearchState {
    fn new(size: u64, iterations: u32) -> Self {
        Self {
            min_offset: 0,
            max_offset: size,
            mid_offset: size / 2,
            probe_limit: size,
            last_matched_time: None,
            last_probe: None,
            iterations_remaining: iterations,
        }
    }
}

/// Why the search stopped. None of these are errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStop {
    /// Window is "all"; nothing to search.
    Unbounded,
    Converged,
    /// The same line was probed twice in a row.
    NoProgress,
    IterationCap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOutcome {
    pub offset: u64,
    pub stop: SearchStop,
    pub iterations: u32,
}

enum Probe {
    Stamped { start: u64, end: u64, time: i64 },
    /// No timestamp between the probe and `scanned_to`.
    Unstamped { scanned_to: u64 },
}

/// Offset at or just before the first line stamped no earlier than
/// `now - window`. Returns 0 for [`Window::All`].
pub fn locate_window_start(
    file: &mut LogFile,
    window: Window,
    clock: &Clock,
    config: &TailerConfig,
) -> io::Result<u64> {
    Ok(search_window_start(file, window, clock, config)?.offset)
}

/// Like [`locate_window_start`], also reporting how the search ended.
pub fn search_window_start(
    file: &mut LogFile,
    window: Window,
    clock: &Clock,
    config: &TailerConfig,
) -> io::Result<SearchOutcome> {
    let Some(target) = window.cutoff(clock.now) else {
        return Ok(SearchOutcome { offset: 0, stop: SearchStop::Unbounded, iterations: 0 });
    };

    let size = file.len()?;
    let mut st = SearchState::new(size, config.search_iterations);
    let mut line = Vec::new();
    let mut scratch = Vec::new();
    // Set when a probe ran out of step budget inside untimestamped text.
    let mut nudge: Option<u64> = None;

    let stop = loop {
        if st.min_offset >= st.probe_limit {
            break SearchStop::Converged;
        }
        if st.iterations_remaining == 0 {
            break SearchStop::IterationCap;
        }
        st.iterations_remaining -= 1;

        let start = match nudge.take() {
            Some(offset) => offset,
            None => {
                let mid = st.min_offset + (st.probe_limit - st.min_offset) / 2;
                let next = file.line_start_at_or_after(mid, &mut scratch)?.min(size);
                // No line starts in [mid, limit): look at the first line of the range instead.
                if next >= st.probe_limit { st.min_offset } else { next }
            }
        }
        .clamp(st.min_offset, st.probe_limit);

        if st.last_probe == Some(start) {
            break SearchStop::NoProgress;
        }
        st.last_probe = Some(start);
        st.mid_offset = start;

        match probe(file, start, st.probe_limit, config.probe_step_bytes, clock, &mut line)? {
            Probe::Stamped { start: line_start, end, time } => {
                st.last_matched_time = Some(time);
                if time < target {
                    st.min_offset = end.min(st.probe_limit);
                } else {
                    st.max_offset = line_start;
                    st.probe_limit = line_start;
                }
            }
            Probe::Unstamped { scanned_to } => {
                if start == st.min_offset {
                    // Continuations of a record already known to be old.
                    st.min_offset = scanned_to;
                } else if scanned_to >= st.probe_limit {
                    st.probe_limit = start;
                } else {
                    nudge = Some(scanned_to);
                }
            }
        }

        st.mid_offset = st.mid_offset.clamp(st.min_offset, st.max_offset);

        trace!(
            min = st.min_offset,
            mid = st.mid_offset,
            limit = st.probe_limit,
            max = st.max_offset,
            last_time = ?st.last_matched_time,
            "Window search step"
        );
    };

    let offset = match stop {
        SearchStop::Converged => st.max_offset,
        _ => st.min_offset,
    };
    let iterations = config.search_iterations - st.iterations_remaining;
    debug!(
        path = %file.path().display(),
        offset,
        size,
        iterations,
        stop = ?stop,
        "Window search finished"
    );

    Ok(SearchOutcome { offset, stop, iterations })
}

/// Read lines from `start` until one carries a timestamp, `limit` is
/// reached, or `step` bytes have been consumed.
fn probe(
    file: &mut LogFile,
    start: u64,
    limit: u64,
    step: u64,
    clock: &Clock,
    line: &mut Vec<u8>,
) -> io::Result<Probe> {
    file.seek_to(start)?;
    let budget_end = start.saturating_add(step).min(limit);
    let mut cursor = start;

    while cursor < limit {
        let n = file.read_line(line)?;
        if n == 0 {
            break;
        }
        if let Some(time) = line::parse_timestamp(line, clock.zone) {
            return Ok(Probe::Stamped { start: cursor, end: cursor + n as u64, time });
        }
        cursor += n as u64;
        if cursor >= budget_end {
            break;
        }
    }

    Ok(Probe::Unstamped { scanned_to: cursor.min(limit) })
}
