//! The immutable parameters of one viewer session.

use std::fmt;
use std::path::PathBuf;

use chrono::Utc;

use crate::filter::{FilterEngine, LevelFilter, LineFilter, TagFilter};
use crate::line::TimestampZone;

/// Scrollback used when the viewer does not ask for a specific length.
pub const DEFAULT_WINDOW_HOURS: u64 = 24;

/// How far back from "now" a session starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    Seconds(u64),
    /// Whole file, no time filtering.
    All,
}

impl Window {
    pub fn hours(hours: u64) -> Self {
        Window::Seconds(hours.saturating_mul(3600))
    }

    /// Parse the viewer's `length` parameter: hours (fractions allowed) or `all`.
    pub fn parse_length(length: &str) -> Result<Self, String> {
        let length = length.trim();
        if length.eq_ignore_ascii_case("all") {
            return Ok(Window::All);
        }

        let hours: f64 = length
            .parse()
            .map_err(|_| format!("invalid length '{}': expected hours or 'all'", length))?;

        if !hours.is_finite() || hours < 0.0 {
            return Err(format!("invalid length '{}': must be a non-negative number", length));
        }

        Ok(Window::Seconds((hours * 3600.0).round() as u64))
    }

    /// Oldest unix time still inside the window, `None` for [`Window::All`].
    pub fn cutoff(self, now: i64) -> Option<i64> {
        match self {
            Window::Seconds(secs) => {
                let secs = i64::try_from(secs).unwrap_or(i64::MAX);
                Some(now.saturating_sub(secs))
            }
            Window::All => None,
        }
    }
}

impl Default for Window {
    fn default() -> Self {
        Window::hours(DEFAULT_WINDOW_HOURS)
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Window::Seconds(secs) => write!(f, "{} hours", *secs as f64 / 3600.0),
            Window::All => write!(f, "all"),
        }
    }
}

/// Wall clock captured once at session start, so the search and every
/// round compare against the same "now".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Clock {
    pub now: i64,
    pub zone: TimestampZone,
}

impl Clock {
    pub fn system(zone: TimestampZone) -> Self {
        Self { now: Utc::now().timestamp(), zone }
    }

    pub fn fixed(now: i64, zone: TimestampZone) -> Self {
        Self { now, zone }
    }
}

#[derive(Debug, Clone)]
pub struct ViewRequest {
    pub source_path: PathBuf,
    pub window: Window,
    pub level: LevelFilter,
    /// Raw user pattern; compiled when the session builds its filter.
    pub content_filter: Option<String>,
    pub tag: TagFilter,
    /// Only echoed into the page script.
    pub autoscroll: bool,
}

impl ViewRequest {
    pub fn new(source_path: impl Into<PathBuf>) -> Self {
        Self {
            source_path: source_path.into(),
            window: Window::default(),
            level: LevelFilter::All,
            content_filter: None,
            tag: TagFilter::Any,
            autoscroll: false,
        }
    }

    pub fn with_window(mut self, window: Window) -> Self {
        self.window = window;
        self
    }

    pub fn with_level(mut self, level: LevelFilter) -> Self {
        self.level = level;
        self
    }

    pub fn with_content_filter(mut self, pattern: impl Into<String>) -> Self {
        self.content_filter = Some(pattern.into());
        self
    }

    pub fn line_filter(&self, clock: &Clock) -> LineFilter {
        LineFilter {
            tag: self.tag.clone(),
            content: FilterEngine::from_user_pattern(self.content_filter.as_deref()),
            not_before: self.window.cutoff(clock.now),
            level: self.level,
            zone: clock.zone,
        }
    }

    /// Notice shown when the first drain finds nothing to display.
    pub fn empty_notice(&self) -> String {
        match self.window {
            Window::All => "No logs recorded".to_string(),
            window => format!("No logs recorded for the last {}", window),
        }
    }
}
