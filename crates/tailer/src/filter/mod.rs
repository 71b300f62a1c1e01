//! The per-line predicates of a viewer session.
//!
//! Checks run in a fixed order: component tag, content pattern, time
//! window, level marker. The time check lives here too because it needs
//! the session clock and the line's parsed timestamp.

pub mod engine;
pub mod level;

pub use engine::{FilterEngine, FilterError};
pub use level::{LevelFilter, TagFilter};

use crate::line::{self, TimestampZone};

/// All predicates for one session, built from a [`crate::ViewRequest`].
#[derive(Debug)]
pub struct LineFilter {
    pub tag: TagFilter,
    pub content: Option<FilterEngine>,
    /// Lines stamped strictly before this unix time are hidden.
    pub not_before: Option<i64>,
    pub level: LevelFilter,
    pub zone: TimestampZone,
}

impl LineFilter {
    /// Whether `line` (trailing whitespace already stripped) should be shown.
    pub fn accepts(&self, line: &str) -> bool {
        if !self.tag.accepts(line) {
            return false;
        }

        if let Some(content) = &self.content {
            if !content.is_match(line.as_bytes()) {
                return false;
            }
        }

        if let Some(cutoff) = self.not_before {
            if let Some(stamp) = line::parse_timestamp(line.as_bytes(), self.zone) {
                if stamp < cutoff {
                    return false;
                }
            }
        }

        self.level.accepts(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter(level: LevelFilter, content: Option<&str>, not_before: Option<i64>) -> LineFilter {
        LineFilter {
            tag: TagFilter::Any,
            content: FilterEngine::from_user_pattern(content),
            not_before,
            level,
            zone: TimestampZone::Utc,
        }
    }

    // 2024-01-01-00:00:00 UTC
    const T0: i64 = 1_704_067_200;

    #[test]
    fn test_old_timestamp_is_hidden() {
        let f = filter(LevelFilter::All, None, Some(T0 + 1));
        assert!(!f.accepts("[2024-01-01-00:00:00.000000] INFO: old"));
        assert!(f.accepts("[2024-01-01-00:00:01.000000] INFO: on the edge"));
    }

    #[test]
    fn test_continuation_lines_ignore_time_window() {
        let f = filter(LevelFilter::All, None, Some(T0 + 3600));
        assert!(f.accepts("    continuation without a stamp"));
    }

    #[test]
    fn test_content_and_level_combine() {
        let f = filter(LevelFilter::Warn, Some("disk"), None);
        assert!(f.accepts("[2024-01-01-00:00:00.000000] WARN: disk full"));
        assert!(!f.accepts("[2024-01-01-00:00:00.000000] WARN: fan slow"));
        assert!(!f.accepts("[2024-01-01-00:00:00.000000] INFO: disk ok"));
    }

    #[test]
    fn test_tag_checked_first() {
        let f = LineFilter {
            tag: TagFilter::new("pwc"),
            ..filter(LevelFilter::All, None, None)
        };
        assert!(f.accepts("[2024-01-01-00:00:00.000000] pwc: hello"));
        assert!(!f.accepts("[2024-01-01-00:00:00.000000] src: hello"));
    }
}
