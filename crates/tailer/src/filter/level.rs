//! The cheap substring checks applied to every line.

use std::str::FromStr;

use crate::line::Severity;

/// Minimum severity requested by the viewer.
///
/// `Warn` and `Error` are exact marker matches, not thresholds: a `warn`
/// view shows only lines carrying `WARN:`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LevelFilter {
    #[default]
    All,
    Warn,
    Error,
}

impl LevelFilter {
    pub fn accepts(self, line: &str) -> bool {
        match self {
            LevelFilter::All => true,
            LevelFilter::Warn => line.contains(Severity::Warn.marker()),
            LevelFilter::Error => line.contains(Severity::Error.marker()),
        }
    }
}

impl FromStr for LevelFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(LevelFilter::All),
            "warn" => Ok(LevelFilter::Warn),
            "error" => Ok(LevelFilter::Error),
            other => Err(format!("unknown log level '{}'", other)),
        }
    }
}

/// Component tag filter. SPIP writes tags as `] TAG: ` right after the
/// timestamp; `*` disables the check.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TagFilter {
    #[default]
    Any,
    Tag(String),
}

impl TagFilter {
    pub fn new(tag: &str) -> Self {
        match tag.trim() {
            "" | "*" => TagFilter::Any,
            t => TagFilter::Tag(t.to_string()),
        }
    }

    pub fn accepts(&self, line: &str) -> bool {
        match self {
            TagFilter::Any => true,
            TagFilter::Tag(tag) => line.contains(&format!("] {}: ", tag)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_all_accepts_everything() {
        assert!(LevelFilter::All.accepts("[..] INFO: ok"));
        assert!(LevelFilter::All.accepts(""));
    }

    #[test]
    fn test_level_warn_requires_marker() {
        assert!(LevelFilter::Warn.accepts("[..] WARN: disk full"));
        assert!(!LevelFilter::Warn.accepts("[..] ERROR: disk gone"));
        assert!(!LevelFilter::Warn.accepts("[..] INFO: ok"));
    }

    #[test]
    fn test_level_error_requires_marker() {
        assert!(LevelFilter::Error.accepts("[..] ERROR: disk gone"));
        assert!(!LevelFilter::Error.accepts("[..] WARN: disk full"));
    }

    #[test]
    fn test_level_from_str() {
        assert_eq!("warn".parse::<LevelFilter>().unwrap(), LevelFilter::Warn);
        assert_eq!("ERROR".parse::<LevelFilter>().unwrap(), LevelFilter::Error);
        assert_eq!(" all ".parse::<LevelFilter>().unwrap(), LevelFilter::All);
        assert!("info".parse::<LevelFilter>().is_err());
    }

    #[test]
    fn test_tag_filter() {
        assert_eq!(TagFilter::new("*"), TagFilter::Any);
        assert_eq!(TagFilter::new(""), TagFilter::Any);

        let tag = TagFilter::new("pwc");
        assert!(tag.accepts("[2024-01-01-00:00:00.000000] pwc: started"));
        assert!(!tag.accepts("[2024-01-01-00:00:00.000000] src: started"));
        assert!(!tag.accepts("pwc: no bracket before the tag"));
    }
}
