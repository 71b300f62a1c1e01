use std::sync::atomic::{AtomicU64, Ordering};
use grep_matcher::Matcher;
use grep_regex::{RegexMatcher, RegexMatcherBuilder};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FilterError {
    #[error("Invalid regex pattern: {0}")]
    InvalidRegex(String),
}

#[derive(Debug, Default)]
pub struct FilterStats {
    pub lines_scanned: AtomicU64,
    pub lines_matched: AtomicU64,
    pub bytes_processed: AtomicU64,
}

/// Content filter compiled once per viewer request.
///
/// Matching is case-sensitive and unanchored, so a plain word behaves like
/// a substring search and anything else is a regular expression.
pub struct FilterEngine {
    pattern: String,
    matcher: RegexMatcher,
    stats: FilterStats,
}

impl FilterEngine {
    pub fn new(pattern: &str) -> Result<Self, FilterError> {
        let matcher = RegexMatcherBuilder::new()
            .case_insensitive(false)
            .multi_line(false)
            .build(pattern)
            .map_err(|e| FilterError::InvalidRegex(e.to_string()))?;

        Ok(Self {
            pattern: pattern.to_string(),
            matcher,
            stats: FilterStats::default(),
        })
    }

    /// Compile a user-supplied pattern, treating `""` and `"*"` as "no filter".
    ///
    /// Invalid patterns are logged and also yield `None`.
    pub fn from_user_pattern(pattern: Option<&str>) -> Option<Self> {
        let pattern = pattern.map(str::trim).filter(|p| !p.is_empty() && *p != "*")?;

        match Self::new(pattern) {
            Ok(engine) => Some(engine),
            Err(e) => {
                tracing::warn!(pattern = pattern, "Ignoring content filter: {}", e);
                None
            }
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    #[inline]
    pub fn is_match(&self, line: &[u8]) -> bool {
        self.stats.lines_scanned.fetch_add(1, Ordering::Relaxed);
        self.stats.bytes_processed.fetch_add(line.len() as u64, Ordering::Relaxed);

        let matches = self.matcher.is_match(line).unwrap_or(false);

        if matches {
            self.stats.lines_matched.fetch_add(1, Ordering::Relaxed);
        }

        matches
    }

    pub fn stats(&self) -> (u64, u64, u64) {
        (
            self.stats.lines_scanned.load(Ordering::Relaxed),
            self.stats.lines_matched.load(Ordering::Relaxed),
            self.stats.bytes_processed.load(Ordering::Relaxed),
        )
    }
}

impl std::fmt::Debug for FilterEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterEngine")
            .field("pattern", &self.pattern)
            .finish()
    }
}
