use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

/// Viewer session metrics
#[derive(Clone)]
pub struct ViewerMetrics {
    inner: Arc<ViewerMetricsInner>,
}

struct ViewerMetricsInner {
    /// Sessions currently streaming
    active_sessions: AtomicU64,

    /// Sessions started (lifetime)
    total_sessions: AtomicU64,

    /// Requests for a log that could not be opened
    unavailable_logs: AtomicU64,

    /// Lines sent to viewers across all sessions
    lines_emitted: AtomicU64,

    /// Active sessions per log file (file name -> count)
    sessions_per_log: RwLock<HashMap<String, u64>>,
}

impl ViewerMetrics {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(ViewerMetricsInner {
                active_sessions: AtomicU64::new(0),
                total_sessions: AtomicU64::new(0),
                unavailable_logs: AtomicU64::new(0),
                lines_emitted: AtomicU64::new(0),
                sessions_per_log: RwLock::new(HashMap::new()),
            }),
        }
    }

    pub fn session_started(&self, log: &str) {
        self.inner.active_sessions.fetch_add(1, Ordering::Relaxed);
        self.inner.total_sessions.fetch_add(1, Ordering::Relaxed);

        let mut per_log = self.inner.sessions_per_log.write();
        *per_log.entry(log.to_string()).or_insert(0) += 1;

        tracing::debug!(
            log = log,
            active = self.inner.active_sessions.load(Ordering::Relaxed),
            "Viewer session started"
        );
    }

    pub fn session_ended(&self, log: &str, lines: u64) {
        let _ = self.inner.active_sessions.fetch_update(
            Ordering::Relaxed,
            Ordering::Relaxed,
            |current| current.checked_sub(1),
        );
        self.inner.lines_emitted.fetch_add(lines, Ordering::Relaxed);

        let mut per_log = self.inner.sessions_per_log.write();
        if let std::collections::hash_map::Entry::Occupied(mut entry) = per_log.entry(log.to_string()) {
            let count = entry.get_mut();
            *count = count.saturating_sub(1);
            // drop idle logs so the map only holds what is being watched
            if *count == 0 {
                entry.remove();
            }
        }

        tracing::debug!(
            log = log,
            lines = lines,
            active = self.inner.active_sessions.load(Ordering::Relaxed),
            "Viewer session ended"
        );
    }

    pub fn log_unavailable(&self) {
        self.inner.unavailable_logs.fetch_add(1, Ordering::Relaxed);
    }

    pub fn active_count(&self) -> u64 {
        self.inner.active_sessions.load(Ordering::Relaxed)
    }

    pub fn total_sessions(&self) -> u64 {
        self.inner.total_sessions.load(Ordering::Relaxed)
    }

    pub fn unavailable_count(&self) -> u64 {
        self.inner.unavailable_logs.load(Ordering::Relaxed)
    }

    pub fn total_lines(&self) -> u64 {
        self.inner.lines_emitted.load(Ordering::Relaxed)
    }

    pub fn sessions_by_log(&self) -> HashMap<String, u64> {
        self.inner.sessions_per_log.read().clone()
    }
}

impl Default for ViewerMetrics {
    fn default() -> Self {
        Self::new()
    }
}
