use std::sync::Arc;
use std::time::Instant;

use tailer::TailerConfig;

use crate::config::ConsoleConfig;
use crate::metrics::ViewerMetrics;
use crate::spip::SpipConfig;

/// Shared application state (thread-safe)
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ConsoleConfig>,
    pub spip: Arc<SpipConfig>,
    /// Viewer tunables with overrides applied, handed to every session.
    pub tailer: Arc<TailerConfig>,
    pub metrics: ViewerMetrics,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(config: ConsoleConfig, spip: SpipConfig) -> Self {
        let tailer = config.tailer();

        Self {
            config: Arc::new(config),
            spip: Arc::new(spip),
            tailer: Arc::new(tailer),
            metrics: ViewerMetrics::new(),
            started_at: Instant::now(),
        }
    }
}
