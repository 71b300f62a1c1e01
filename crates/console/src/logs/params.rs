use std::str::FromStr;

use serde::Deserialize;
use tailer::{LevelFilter, ViewRequest, Window};
use tracing::debug;

use crate::spip::SpipConfig;

/// Query string of `GET /logs/viewer`. Empty values count as absent.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ViewerParams {
    pub server_log: Option<String>,
    pub client_log: Option<String>,
    pub stream: Option<String>,
    pub length: Option<String>,
    pub level: Option<String>,
    pub filter: Option<String>,
    pub autoscroll: Option<String>,
}

/// Why a query does not name a log yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prompt {
    SelectLog,
    SelectStream,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

impl ViewerParams {
    /// Resolve the query against the pipeline's log directories.
    ///
    /// A server log wins over a client log; a client log needs a stream.
    /// Bad `length` or `level` values fall back to their defaults.
    pub fn to_request(&self, spip: &SpipConfig) -> Result<ViewRequest, Prompt> {
        let path = match (present(&self.server_log), present(&self.client_log)) {
            (Some(server_log), _) => spip.server_log_path(server_log),
            (None, Some(client_log)) => {
                let stream = present(&self.stream).ok_or(Prompt::SelectStream)?;
                spip.client_log_path(client_log, stream)
            }
            (None, None) => return Err(Prompt::SelectLog),
        };

        let window = match present(&self.length) {
            None => Window::default(),
            Some(length) => Window::parse_length(length).unwrap_or_else(|e| {
                debug!(error = %e, "Ignoring viewer length");
                Window::default()
            }),
        };

        let level = match present(&self.level) {
            None => LevelFilter::All,
            Some(level) => LevelFilter::from_str(level).unwrap_or_else(|_| {
                debug!(level = level, "Unknown viewer level, showing all");
                LevelFilter::All
            }),
        };

        let mut request = ViewRequest::new(path).with_window(window).with_level(level);
        if let Some(filter) = present(&self.filter) {
            request = request.with_content_filter(filter);
        }
        request.autoscroll = present(&self.autoscroll).is_some_and(is_truthy);

        Ok(request)
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(value.to_ascii_lowercase().as_str(), "true" | "1" | "on" | "yes")
}
