use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TailError {
    #[error("The log file did not exist or was not readable: {}", path.display())]
    LogUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("I/O error while tailing log: {0}")]
    Io(#[from] io::Error),
}

impl TailError {
    /// True when the session never got a file handle.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, TailError::LogUnavailable { .. })
    }
}
