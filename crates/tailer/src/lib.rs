// Log tailing core for the SPIP console.
//
// Finds where a trailing time window starts in a growing, timestamped log
// and streams the filtered tail of it for a bounded number of rounds.

pub mod conf;
pub mod error;
pub mod file;
pub mod filter;
pub mod line;
pub mod request;
pub mod search;
pub mod session;
pub mod stream;

pub use conf::TailerConfig;
pub use error::TailError;
pub use file::LogFile;
pub use filter::{FilterEngine, LevelFilter, TagFilter};
pub use line::TimestampZone;
pub use request::{Clock, ViewRequest, Window, DEFAULT_WINDOW_HOURS};
pub use search::locate_window_start;
pub use session::{SessionState, TailSession};
pub use stream::{stream_filtered, stream_rounds, LineSink, StreamSummary, WriteSink};
