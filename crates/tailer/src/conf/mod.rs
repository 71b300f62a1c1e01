//! Tailer tunables.

pub mod model;

pub use model::TailerConfig;
