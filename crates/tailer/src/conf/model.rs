//! Tunables for window search and streaming.

use std::time::Duration;
use serde::{Deserialize, Serialize};

use crate::line::TimestampZone;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TailerConfig {
    /// Drain-and-sleep cycles per request before the response ends.
    pub rounds: u32,
    pub round_interval_ms: u64,
    /// Passing lines between flushes while catching up on history.
    pub flush_batch: usize,
    pub search_iterations: u32,
    /// How far a probe may walk forward over lines without a timestamp.
    pub probe_step_bytes: u64,
    pub timezone: TimestampZone,
}

impl TailerConfig {
    pub fn round_interval(&self) -> Duration {
        Duration::from_millis(self.round_interval_ms)
    }

    /// Validate tunables
    pub fn validate(&self) -> Result<(), String> {
        if self.rounds == 0 {
            return Err("viewer.rounds must be > 0".to_string());
        }
        if self.flush_batch == 0 {
            return Err("viewer.flush_batch must be > 0".to_string());
        }
        if self.search_iterations == 0 {
            return Err("viewer.search_iterations must be > 0".to_string());
        }
        if self.probe_step_bytes == 0 {
            return Err("viewer.probe_step_bytes must be > 0".to_string());
        }
        Ok(())
    }
}

impl Default for TailerConfig {
    fn default() -> Self {
        Self {
            rounds: 5,
            round_interval_ms: 1000,
            flush_batch: 500,
            search_iterations: 50,
            probe_step_bytes: 1024 * 1024,
            timezone: TimestampZone::Local,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = TailerConfig::default();
        assert_eq!(cfg.rounds, 5);
        assert_eq!(cfg.round_interval(), Duration::from_secs(1));
        assert_eq!(cfg.flush_batch, 500);
        assert_eq!(cfg.search_iterations, 50);
        assert_eq!(cfg.probe_step_bytes, 1_048_576);
        assert_eq!(cfg.timezone, TimestampZone::Local);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_validate_zero_rounds() {
        let cfg = TailerConfig { rounds: 0, ..TailerConfig::default() };
        let result = cfg.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("rounds"));
    }

    #[test]
    fn test_validate_zero_flush_batch() {
        let cfg = TailerConfig { flush_batch: 0, ..TailerConfig::default() };
        assert!(cfg.validate().unwrap_err().contains("flush_batch"));
    }

    #[test]
    fn test_validate_zero_iterations_and_step() {
        let cfg = TailerConfig { search_iterations: 0, ..TailerConfig::default() };
        assert!(cfg.validate().is_err());
        let cfg = TailerConfig { probe_step_bytes: 0, ..TailerConfig::default() };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_zero_interval_allowed() {
        let cfg = TailerConfig { round_interval_ms: 0, ..TailerConfig::default() };
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_partial_deserialize_keeps_defaults() {
        let cfg: TailerConfig = serde_json::from_str(r#"{"rounds": 2, "timezone": "utc"}"#).unwrap();
        assert_eq!(cfg.rounds, 2);
        assert_eq!(cfg.timezone, TimestampZone::Utc);
        assert_eq!(cfg.flush_batch, 500);
    }
}
