//! Flat `KEY value` store read from `spip.cfg`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigStoreError {
    #[error("Could not open file: {path} for reading")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Missing required config key: {0}")]
    MissingKey(String),

    #[error("Invalid value for {key}: '{value}'")]
    InvalidValue { key: String, value: String },
}

#[derive(Debug, Clone, Default)]
pub struct ConfigStore {
    entries: HashMap<String, String>,
}

impl ConfigStore {
    /// Everything after `#` is a comment. The key is the first token and the
    /// value is the rest of the line; single-token lines are ignored.
    pub fn parse(text: &str) -> Self {
        let mut entries = HashMap::new();

        for raw in text.lines() {
            let line = match raw.find('#') {
                Some(pos) => &raw[..pos],
                None => raw,
            };
            let line = line.trim_end();
            if line.is_empty() {
                continue;
            }

            let Some((key, value)) = line.split_once(char::is_whitespace) else {
                continue;
            };
            let value = value.trim_start();
            if value.is_empty() {
                continue;
            }

            // later entries win
            entries.insert(key.to_string(), value.to_string());
        }

        Self { entries }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigStoreError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigStoreError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::parse(&text))
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn require(&self, key: &str) -> Result<&str, ConfigStoreError> {
        self.get(key)
            .ok_or_else(|| ConfigStoreError::MissingKey(key.to_string()))
    }

    /// Optional count key such as `NUM_BEAM`; absent means zero.
    pub fn count(&self, key: &str) -> Result<usize, ConfigStoreError> {
        match self.get(key) {
            None => Ok(0),
            Some(value) => value.trim().parse().map_err(|_| ConfigStoreError::InvalidValue {
                key: key.to_string(),
                value: value.to_string(),
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_comments_and_blanks() {
        let store = ConfigStore::parse(
            "# header comment\n\
             \n\
             SERVER_LOG_DIR   /data/spip/logs   # trailing comment\n\
             CLIENT_LOG_DIR\t/data/spip/client\n\
             \t   \n",
        );
        assert_eq!(store.len(), 2);
        assert_eq!(store.get("SERVER_LOG_DIR"), Some("/data/spip/logs"));
        assert_eq!(store.get("CLIENT_LOG_DIR"), Some("/data/spip/client"));
    }

    #[test]
    fn test_value_keeps_inner_whitespace() {
        let store = ConfigStore::parse("SERVER_DAEMONS spip_lmc:0   spip_repack:1\n");
        assert_eq!(store.get("SERVER_DAEMONS"), Some("spip_lmc:0   spip_repack:1"));
    }

    #[test]
    fn test_single_token_lines_ignored() {
        let store = ConfigStore::parse("LONELY\nLONELY_WITH_COMMENT # nothing\nKEY value\n");
        assert_eq!(store.get("LONELY"), None);
        assert_eq!(store.get("LONELY_WITH_COMMENT"), None);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_require_names_missing_key() {
        let store = ConfigStore::parse("A b\n");
        assert_eq!(store.require("A").unwrap(), "b");
        let err = store.require("CLIENT_LOG_DIR").unwrap_err();
        assert!(err.to_string().contains("CLIENT_LOG_DIR"));
    }

    #[test]
    fn test_count() {
        let store = ConfigStore::parse("NUM_BEAM 2\nNUM_STREAM two\n");
        assert_eq!(store.count("NUM_BEAM").unwrap(), 2);
        assert_eq!(store.count("NUM_MISSING").unwrap(), 0);
        assert!(matches!(
            store.count("NUM_STREAM"),
            Err(ConfigStoreError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let err = ConfigStore::load("/nonexistent/spip.cfg").unwrap_err();
        assert!(matches!(err, ConfigStoreError::Read { .. }));
        assert!(err.to_string().contains("/nonexistent/spip.cfg"));
    }
}
