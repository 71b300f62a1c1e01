//! Typed view of the pipeline's `spip.cfg`.

pub mod store;

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, warn};

pub use store::{ConfigStore, ConfigStoreError};

/// One data stream, `STREAM_i = host:beam:subband`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StreamInfo {
    pub index: usize,
    pub host: String,
    pub beam: String,
    pub subband: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Topology {
    pub server_logs: Vec<String>,
    pub client_logs: Vec<String>,
    pub beams: Vec<String>,
    pub streams: Vec<StreamInfo>,
}

#[derive(Debug, Clone)]
pub struct SpipConfig {
    server_log_dir: String,
    client_log_dir: String,
    topology: Topology,
}

impl SpipConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigStoreError> {
        let store = ConfigStore::load(&path)?;
        debug!(path = %path.as_ref().display(), keys = store.len(), "Read spip.cfg");
        Self::from_store(&store)
    }

    pub fn from_store(store: &ConfigStore) -> Result<Self, ConfigStoreError> {
        let server_log_dir = store.require("SERVER_LOG_DIR")?.to_string();
        let client_log_dir = store.require("CLIENT_LOG_DIR")?.to_string();

        let server_logs = daemon_names(store.get("SERVER_DAEMONS"));
        let client_logs = daemon_names(store.get("CLIENT_DAEMONS"));

        let beams = (0..store.count("NUM_BEAM")?)
            .map(|i| store.require(&format!("BEAM_{}", i)).map(str::to_string))
            .collect::<Result<Vec<_>, _>>()?;

        let mut streams = Vec::new();
        for i in 0..store.count("NUM_STREAM")? {
            let key = format!("STREAM_{}", i);
            let value = store.require(&key)?;
            match parse_stream(i, value, &beams) {
                Some(stream) => streams.push(stream),
                None => warn!(key = %key, value = %value, "Skipping malformed stream entry"),
            }
        }

        Ok(Self {
            server_log_dir,
            client_log_dir,
            topology: Topology {
                server_logs,
                client_logs,
                beams,
                streams,
            },
        })
    }

    pub fn server_log_dir(&self) -> &str {
        &self.server_log_dir
    }

    pub fn client_log_dir(&self) -> &str {
        &self.client_log_dir
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    /// `{SERVER_LOG_DIR}/{name}.log`
    pub fn server_log_path(&self, name: &str) -> PathBuf {
        PathBuf::from(format!("{}/{}.log", self.server_log_dir, name))
    }

    /// `{CLIENT_LOG_DIR}/{name}_{stream}.log`
    pub fn client_log_path(&self, name: &str, stream: &str) -> PathBuf {
        PathBuf::from(format!("{}/{}_{}.log", self.client_log_dir, name, stream))
    }
}

/// Names from a `name:rank name:rank ...` list.
fn daemon_names(value: Option<&str>) -> Vec<String> {
    value
        .unwrap_or_default()
        .split_whitespace()
        .map(|daemon| daemon.split(':').next().unwrap_or(daemon).to_string())
        .filter(|name| !name.is_empty())
        .collect()
}

fn parse_stream(index: usize, value: &str, beams: &[String]) -> Option<StreamInfo> {
    let mut parts = value.trim().splitn(3, ':');
    let host = parts.next()?.to_string();
    let beam = parts.next()?.to_string();
    let subband = parts.next()?.to_string();

    let beam_name = beam
        .parse::<usize>()
        .ok()
        .and_then(|b| beams.get(b))
        .map(String::as_str)
        .unwrap_or(&beam);
    let description = format!("Beam {}, Band {}", beam_name, subband);

    Some(StreamInfo {
        index,
        host,
        beam,
        subband,
        description,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
SERVER_LOG_DIR    /data/spip/logs
CLIENT_LOG_DIR    /data/spip/logs/clients
SERVER_DAEMONS    spip_lmc:0 spip_repack:1
CLIENT_DAEMONS    spip_recv:0 spip_proc:1 spip_gen:2
NUM_BEAM          1
BEAM_0            BEAM_A
NUM_STREAM        2
STREAM_0          host0:0:0
STREAM_1          host1:0:1
";

    #[test]
    fn test_topology_from_store() {
        let spip = SpipConfig::from_store(&ConfigStore::parse(SAMPLE)).unwrap();
        let topology = spip.topology();

        assert_eq!(topology.server_logs, vec!["spip_lmc", "spip_repack"]);
        assert_eq!(topology.client_logs, vec!["spip_recv", "spip_proc", "spip_gen"]);
        assert_eq!(topology.beams, vec!["BEAM_A"]);
        assert_eq!(topology.streams.len(), 2);
        assert_eq!(topology.streams[1].host, "host1");
        assert_eq!(topology.streams[1].description, "Beam BEAM_A, Band 1");
    }

    #[test]
    fn test_log_paths_are_exact() {
        let spip = SpipConfig::from_store(&ConfigStore::parse(SAMPLE)).unwrap();
        assert_eq!(
            spip.server_log_path("spip_lmc"),
            PathBuf::from("/data/spip/logs/spip_lmc.log")
        );
        assert_eq!(
            spip.client_log_path("spip_recv", "0"),
            PathBuf::from("/data/spip/logs/clients/spip_recv_0.log")
        );
    }

    #[test]
    fn test_missing_log_dir_fails() {
        let err = SpipConfig::from_store(&ConfigStore::parse("SERVER_LOG_DIR /tmp\n")).unwrap_err();
        assert!(matches!(err, ConfigStoreError::MissingKey(ref key) if key == "CLIENT_LOG_DIR"));
    }

    #[test]
    fn test_missing_topology_is_empty() {
        let store = ConfigStore::parse("SERVER_LOG_DIR /a\nCLIENT_LOG_DIR /b\n");
        let spip = SpipConfig::from_store(&store).unwrap();
        assert!(spip.topology().server_logs.is_empty());
        assert!(spip.topology().streams.is_empty());
    }

    #[test]
    fn test_malformed_stream_skipped() {
        let store = ConfigStore::parse(
            "SERVER_LOG_DIR /a\nCLIENT_LOG_DIR /b\nNUM_STREAM 2\nSTREAM_0 host0\nSTREAM_1 host1:3:7\n",
        );
        let spip = SpipConfig::from_store(&store).unwrap();
        let streams = &spip.topology().streams;
        assert_eq!(streams.len(), 1);
        assert_eq!(streams[0].index, 1);
        // unknown beam index falls back to the raw value
        assert_eq!(streams[0].description, "Beam 3, Band 7");
    }

    #[test]
    fn test_beam_count_without_entries_fails() {
        let store = ConfigStore::parse("SERVER_LOG_DIR /a\nCLIENT_LOG_DIR /b\nNUM_BEAM 1\n");
        let err = SpipConfig::from_store(&store).unwrap_err();
        assert!(err.to_string().contains("BEAM_0"));
    }
}
