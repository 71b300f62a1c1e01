use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tailer::{TailerConfig, TimestampZone};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConsoleConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub spip: SpipSection,
    #[serde(default)]
    pub viewer: TailerConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub bind_address: String,
    /// Upper bound on a whole request, viewer streams included.
    pub request_timeout_secs: u64,
    /// Capacity of the channel between a tailing thread and its response body.
    pub stream_buffer: usize,
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
    pub output: LogOutput,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    Stdout,
    File { path: String },
}

/// Where the pipeline's own configuration lives.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SpipSection {
    pub config_file: String,
    /// Overrides `viewer.timezone` when set.
    #[serde(default)]
    pub timezone: Option<TimestampZone>,
}

impl ConsoleConfig {
    /// Load configuration from console.toml and environment variables
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let defaults = config::Config::try_from(&ConsoleConfig::default())
            .context("Failed to serialize default configuration")?;

        let mut builder = config::Config::builder()
            .add_source(defaults);

        // 1. /etc/spip/console.toml (deployment)
        // 2. config/console.toml (local development)
        // 3. crates/console/config/console.toml (workspace root)
        let config_paths = vec![
            "/etc/spip/console",
            "config/console",
            "crates/console/config/console",
        ];

        for path in config_paths {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }

        // CONSOLE_SERVER__BIND_ADDRESS, CONSOLE_VIEWER__ROUNDS, ...
        builder = builder.add_source(
            config::Environment::with_prefix("CONSOLE")
                .separator("__")
                .try_parsing(true),
        );

        builder
            .build()
            .context("Failed to build configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    pub fn validate(&self) -> Result<()> {
        self.server.bind_address.parse::<std::net::SocketAddr>()
            .context("Invalid bind_address")?;

        if self.server.stream_buffer == 0 {
            anyhow::bail!("server.stream_buffer must be > 0");
        }

        if self.spip.config_file.trim().is_empty() {
            anyhow::bail!("spip.config_file must not be empty");
        }

        self.viewer.validate().map_err(anyhow::Error::msg)?;

        Ok(())
    }

    /// Viewer tunables with the `spip.timezone` override applied.
    pub fn tailer(&self) -> TailerConfig {
        let mut tailer = self.viewer.clone();
        if let Some(zone) = self.spip.timezone {
            tailer.timezone = zone;
        }
        tailer
    }
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                bind_address: "0.0.0.0:8080".to_string(),
                request_timeout_secs: 60,
                stream_buffer: 64,
                enable_cors: false,
                cors_origins: vec![],
            },
            logging: LoggingConfig {
                level: "info,console=debug,tailer=info".to_string(),
                format: LogFormat::Pretty,
                output: LogOutput::Stdout,
            },
            spip: SpipSection {
                config_file: "/home/spip/linux_64/share/spip.cfg".to_string(),
                timezone: None,
            },
            viewer: TailerConfig::default(),
        }
    }
}
