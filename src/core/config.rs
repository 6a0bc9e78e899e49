use crate::core::quote::CurrencyPair;
use anyhow::{Context, Result, bail};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, net::SocketAddr, path::PathBuf, time::Duration};
use tracing::debug;

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct UpstreamConfig {
    pub base_url: String,
    pub pair: String,
    /// Treat a pair missing from the upstream response as a fetch failure
    /// instead of relaying an empty quote.
    pub strict_pair: bool,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        UpstreamConfig {
            base_url: "https://economia.awesomeapi.com.br/json/last".to_string(),
            pair: CurrencyPair::default().path(),
            strict_pair: false,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_addr: SocketAddr,
    pub upstream: UpstreamConfig,
    pub database_url: String,
    pub fetch_timeout_ms: u64,
    pub persist_timeout_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            upstream: UpstreamConfig::default(),
            database_url: "sqlite://database.db".to_string(),
            fetch_timeout_ms: 200,
            persist_timeout_ms: 10,
        }
    }
}

impl ServerConfig {
    pub fn fetch_deadline(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    pub fn persist_deadline(&self) -> Duration {
        Duration::from_millis(self.persist_timeout_ms)
    }

    pub fn pair(&self) -> Result<CurrencyPair> {
        self.upstream.pair.parse()
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct ClientConfig {
    pub endpoint: String,
    pub timeout_ms: u64,
    pub cache_path: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            endpoint: "http://localhost:8080/cotacao".to_string(),
            timeout_ms: 300,
            cache_path: PathBuf::from("cotacao_atual.txt"),
        }
    }
}

impl ClientConfig {
    pub fn deadline(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub client: ClientConfig,
}

impl AppConfig {
    /// Loads the config from the default location, falling back to built-in
    /// defaults when no file exists there.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!(path = %config_path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("br", "fxrelay", "fxrelay")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    /// Loads from `path` when given, otherwise from the default location.
    pub fn resolve(path: Option<&str>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::load_from_path(path)?,
            None => Self::load()?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.server.fetch_timeout_ms == 0 {
            bail!("server.fetch_timeout_ms must be positive");
        }
        if self.server.persist_timeout_ms == 0 {
            bail!("server.persist_timeout_ms must be positive");
        }
        if self.client.timeout_ms == 0 {
            bail!("client.timeout_ms must be positive");
        }
        self.server
            .pair()
            .context("server.upstream.pair is not a valid currency pair")?;
        Ok(())
    }
}
