use crate::core::db::{ConnectOptions, DEFAULT_CONNECT_TIMEOUT};
use crate::core::{DataTierError, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Top-level configuration structure parsed from a TOML file.
#[derive(Debug, Deserialize)]
pub struct Config {
    pub rds: RdsConfig,
}

/// Database endpoint and credentials.
#[derive(Debug, Deserialize)]
pub struct RdsConfig {
    pub endpoint: String,
    pub port: u16,
    /// Informational only; never used to connect.
    pub region: Option<String>,
    pub username: String,
    pub password: String,
    pub database: String,
    pub connect_timeout_secs: Option<u64>,
}

impl Config {
    pub fn connect_options(&self) -> ConnectOptions {
        let rds = &self.rds;
        let timeout = rds
            .connect_timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_CONNECT_TIMEOUT);
        ConnectOptions::new(&rds.endpoint, rds.port, &rds.username, &rds.password, &rds.database)
            .with_connect_timeout(timeout)
    }
}

/// Loads configuration from a TOML file at the given path.
///
/// # Example
///
/// ```no_run
/// let config = datatier::config::load_config("config.toml")?;
/// let conn = datatier::open_with(&config.connect_options())?;
/// # Ok::<(), datatier::DataTierError>(())
/// ```
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// `<config dir>/datatier/config.toml`, if the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("datatier").join("config.toml"))
}

pub const ENV_ENDPOINT: &str = "RDS_ENDPOINT";
pub const ENV_PORT: &str = "RDS_PORT";
pub const ENV_USER: &str = "RDS_USER";
pub const ENV_PASSWORD: &str = "RDS_PASSWORD";
pub const ENV_DBNAME: &str = "RDS_DBNAME";

impl ConnectOptions {
    /// Reads `RDS_ENDPOINT`, `RDS_PORT`, `RDS_USER`, `RDS_PASSWORD` and
    /// `RDS_DBNAME` from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    /// Like [`ConnectOptions::from_env`], resolving variables through `lookup`.
    pub fn from_env_with<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |key: &str| {
            lookup(key).ok_or_else(|| DataTierError::Config(format!("{} is not set", key)))
        };

        let port_raw = require(ENV_PORT)?;
        let port = port_raw.trim().parse::<u16>().map_err(|_| {
            DataTierError::Config(format!("{} is not a valid port: {:?}", ENV_PORT, port_raw))
        })?;

        Ok(ConnectOptions::new(
            &require(ENV_ENDPOINT)?,
            port,
            &require(ENV_USER)?,
            &require(ENV_PASSWORD)?,
            &require(ENV_DBNAME)?,
        ))
    }
}
