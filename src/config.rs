//! Application-level configuration read from the environment at startup.

use std::{
    env,
    path::{Path, PathBuf},
};

use thiserror::Error;

/// Environment variable holding the shared connection key.
const CONNECTION_KEY_ENV: &str = "CONNECTION_KEY";
/// Environment variable that overrides [`DEFAULT_PORT`].
const PORT_ENV: &str = "PORT";
/// Environment variable that overrides [`DEFAULT_DATA_DIR`].
const DATA_DIR_ENV: &str = "OVERLAY_DATA_DIR";
/// Environment variable that overrides [`DEFAULT_PAGES_DIR`].
const PAGES_DIR_ENV: &str = "OVERLAY_PAGES_DIR";
/// Port the server listens on when none is configured.
const DEFAULT_PORT: u16 = 3000;
/// Directory holding persisted channel documents and public static assets.
const DEFAULT_DATA_DIR: &str = "source";
/// Directory holding the login, control, and overlay pages.
const DEFAULT_PAGES_DIR: &str = "pages";

/// Errors raised while reading the process configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The shared connection key was not supplied.
    #[error("missing required environment variable `CONNECTION_KEY`")]
    MissingConnectionKey,
    /// The configured port is not a valid TCP port number.
    #[error("invalid `PORT` value `{value}`")]
    InvalidPort {
        /// The rejected value.
        value: String,
    },
}

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    connection_key: String,
    port: u16,
    data_dir: PathBuf,
    pages_dir: PathBuf,
}

impl AppConfig {
    /// Build a configuration by reading the expected environment variables.
    ///
    /// The connection key is required; everything else falls back to baked-in
    /// defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let connection_key =
            env::var(CONNECTION_KEY_ENV).map_err(|_| ConfigError::MissingConnectionKey)?;
        let port = match env::var(PORT_ENV) {
            Ok(value) => value
                .parse()
                .map_err(|_| ConfigError::InvalidPort { value })?,
            Err(_) => DEFAULT_PORT,
        };

        Ok(Self::new(
            connection_key,
            port,
            dir_from_env(DATA_DIR_ENV, DEFAULT_DATA_DIR),
            dir_from_env(PAGES_DIR_ENV, DEFAULT_PAGES_DIR),
        ))
    }

    /// Construct a configuration from explicit values.
    pub fn new(
        connection_key: impl Into<String>,
        port: u16,
        data_dir: impl Into<PathBuf>,
        pages_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            connection_key: connection_key.into(),
            port,
            data_dir: data_dir.into(),
            pages_dir: pages_dir.into(),
        }
    }

    /// Access gate: true iff `candidate` equals the configured connection key
    /// exactly. A missing candidate never matches.
    pub fn authorize(&self, candidate: Option<&str>) -> bool {
        candidate == Some(self.connection_key.as_str())
    }

    /// Port the server listens on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Directory holding persisted channel documents and public static assets.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Directory holding the login, control, and overlay pages.
    pub fn pages_dir(&self) -> &Path {
        &self.pages_dir
    }
}

/// Resolve a directory path taking the environment override into account.
fn dir_from_env(var: &str, default: &str) -> PathBuf {
    env::var_os(var)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(default))
}
