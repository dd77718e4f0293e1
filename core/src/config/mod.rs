use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::errors::CoreError;
use crate::files::resolver::normalize_lexically;

/// Environment variable naming the directory whose contents are served.
pub const ENV_DATA_ROOT: &str = "DATA_ROOT";
/// Environment variable for the bind host.
pub const ENV_HOST: &str = "HOST";
/// Environment variable for the bind port.
pub const ENV_PORT: &str = "PORT";
/// Environment variable for the per-request record buffer.
pub const ENV_STREAM_BUFFER: &str = "STREAM_BUFFER";

/// Process-wide server configuration.
///
/// Built once at startup and shared read-only across requests.
/// - `root_dir`: absolute, lexically normalised root (default `./data`).
/// - `stream_buffer`: how many encoded records may sit between the
///   producer and the response body (default 16, minimum 1).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    #[serde(default = "default_root_dir")]
    pub root_dir: PathBuf,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_stream_buffer")]
    pub stream_buffer: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            root_dir: default_root_dir(),
            host: default_host(),
            port: default_port(),
            stream_buffer: default_stream_buffer(),
        }
    }
}

impl ServerConfig {
    /// Build the configuration from the process environment.
    pub fn from_env() -> Result<Self, CoreError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    ///
    /// Unset or empty variables fall back to their defaults. The root is
    /// resolved against the current working directory.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, CoreError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let mut config = Self::default();

        if let Some(root) = get(ENV_DATA_ROOT) {
            config.root_dir = PathBuf::from(root);
        }
        if let Some(host) = get(ENV_HOST) {
            config.host = host;
        }
        if let Some(port) = get(ENV_PORT) {
            config.port = port
                .trim()
                .parse()
                .map_err(|_| CoreError::Config(format!("{ENV_PORT} is not a valid port: {port}")))?;
        }
        if let Some(buffer) = get(ENV_STREAM_BUFFER) {
            let parsed: usize = buffer.trim().parse().map_err(|_| {
                CoreError::Config(format!("{ENV_STREAM_BUFFER} is not a number: {buffer}"))
            })?;
            config.stream_buffer = parsed.max(1);
        }

        let cwd = std::env::current_dir()?;
        config.root_dir = absolute_root(&cwd, &config.root_dir);
        Ok(config)
    }

    /// The `host:port` pair the server binds to.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Make `root` absolute against `cwd` and collapse `.`/`..` segments.
///
/// Symlinks are not resolved; containment is a purely lexical property.
pub fn absolute_root(cwd: &Path, root: &Path) -> PathBuf {
    normalize_lexically(&cwd.join(root))
}

fn default_root_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    4000
}

fn default_stream_buffer() -> usize {
    16
}
