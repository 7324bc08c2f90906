use std::path::PathBuf;

use reelsync_contracts::ParseBackendError;
use thiserror::Error;

use super::Role;

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("config file {path} does not exist")]
    MissingConfig { path: PathBuf },
    #[error("failed to read config file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("[{role}] {field} is not set")]
    MissingField { role: Role, field: &'static str },
    #[error("[{role}] invalid backend")]
    InvalidBackend {
        role: Role,
        #[source]
        source: ParseBackendError,
    },
    #[error("[{role}] invalid url '{value}'")]
    InvalidUrl {
        role: Role,
        value: String,
        #[source]
        source: url::ParseError,
    },
    #[error("[{role}] invalid timeout '{value}'")]
    InvalidTimeout {
        role: Role,
        value: String,
        #[source]
        source: humantime::DurationError,
    },
    #[error("failed to read secret file {path}")]
    SecretFileIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    EnvFile(#[from] dotenvy::Error),
}
