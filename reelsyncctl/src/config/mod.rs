//! Connection settings for the two servers of a run.
//!
//! Settings are layered: command-line flags win over the environment
//! (including a `.env` file), which wins over the TOML file. See
//! [`ConfigLoader`].

mod error;
mod loader;
mod sources;

use std::fmt;
use std::time::Duration;

use reelsync_client::ClientConfig;
use reelsync_contracts::Backend;
use url::Url;
use zeroize::Zeroizing;

pub use error::ConfigLoadError;
pub use loader::{ConfigLoader, ConfigLoaderOptions};
pub use sources::{FileConfig, FileServerConfig};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Which side of the migration a setting belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    From,
    Into,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::From => "from",
            Role::Into => "into",
        }
    }

    /// Prefix of the environment variables for this side.
    pub fn env_prefix(&self) -> &'static str {
        match self {
            Role::From => "REELSYNC_FROM",
            Role::Into => "REELSYNC_INTO",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully resolved server entry.
#[derive(Clone)]
pub struct ServerConfig {
    pub backend: Backend,
    pub url: Url,
    pub username: String,
    password: Zeroizing<String>,
    pub timeout: Duration,
}

impl ServerConfig {
    pub fn new(
        backend: Backend,
        url: Url,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            backend,
            url,
            username: username.into(),
            password: Zeroizing::new(password.into()),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new(self.url.clone()).with_timeout(self.timeout)
    }
}

impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("backend", &self.backend)
            .field("url", &self.url.as_str())
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub from: ServerConfig,
    pub into: ServerConfig,
}
