use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::Role;

/// Raw configuration as written in `reelsync.toml`.
///
/// ```toml
/// [from]
/// backend = "emby"
/// url = "http://emby.local:8096"
/// username = "admin"
/// password_file = "/run/secrets/emby"
///
/// [into]
/// backend = "jellyfin"
/// url = "http://jellyfin.local:8096"
/// username = "admin"
/// password = "hunter2"
/// timeout = "30s"
/// ```
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub from: FileServerConfig,
    #[serde(default)]
    pub into: FileServerConfig,
}

/// One server entry before validation. Every layer (file, environment,
/// flags) produces one of these.
#[derive(Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FileServerConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_file: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,
}

impl FileServerConfig {
    /// Read `{PREFIX}_BACKEND`, `{PREFIX}_URL`, `{PREFIX}_USERNAME`,
    /// `{PREFIX}_PASSWORD`, `{PREFIX}_PASSWORD_FILE` and `{PREFIX}_TIMEOUT`
    /// through `lookup`.
    pub fn from_vars<F>(prefix: &str, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            lookup(&format!("{prefix}_{name}"))
                .filter(|value| !value.trim().is_empty())
        };
        Self {
            backend: var("BACKEND"),
            url: var("URL"),
            username: var("USERNAME"),
            password: var("PASSWORD"),
            password_file: var("PASSWORD_FILE").map(PathBuf::from),
            timeout: var("TIMEOUT"),
        }
    }

    pub fn gather(role: Role) -> Self {
        Self::from_vars(role.env_prefix(), |name| std::env::var(name).ok())
    }

    /// Fill the gaps in `self` from `fallback`. The password and its file
    /// travel together so a lower layer cannot shadow a secret set above it.
    pub fn or(self, fallback: Self) -> Self {
        let (password, password_file) =
            if self.password.is_some() || self.password_file.is_some() {
                (self.password, self.password_file)
            } else {
                (fallback.password, fallback.password_file)
            };
        Self {
            backend: self.backend.or(fallback.backend),
            url: self.url.or(fallback.url),
            username: self.username.or(fallback.username),
            password,
            password_file,
            timeout: self.timeout.or(fallback.timeout),
        }
    }
}

impl fmt::Debug for FileServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileServerConfig")
            .field("backend", &self.backend)
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("password_file", &self.password_file)
            .field("timeout", &self.timeout)
            .finish()
    }
}
