use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::library::LibraryService;
use crate::system::SystemService;
use crate::user::UserService;

/// The server families an adapter can speak to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Backend {
    Jellyfin,
    Emby,
}

impl Backend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::Jellyfin => "jellyfin",
            Backend::Emby => "emby",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown backend '{0}', expected 'jellyfin' or 'emby'")]
pub struct ParseBackendError(pub String);

impl FromStr for Backend {
    type Err = ParseBackendError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "jellyfin" => Ok(Backend::Jellyfin),
            "emby" => Ok(Backend::Emby),
            _ => Err(ParseBackendError(s.to_string())),
        }
    }
}

/// A complete backend: every capability group bound to one server.
pub trait MediaServer: SystemService + UserService + LibraryService {
    fn backend(&self) -> Backend;
}
