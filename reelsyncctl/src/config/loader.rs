use std::fs;
use std::path::{Path, PathBuf};

use reelsync_contracts::Backend;
use tracing::debug;
use url::Url;

use super::error::ConfigLoadError;
use super::sources::{FileConfig, FileServerConfig};
use super::{Config, DEFAULT_TIMEOUT, Role, ServerConfig};

const DEFAULT_CONFIG_LOCATIONS: &[&str] =
    &["reelsync.toml", "config/reelsync.toml"];
const CONFIG_PATH_VAR: &str = "REELSYNC_CONFIG";

#[derive(Debug, Default, Clone)]
pub struct ConfigLoaderOptions {
    pub config_path: Option<PathBuf>,
    pub env_file: Option<PathBuf>,
    /// Command-line overrides for the source server.
    pub from: FileServerConfig,
    /// Command-line overrides for the target server.
    pub into: FileServerConfig,
}

/// Environment layer, gathered once per load.
#[derive(Debug, Default, Clone)]
struct EnvConfig {
    config_path: Option<PathBuf>,
    from: FileServerConfig,
    into: FileServerConfig,
}

impl EnvConfig {
    fn gather() -> Self {
        Self {
            config_path: std::env::var(CONFIG_PATH_VAR).ok().map(PathBuf::from),
            from: FileServerConfig::gather(Role::From),
            into: FileServerConfig::gather(Role::Into),
        }
    }
}

#[derive(Debug, Default)]
pub struct ConfigLoader {
    options: ConfigLoaderOptions,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ConfigLoaderOptions) -> Self {
        Self { options }
    }

    pub fn with_config_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.config_path = Some(path.into());
        self
    }

    pub fn with_env_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.env_file = Some(path.into());
        self
    }

    pub fn load(&self) -> Result<Config, ConfigLoadError> {
        let env_file_loaded = match &self.options.env_file {
            Some(path) => dotenvy::from_path(path).map(|_| true).or_else(
                |err| match err {
                    dotenvy::Error::Io(_) => Ok(false),
                    _ => Err(err),
                },
            )?,
            None => {
                dotenvy::dotenv().map(|_| true).or_else(|err| match err {
                    dotenvy::Error::Io(_) => Ok(false),
                    _ => Err(err),
                })?
            }
        };
        debug!(env_file_loaded, "environment gathered");

        let env = EnvConfig::gather();
        let file = self.load_file_config(env.config_path.as_deref())?;
        self.compose(file, env)
    }

    fn load_file_config(
        &self,
        env_path: Option<&Path>,
    ) -> Result<FileConfig, ConfigLoadError> {
        let explicit = self
            .options
            .config_path
            .as_deref()
            .or(env_path)
            .map(Path::to_path_buf);

        let path = match explicit {
            Some(path) if !path.exists() => {
                return Err(ConfigLoadError::MissingConfig { path });
            }
            Some(path) => path,
            None => match DEFAULT_CONFIG_LOCATIONS
                .iter()
                .map(PathBuf::from)
                .find(|candidate| candidate.exists())
            {
                Some(path) => path,
                None => {
                    debug!("no config file found; using environment only");
                    return Ok(FileConfig::default());
                }
            },
        };

        let contents =
            fs::read_to_string(&path).map_err(|err| ConfigLoadError::Io {
                path: path.clone(),
                source: err,
            })?;
        debug!(path = %path.display(), "loaded config file");
        toml::from_str(&contents).map_err(|err| ConfigLoadError::Parse {
            path,
            source: err,
        })
    }

    fn compose(
        &self,
        file: FileConfig,
        env: EnvConfig,
    ) -> Result<Config, ConfigLoadError> {
        let from = self.options.from.clone().or(env.from).or(file.from);
        let into = self.options.into.clone().or(env.into).or(file.into);

        Ok(Config {
            from: resolve(Role::From, from)?,
            into: resolve(Role::Into, into)?,
        })
    }
}

fn resolve(
    role: Role,
    raw: FileServerConfig,
) -> Result<ServerConfig, ConfigLoadError> {
    let missing = |field| ConfigLoadError::MissingField { role, field };

    let backend: Backend = raw
        .backend
        .ok_or_else(|| missing("backend"))?
        .parse()
        .map_err(|source| ConfigLoadError::InvalidBackend { role, source })?;

    let value = raw.url.ok_or_else(|| missing("url"))?;
    let url = Url::parse(&value).map_err(|source| {
        ConfigLoadError::InvalidUrl {
            role,
            value: value.clone(),
            source,
        }
    })?;

    let username = raw.username.ok_or_else(|| missing("username"))?;

    let password = match (raw.password, raw.password_file) {
        (Some(password), _) => password,
        (None, Some(path)) => read_secret(&path)?,
        (None, None) => return Err(missing("password")),
    };

    let timeout = match raw.timeout {
        Some(value) => humantime::parse_duration(&value).map_err(|source| {
            ConfigLoadError::InvalidTimeout {
                role,
                value: value.clone(),
                source,
            }
        })?,
        None => DEFAULT_TIMEOUT,
    };

    let mut server = ServerConfig::new(backend, url, username, password);
    server.timeout = timeout;
    Ok(server)
}

fn read_secret(path: &Path) -> Result<String, ConfigLoadError> {
    let contents = fs::read_to_string(path).map_err(|source| {
        ConfigLoadError::SecretFileIo {
            path: path.to_path_buf(),
            source,
        }
    })?;
    Ok(contents.trim_end_matches(['\r', '\n']).to_string())
}
