use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use crate::config::{ConfigLoaderOptions, FileServerConfig};

#[derive(Debug, Parser)]
#[command(
    name = "reelsyncctl",
    version,
    about = "Move users and watch history between Jellyfin and Emby servers"
)]
pub struct Cli {
    /// TOML file describing the [from] and [into] servers
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Environment file to load before reading REELSYNC_* variables
    #[arg(long, global = true)]
    pub env_file: Option<PathBuf>,
    /// Log filter, e.g. `debug` or `reelsync_core=trace` (overrides RUST_LOG)
    #[arg(long, global = true)]
    pub log_level: Option<String>,
    /// Ask before every deletion and watch-state write
    #[arg(long, global = true)]
    pub interactive: bool,
    /// Abort the run after this long, e.g. `10m`
    #[arg(long, global = true, value_parser = humantime::parse_duration)]
    pub deadline: Option<Duration>,
    /// Print reports as JSON
    #[arg(long, global = true)]
    pub json: bool,
    #[command(flatten)]
    pub from: FromArgs,
    #[command(flatten)]
    pub into: IntoArgs,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Args)]
pub struct FromArgs {
    /// Source server kind (jellyfin or emby)
    #[arg(long, global = true)]
    pub from_backend: Option<String>,
    /// Source server URL
    #[arg(long, global = true)]
    pub from_url: Option<String>,
    /// Source administrator name
    #[arg(long, global = true)]
    pub from_username: Option<String>,
    /// Per-request timeout for the source server
    #[arg(long, global = true)]
    pub from_timeout: Option<String>,
}

#[derive(Debug, Args)]
pub struct IntoArgs {
    /// Target server kind (jellyfin or emby)
    #[arg(long, global = true)]
    pub into_backend: Option<String>,
    /// Target server URL
    #[arg(long, global = true)]
    pub into_url: Option<String>,
    /// Target administrator name
    #[arg(long, global = true)]
    pub into_username: Option<String>,
    /// Per-request timeout for the target server
    #[arg(long, global = true)]
    pub into_timeout: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check that both servers answer and print their versions
    Ping,
    /// Reconcile user accounts by name
    Users {
        #[command(subcommand)]
        action: UsersAction,
    },
    /// Copy watch state between matching library items
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },
}

#[derive(Debug, Subcommand)]
pub enum UsersAction {
    /// Show users that exist on only one server
    Diff {
        /// Also show field-level differences for users on both servers
        #[arg(long)]
        full: bool,
    },
    /// Create missing users on the target and delete extra ones
    Migrate {
        /// Initial password for a created user; repeatable
        #[arg(long = "password", value_name = "NAME=PASSWORD", value_parser = parse_password)]
        passwords: Vec<(String, String)>,
        /// Copy each created user's policy from the source
        #[arg(long)]
        copy_policy: bool,
    },
}

#[derive(Debug, Subcommand)]
pub enum HistoryAction {
    /// Push one user's watch history from the source into the target
    Migrate {
        /// Account name, identical on both servers
        username: String,
    },
}

impl Cli {
    pub fn loader_options(&self) -> ConfigLoaderOptions {
        ConfigLoaderOptions {
            config_path: self.config.clone(),
            env_file: self.env_file.clone(),
            from: FileServerConfig {
                backend: self.from.from_backend.clone(),
                url: self.from.from_url.clone(),
                username: self.from.from_username.clone(),
                timeout: self.from.from_timeout.clone(),
                ..Default::default()
            },
            into: FileServerConfig {
                backend: self.into.into_backend.clone(),
                url: self.into.into_url.clone(),
                username: self.into.into_username.clone(),
                timeout: self.into.into_timeout.clone(),
                ..Default::default()
            },
        }
    }
}

fn parse_password(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, password)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), password.to_string()))
        }
        _ => Err(format!("expected NAME=PASSWORD, got '{raw}'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn passwords_split_on_first_equals() {
        assert_eq!(
            parse_password("alice=a=b").unwrap(),
            ("alice".to_string(), "a=b".to_string())
        );
        assert!(parse_password("alice").is_err());
        assert!(parse_password("=pw").is_err());
    }

    #[test]
    fn users_migrate_collects_repeated_passwords() {
        let cli = Cli::try_parse_from([
            "reelsyncctl",
            "--interactive",
            "--deadline",
            "5m",
            "users",
            "migrate",
            "--password",
            "alice=one",
            "--password",
            "bob=two",
            "--copy-policy",
            "--into-url",
            "http://jf:8096",
        ])
        .unwrap();

        assert!(cli.interactive);
        assert_eq!(cli.deadline, Some(Duration::from_secs(300)));
        match &cli.command {
            Command::Users {
                action: UsersAction::Migrate { passwords, copy_policy },
            } => {
                assert_eq!(passwords.len(), 2);
                assert_eq!(passwords[1].0, "bob");
                assert!(*copy_policy);
            }
            other => panic!("unexpected command {other:?}"),
        }

        let options = cli.loader_options();
        assert_eq!(options.into.url.as_deref(), Some("http://jf:8096"));
        assert_eq!(options.from, FileServerConfig::default());
    }
}
