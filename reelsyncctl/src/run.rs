//! Command execution: connect both servers, elevate, hand off to the
//! migrator and print what happened.

use anyhow::{Context, Result};
use reelsync_client::{ClientConfig, EmbyClient, JellyfinClient};
use reelsync_contracts::{AdminKey, Backend, MediaServer, ServiceResult};
use reelsync_core::{
    MigrateOptions, Migrator, UserMigrationReport, WatchHistoryReport,
};
use serde::Serialize;
use tracing::info;

use crate::cli::{Cli, Command, HistoryAction, UsersAction};
use crate::config::{Config, ConfigLoader, ServerConfig};
use crate::prompt::TerminalConfirm;

/// Adapters that can be built from connection settings alone.
trait Connect: MediaServer + Sized {
    fn connect(config: &ClientConfig) -> ServiceResult<Self>;
}

impl Connect for JellyfinClient {
    fn connect(config: &ClientConfig) -> ServiceResult<Self> {
        JellyfinClient::new(config)
    }
}

impl Connect for EmbyClient {
    fn connect(config: &ClientConfig) -> ServiceResult<Self> {
        EmbyClient::new(config)
    }
}

/// What to do once both servers are connected.
#[derive(Debug)]
enum Action {
    DiffUsers { full: bool },
    MigrateUsers,
    MigrateHistory { username: String },
}

pub async fn run(cli: Cli) -> Result<()> {
    let config = ConfigLoader::with_options(cli.loader_options())
        .load()
        .context("failed to load configuration")?;

    let (action, options) = match &cli.command {
        Command::Ping => {
            ping(&config.from).await?;
            return ping(&config.into).await;
        }
        Command::Users {
            action: UsersAction::Diff { full },
        } => (Action::DiffUsers { full: *full }, base_options(&cli)),
        Command::Users {
            action:
                UsersAction::Migrate {
                    passwords,
                    copy_policy,
                },
        } => (
            Action::MigrateUsers,
            MigrateOptions {
                passwords: passwords.iter().cloned().collect(),
                copy_policy: *copy_policy,
                ..base_options(&cli)
            },
        ),
        Command::History {
            action: HistoryAction::Migrate { username },
        } => (
            Action::MigrateHistory {
                username: username.clone(),
            },
            base_options(&cli),
        ),
    };

    dispatch(&cli, &config, action, options).await
}

fn base_options(cli: &Cli) -> MigrateOptions {
    MigrateOptions {
        interactive: cli.interactive,
        deadline: cli.deadline,
        ..Default::default()
    }
}

async fn ping(config: &ServerConfig) -> Result<()> {
    match config.backend {
        Backend::Jellyfin => ping_server::<JellyfinClient>(config).await,
        Backend::Emby => ping_server::<EmbyClient>(config).await,
    }
}

async fn ping_server<S: Connect>(config: &ServerConfig) -> Result<()> {
    let server = S::connect(&config.client_config())?;
    server
        .ping()
        .await
        .with_context(|| format!("{} did not answer", config.url))?;
    let info = server
        .public_info()
        .await
        .with_context(|| format!("failed to read server info from {}", config.url))?;
    println!(
        "{} {} ({}) at {}",
        config.backend, info.version, info.server_name, config.url
    );
    Ok(())
}

async fn dispatch(
    cli: &Cli,
    config: &Config,
    action: Action,
    options: MigrateOptions,
) -> Result<()> {
    match (config.from.backend, config.into.backend) {
        (Backend::Jellyfin, Backend::Jellyfin) => {
            execute::<JellyfinClient, JellyfinClient>(cli, config, action, options).await
        }
        (Backend::Jellyfin, Backend::Emby) => {
            execute::<JellyfinClient, EmbyClient>(cli, config, action, options).await
        }
        (Backend::Emby, Backend::Jellyfin) => {
            execute::<EmbyClient, JellyfinClient>(cli, config, action, options).await
        }
        (Backend::Emby, Backend::Emby) => {
            execute::<EmbyClient, EmbyClient>(cli, config, action, options).await
        }
    }
}

async fn execute<F: Connect, I: Connect>(
    cli: &Cli,
    config: &Config,
    action: Action,
    options: MigrateOptions,
) -> Result<()> {
    let (from, from_admin) = login::<F>(&config.from).await?;
    let (into, into_admin) = login::<I>(&config.into).await?;

    let mut migrator =
        Migrator::new(from, from_admin, into, into_admin).with_options(options);
    if cli.interactive {
        migrator = migrator.with_confirm(TerminalConfirm);
    }

    match action {
        Action::DiffUsers { full } => {
            let diff = migrator
                .diff_users(full)
                .await
                .context("failed to diff users")?;
            print!("{diff}");
        }
        Action::MigrateUsers => {
            let report = migrator
                .migrate_users()
                .await
                .context("user migration failed")?;
            emit(cli, &report, print_user_report)?;
        }
        Action::MigrateHistory { username } => {
            let report = migrator
                .migrate_user_watch_history(&username)
                .await
                .with_context(|| {
                    format!("watch history migration failed for {username}")
                })?;
            emit(cli, &report, print_history_report)?;
        }
    }
    Ok(())
}

/// Connect to a server and elevate the configured account.
async fn login<S: Connect>(config: &ServerConfig) -> Result<(S, AdminKey)> {
    let server = S::connect(&config.client_config())
        .with_context(|| format!("failed to set up client for {}", config.url))?;
    let session = server
        .authenticate(&config.username, config.password())
        .await
        .with_context(|| {
            format!("failed to authenticate {} at {}", config.username, config.url)
        })?;
    let admin = session.into_admin().with_context(|| {
        format!("{} needs administrator rights at {}", config.username, config.url)
    })?;
    info!(backend = %config.backend, url = %config.url, user = %config.username, "logged in");
    Ok((server, admin))
}

fn emit<T: Serialize>(cli: &Cli, report: &T, human: fn(&T)) -> Result<()> {
    if cli.json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        human(report);
    }
    Ok(())
}

fn print_user_report(report: &UserMigrationReport) {
    for name in &report.created {
        println!("created {name}");
    }
    for name in &report.deleted {
        println!("deleted {name}");
    }
    for name in &report.kept {
        println!("kept {name}");
    }
    println!("{}", report.progress());
}

fn print_history_report(report: &WatchHistoryReport) {
    println!(
        "{}: {} indexed, {} scanned, {} unmatched, {} in sync, {} updated, {} declined",
        report.username,
        report.indexed,
        report.scanned,
        report.unmatched,
        report.in_sync,
        report.updated,
        report.declined
    );
}
