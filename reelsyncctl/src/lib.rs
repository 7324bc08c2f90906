//! Command-line front end for reelsync.
//!
//! The binary is a thin wrapper: [`cli::Cli`] parses arguments,
//! [`config::ConfigLoader`] resolves both servers, and [`run::run`] drives
//! `reelsync_core::Migrator` against the configured Jellyfin or Emby
//! adapters.
#![allow(missing_docs)]

pub mod cli;
pub mod config;
pub mod prompt;
pub mod run;
