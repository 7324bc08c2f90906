//! Reconciliation engine for moving users and watch history between media
//! servers.
//!
//! The engine only talks to servers through the capability traits in
//! `reelsync-contracts`; concrete Jellyfin and Emby adapters live in
//! `reelsync-client`. A run is driven by [`Migrator`]:
//!
//! * [`Migrator::migrate_users`] reconciles the user sets by name,
//! * [`Migrator::diff_users`] renders the difference without writing,
//! * [`Migrator::migrate_user_watch_history`] builds an [`IdentityIndex`] of
//!   the source user's library and pushes the differing watch states into
//!   the target.
#![allow(missing_docs)]

mod clock;
pub mod confirm;
pub mod diff;
pub mod error;
pub mod index;
pub mod migrate;
pub mod report;
pub mod users;

pub use confirm::{AlwaysConfirm, Confirm};
pub use diff::{ActivityChange, Decision, Match, SeriesTable, decide, lookup};
pub use error::{MigrateError, Result, Side};
pub use index::{IdentityIndex, IdentityKey, build_index};
pub use migrate::{MigrateOptions, Migrator};
pub use report::{Progress, UserMigrationReport, WatchHistoryReport};
pub use users::{UserSetDiff, portable_policy, shared_users};
