use std::fmt;

use serde::Serialize;

/// Writes performed against the target server so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub users_created: usize,
    pub users_deleted: usize,
    pub passwords_set: usize,
    pub policies_copied: usize,
    pub items_updated: usize,
}

impl Progress {
    pub fn has_writes(&self) -> bool {
        self.users_created
            + self.users_deleted
            + self.passwords_set
            + self.policies_copied
            + self.items_updated
            > 0
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} users created, {} users deleted, {} passwords set, {} policies copied, {} items updated",
            self.users_created,
            self.users_deleted,
            self.passwords_set,
            self.policies_copied,
            self.items_updated
        )
    }
}

/// Outcome of [`Migrator::migrate_users`](crate::Migrator::migrate_users).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UserMigrationReport {
    pub created: Vec<String>,
    pub deleted: Vec<String>,
    /// Deletions the operator declined in interactive mode.
    pub kept: Vec<String>,
    pub passwords_set: usize,
    pub policies_copied: usize,
}

impl UserMigrationReport {
    pub fn progress(&self) -> Progress {
        Progress {
            users_created: self.created.len(),
            users_deleted: self.deleted.len(),
            passwords_set: self.passwords_set,
            policies_copied: self.policies_copied,
            items_updated: 0,
        }
    }
}

/// Outcome of
/// [`Migrator::migrate_user_watch_history`](crate::Migrator::migrate_user_watch_history).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WatchHistoryReport {
    pub username: String,
    /// Distinct keys in the source identity index.
    pub indexed: usize,
    /// Target items examined (movies, series, seasons and episodes).
    pub scanned: usize,
    /// Target items with no counterpart in the source index.
    pub unmatched: usize,
    pub in_sync: usize,
    pub updated: usize,
    /// Updates the operator declined in interactive mode.
    pub declined: usize,
}

impl WatchHistoryReport {
    pub fn progress(&self) -> Progress {
        Progress {
            items_updated: self.updated,
            ..Default::default()
        }
    }
}
