use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::io;
use std::sync::Arc;
use std::time::Duration;

use reelsync_contracts::{
    AdminKey, ApiKey, MediaServer, UserService, item_filters,
};
use reelsync_model::{ItemFilter, ItemType, User};
use serde::Serialize;
use similar::TextDiff;
use tracing::{debug, info, instrument, warn};

use crate::clock::PromptClock;
use crate::confirm::{AlwaysConfirm, Confirm};
use crate::diff::{Decision, SeriesTable, decide};
use crate::error::{MigrateError, Result, ServiceResultExt, Side};
use crate::index::build_index;
use crate::report::{Progress, UserMigrationReport, WatchHistoryReport};
use crate::users::{UserSetDiff, portable_policy, shared_users};

const SOURCE_ITEM_TYPES: &str = "Movie,Series";
const TARGET_ITEM_TYPES: &str = "Movie,Series,Season,Episode";

/// Knobs for a migration run.
#[derive(Clone, Default)]
pub struct MigrateOptions {
    /// Ask before every deletion and watch-state write.
    pub interactive: bool,
    /// Upper bound on the whole run.
    pub deadline: Option<Duration>,
    /// Initial passwords for users created on the target, keyed by name.
    pub passwords: BTreeMap<String, String>,
    /// Copy each created user's policy from its source account.
    pub copy_policy: bool,
}

impl fmt::Debug for MigrateOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MigrateOptions")
            .field("interactive", &self.interactive)
            .field("deadline", &self.deadline)
            .field("passwords", &self.passwords.keys().collect::<Vec<_>>())
            .field("copy_policy", &self.copy_policy)
            .finish()
    }
}

/// Drives a one-shot migration from one server into another.
///
/// Every call is awaited before the next one starts and the first failure
/// aborts the run. Failures after the target has been written to are
/// reported as [`MigrateError::Interrupted`] with the progress reached.
pub struct Migrator<F, I> {
    from: F,
    from_admin: AdminKey,
    into: I,
    into_admin: AdminKey,
    options: MigrateOptions,
    confirm: Arc<dyn Confirm>,
    clock: PromptClock,
}

impl<F: MediaServer, I: MediaServer> fmt::Debug for Migrator<F, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Migrator")
            .field("from", &self.from.backend())
            .field("into", &self.into.backend())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl<F: MediaServer, I: MediaServer> Migrator<F, I> {
    pub fn new(
        from: F,
        from_admin: AdminKey,
        into: I,
        into_admin: AdminKey,
    ) -> Self {
        Self {
            from,
            from_admin,
            into,
            into_admin,
            options: MigrateOptions::default(),
            confirm: Arc::new(AlwaysConfirm),
            clock: PromptClock::default(),
        }
    }

    pub fn with_options(mut self, options: MigrateOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_confirm(mut self, confirm: impl Confirm + 'static) -> Self {
        self.confirm = Arc::new(confirm);
        self
    }

    pub fn options(&self) -> &MigrateOptions {
        &self.options
    }

    pub fn source(&self) -> &F {
        &self.from
    }

    pub fn target(&self) -> &I {
        &self.into
    }

    /// Make the target's user set match the source's: create users missing
    /// on the target, then delete users the source does not have.
    #[instrument(skip(self), fields(from = %self.from.backend(), into = %self.into.backend()))]
    pub async fn migrate_users(&self) -> Result<UserMigrationReport> {
        let mut report = UserMigrationReport::default();
        let outcome = self.bounded(self.sync_users(&mut report)).await;
        match outcome {
            Ok(()) => {
                info!(
                    created = report.created.len(),
                    deleted = report.deleted.len(),
                    kept = report.kept.len(),
                    "user migration finished"
                );
                Ok(report)
            }
            Err(err) => Err(interrupted(report.progress(), err)),
        }
    }

    async fn sync_users(&self, report: &mut UserMigrationReport) -> Result<()> {
        let source =
            list_users(&self.from, self.from_admin.api_key(), Side::Source)
                .await?;
        let target =
            list_users(&self.into, self.into_admin.api_key(), Side::Target)
                .await?;

        let diff = UserSetDiff::between(&source, &target);
        debug!(
            create = diff.to_create.len(),
            delete = diff.to_delete.len(),
            "compared user sets"
        );

        for user in &diff.to_create {
            let created = self
                .into
                .create_user(&self.into_admin, &user.name)
                .await
                .during("create_user", format_user(&user.name))?;
            info!(user = %created.name, id = %created.id, "created user");
            report.created.push(created.name.clone());

            if let Some(password) = self.options.passwords.get(&user.name) {
                self.into
                    .update_password(
                        &self.into_admin,
                        &created.id,
                        "",
                        password,
                        false,
                    )
                    .await
                    .during("update_password", format_user(&created.name))?;
                report.passwords_set += 1;
            }

            if self.options.copy_policy {
                let policy = portable_policy(&user.policy, &created.policy);
                self.into
                    .update_policy(&self.into_admin, &created.id, &policy)
                    .await
                    .during("update_policy", format_user(&created.name))?;
                report.policies_copied += 1;
            }
        }

        for user in &diff.to_delete {
            let prompt = format!(
                "Delete user {} from {}?",
                user.name,
                self.into.backend()
            );
            if !self.approve(&prompt).await? {
                info!(user = %user.name, "kept user");
                report.kept.push(user.name.clone());
                continue;
            }

            self.into
                .delete_user(&self.into_admin, &user.id)
                .await
                .during("delete_user", format_user(&user.name))?;
            info!(user = %user.name, id = %user.id, "deleted user");
            report.deleted.push(user.name.clone());
        }

        Ok(())
    }

    /// Render the user-set difference, one `-name` line per source-only
    /// user and one `+name` line per target-only user.
    ///
    /// With `full`, users on both sides also get a unified diff of their
    /// policy and configuration records.
    #[instrument(skip(self))]
    pub async fn diff_users(&self, full: bool) -> Result<String> {
        self.bounded(self.render_user_diff(full)).await
    }

    async fn render_user_diff(&self, full: bool) -> Result<String> {
        let source =
            list_users(&self.from, self.from_admin.api_key(), Side::Source)
                .await?;
        let target =
            list_users(&self.into, self.into_admin.api_key(), Side::Target)
                .await?;

        let diff = UserSetDiff::between(&source, &target);
        let mut out = String::new();
        for user in &diff.to_create {
            out.push_str(&format!("-{}\n", user.name));
        }
        for user in &diff.to_delete {
            out.push_str(&format!("+{}\n", user.name));
        }

        if full {
            for (from, into) in shared_users(&source, &target) {
                render_record(&mut out, &from.name, "policy", &from.policy, &into.policy)?;
                render_record(
                    &mut out,
                    &from.name,
                    "configuration",
                    &from.configuration,
                    &into.configuration,
                )?;
            }
        }

        Ok(out)
    }

    /// Copy `username`'s watch state from the source into the target.
    ///
    /// Target items without a counterpart in the source are never touched.
    #[instrument(skip(self), fields(from = %self.from.backend(), into = %self.into.backend()))]
    pub async fn migrate_user_watch_history(
        &self,
        username: &str,
    ) -> Result<WatchHistoryReport> {
        let mut report = WatchHistoryReport {
            username: username.to_string(),
            ..Default::default()
        };
        let outcome = self
            .bounded(self.sync_watch_history(username, &mut report))
            .await;
        match outcome {
            Ok(()) => {
                info!(
                    scanned = report.scanned,
                    updated = report.updated,
                    unmatched = report.unmatched,
                    "watch history migration finished"
                );
                Ok(report)
            }
            Err(err) => Err(interrupted(report.progress(), err)),
        }
    }

    async fn sync_watch_history(
        &self,
        username: &str,
        report: &mut WatchHistoryReport,
    ) -> Result<()> {
        let from_key = self.from_admin.api_key();
        let into_key = self.into_admin.api_key();

        let from_user =
            find_user(&self.from, from_key, username, Side::Source).await?;
        let into_user =
            find_user(&self.into, into_key, username, Side::Target).await?;

        let filters = item_filters(
            &self.from,
            [
                (ItemFilter::Recursive, "true"),
                (ItemFilter::IncludeItemTypes, SOURCE_ITEM_TYPES),
            ],
        );
        let roots = self
            .from
            .items_by_user(from_key, &from_user.id, &filters)
            .await
            .during("items_by_user", format_user(username))?;
        debug!(roots = roots.len(), "fetched source library");

        let index = build_index(&self.from, from_key, &from_user.id, roots).await?;
        report.indexed = index.len();
        if index.is_empty() {
            warn!(user = %username, "source user has no indexable watch history");
        }

        let filters = item_filters(
            &self.into,
            [
                (ItemFilter::Recursive, "true"),
                (ItemFilter::IncludeItemTypes, TARGET_ITEM_TYPES),
            ],
        );
        let items = self
            .into
            .items_by_user(into_key, &into_user.id, &filters)
            .await
            .during("items_by_user", format_user(username))?;
        let series = SeriesTable::from_items(&items);
        debug!(items = items.len(), series = series.len(), "fetched target library");

        for item in &items {
            if let ItemType::Other(kind) = &item.item_type {
                debug!(item = %item.name, %kind, "skipping unsupported item type");
                continue;
            }
            report.scanned += 1;

            match decide(&index, &series, item) {
                Decision::Unmatched => report.unmatched += 1,
                Decision::InSync => report.in_sync += 1,
                Decision::Update { key, change } => {
                    let prompt = format!(
                        "Update {} ({}): {}?",
                        item.name, item.item_type, change
                    );
                    if !self.approve(&prompt).await? {
                        report.declined += 1;
                        continue;
                    }

                    self.into
                        .update_item_user_activity(
                            into_key,
                            &item.id,
                            &into_user.id,
                            &change.before,
                            &change.after,
                        )
                        .await
                        .during(
                            "update_item_user_activity",
                            format!("item {} ({})", item.name, item.id),
                        )?;
                    info!(item = %item.name, %key, %change, "updated watch state");
                    report.updated += 1;
                }
            }
        }

        Ok(())
    }

    /// Ask the operator on a blocking thread. The deadline is paused until
    /// the answer arrives.
    async fn approve(&self, prompt: &str) -> Result<bool> {
        if !self.options.interactive {
            return Ok(true);
        }
        let confirm = Arc::clone(&self.confirm);
        let prompt = prompt.to_string();
        let _paused = self.clock.pause();
        tokio::task::spawn_blocking(move || confirm.confirm(&prompt))
            .await
            .map_err(|err| MigrateError::Prompt(io::Error::other(err)))?
            .map_err(MigrateError::Prompt)
    }

    async fn bounded<T>(&self, work: impl Future<Output = Result<T>>) -> Result<T> {
        match self.options.deadline {
            Some(limit) => self.clock.bound(limit, work).await,
            None => work.await,
        }
    }
}

async fn list_users<S>(server: &S, key: &ApiKey, side: Side) -> Result<Vec<User>>
where
    S: UserService + ?Sized,
{
    server
        .users(key, false)
        .await
        .during("users", format!("{side} server"))
}

/// Resolve a user by exact display name.
async fn find_user<S>(
    server: &S,
    key: &ApiKey,
    username: &str,
    side: Side,
) -> Result<User>
where
    S: UserService + ?Sized,
{
    list_users(server, key, side)
        .await?
        .into_iter()
        .find(|user| user.name == username)
        .ok_or_else(|| MigrateError::UserNotFound {
            side,
            username: username.to_string(),
        })
}

fn format_user(name: &str) -> String {
    format!("user {name}")
}

fn interrupted(progress: Progress, err: MigrateError) -> MigrateError {
    if progress.has_writes() {
        warn!(%progress, "migration stopped part way");
        MigrateError::Interrupted {
            progress,
            source: Box::new(err),
        }
    } else {
        err
    }
}

fn render_record<T: Serialize>(
    out: &mut String,
    name: &str,
    section: &str,
    source: &T,
    target: &T,
) -> Result<()> {
    let old = serde_json::to_string_pretty(source)?;
    let new = serde_json::to_string_pretty(target)?;
    if old == new {
        return Ok(());
    }

    let old_header = format!("{}/{name}/{section}", Side::Source);
    let new_header = format!("{}/{name}/{section}", Side::Target);
    let diff = TextDiff::from_lines(&old, &new);
    out.push_str(
        &diff
            .unified_diff()
            .context_radius(2)
            .header(&old_header, &new_header)
            .to_string(),
    );
    Ok(())
}
