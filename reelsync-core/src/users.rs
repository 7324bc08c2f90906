use std::collections::HashSet;

use reelsync_model::{User, UserPolicy};

/// Symmetric difference of two user lists, joined on exact display name.
///
/// Users present on both sides appear in neither list; the order of each
/// list follows its input.
#[derive(Debug, Clone, PartialEq)]
pub struct UserSetDiff<'a> {
    /// Source users missing from the target.
    pub to_create: Vec<&'a User>,
    /// Target users missing from the source.
    pub to_delete: Vec<&'a User>,
}

impl<'a> UserSetDiff<'a> {
    pub fn between(source: &'a [User], target: &'a [User]) -> Self {
        let source_names: HashSet<&str> =
            source.iter().map(|user| user.name.as_str()).collect();
        let target_names: HashSet<&str> =
            target.iter().map(|user| user.name.as_str()).collect();

        UserSetDiff {
            to_create: source
                .iter()
                .filter(|user| !target_names.contains(user.name.as_str()))
                .collect(),
            to_delete: target
                .iter()
                .filter(|user| !source_names.contains(user.name.as_str()))
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.to_create.is_empty() && self.to_delete.is_empty()
    }
}

/// Pairs of same-named users, in source order.
pub fn shared_users<'a>(
    source: &'a [User],
    target: &'a [User],
) -> Vec<(&'a User, &'a User)> {
    source
        .iter()
        .filter_map(|from| {
            target
                .iter()
                .find(|into| into.name == from.name)
                .map(|into| (from, into))
        })
        .collect()
}

/// Merge a source policy onto a freshly created target user.
///
/// Folder, channel and device ids and authentication providers are local to
/// a server, so those fields (and anything the model does not know about)
/// keep the target's values; every other flag and limit is taken from the
/// source.
pub fn portable_policy(source: &UserPolicy, target: &UserPolicy) -> UserPolicy {
    UserPolicy {
        enabled_folders: target.enabled_folders.clone(),
        blocked_media_folders: target.blocked_media_folders.clone(),
        enable_content_deletion_from_folders: target
            .enable_content_deletion_from_folders
            .clone(),
        excluded_sub_folders: target.excluded_sub_folders.clone(),
        enabled_channels: target.enabled_channels.clone(),
        blocked_channels: target.blocked_channels.clone(),
        enabled_devices: target.enabled_devices.clone(),
        authentication_provider_id: target.authentication_provider_id.clone(),
        password_reset_provider_id: target.password_reset_provider_id.clone(),
        invalid_login_attempt_count: target.invalid_login_attempt_count,
        extra: target.extra.clone(),
        ..source.clone()
    }
}
