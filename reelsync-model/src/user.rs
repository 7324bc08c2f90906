use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Day selector for parental-control access schedules.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DayOfWeek {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    #[default]
    Everyday,
    Weekday,
    Weekend,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct AccessSchedule {
    pub day_of_week: DayOfWeek,
    pub start_hour: f64,
    pub end_hour: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubtitleMode {
    #[default]
    Default,
    Always,
    OnlyForced,
    None,
    Smart,
}

/// Administrative policy attached to a user.
///
/// Updates overwrite the whole record on both servers, so fields this type
/// does not model are captured in `extra` and written back untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct UserPolicy {
    pub is_administrator: bool,
    pub is_hidden: bool,
    pub is_hidden_remotely: bool,
    pub is_hidden_from_unused_devices: bool,
    pub is_disabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_parental_rating: Option<i32>,
    pub blocked_tags: Vec<String>,
    pub is_tag_blocking_mode_inclusive: bool,
    pub enable_user_preference_access: bool,
    pub access_schedules: Vec<AccessSchedule>,
    pub block_unrated_items: Vec<String>,
    pub enable_remote_control_of_other_users: bool,
    pub enable_shared_device_control: bool,
    pub enable_remote_access: bool,
    pub enable_live_tv_management: bool,
    pub enable_live_tv_access: bool,
    pub enable_media_playback: bool,
    pub enable_audio_playback_transcoding: bool,
    pub enable_video_playback_transcoding: bool,
    pub enable_playback_remuxing: bool,
    pub enable_content_deletion: bool,
    pub enable_content_deletion_from_folders: Vec<String>,
    pub enable_content_downloading: bool,
    pub enable_subtitle_downloading: bool,
    pub enable_subtitle_management: bool,
    pub enable_sync_transcoding: bool,
    pub enable_media_conversion: bool,
    pub enabled_channels: Vec<String>,
    pub enable_all_channels: bool,
    pub enabled_folders: Vec<String>,
    pub enable_all_folders: bool,
    pub invalid_login_attempt_count: i32,
    pub enable_public_sharing: bool,
    pub blocked_media_folders: Vec<String>,
    pub blocked_channels: Vec<String>,
    pub remote_client_bitrate_limit: i32,
    pub authentication_provider_id: String,
    /// Jellyfin only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_reset_provider_id: Option<String>,
    pub excluded_sub_folders: Vec<String>,
    pub simultaneous_stream_limit: i32,
    pub enabled_devices: Vec<String>,
    pub enable_all_devices: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Per-user client preferences.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct UserConfiguration {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_language_preference: Option<String>,
    pub play_default_audio_track: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle_language_preference: Option<String>,
    pub display_missing_episodes: bool,
    pub subtitle_mode: SubtitleMode,
    pub enable_local_password: bool,
    pub ordered_views: Vec<String>,
    pub latest_items_excludes: Vec<String>,
    pub my_media_excludes: Vec<String>,
    pub hide_played_in_latest: bool,
    pub remember_audio_selections: bool,
    pub remember_subtitle_selections: bool,
    pub enable_next_episode_auto_play: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A server account. `name` is the join key across servers; `id` is only
/// meaningful on the server that issued it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct User {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_name: Option<String>,
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_image_tag: Option<String>,
    pub has_password: bool,
    pub has_configured_password: bool,
    pub has_configured_easy_password: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_auto_login: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_activity_date: Option<DateTime<Utc>>,
    pub configuration: UserConfiguration,
    pub policy: UserPolicy,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_image_aspect_ratio: Option<f64>,
}

impl User {
    /// Minimal user record, mostly useful for fixtures.
    pub fn named(id: impl Into<String>, name: impl Into<String>) -> Self {
        User {
            id: id.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn is_administrator(&self) -> bool {
        self.policy.is_administrator
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_round_trips_unknown_fields() {
        let raw = serde_json::json!({
            "IsAdministrator": true,
            "EnableAllFolders": true,
            "SyncPlayAccess": "CreateAndJoinGroups",
            "AuthenticationProviderId": "Default"
        });

        let policy: UserPolicy = serde_json::from_value(raw).unwrap();
        assert!(policy.is_administrator);
        assert_eq!(
            policy.extra.get("SyncPlayAccess"),
            Some(&Value::String("CreateAndJoinGroups".into()))
        );

        let back = serde_json::to_value(&policy).unwrap();
        assert_eq!(back["SyncPlayAccess"], "CreateAndJoinGroups");
        assert_eq!(back["AuthenticationProviderId"], "Default");
    }

    #[test]
    fn decodes_user_with_schedules() {
        let raw = r#"{
            "Name": "alice",
            "Id": "4c7a",
            "HasPassword": true,
            "LastLoginDate": "2023-11-02T08:15:00.0000000Z",
            "Configuration": {"SubtitleMode": "Smart"},
            "Policy": {
                "AccessSchedules": [
                    {"DayOfWeek": "Weekend", "StartHour": 8, "EndHour": 22}
                ]
            }
        }"#;

        let user: User = serde_json::from_str(raw).unwrap();
        assert_eq!(user.name, "alice");
        assert_eq!(user.configuration.subtitle_mode, SubtitleMode::Smart);
        assert_eq!(
            user.policy.access_schedules[0].day_of_week,
            DayOfWeek::Weekend
        );
        assert!(!user.is_administrator());
    }
}
