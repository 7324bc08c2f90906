use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-item, per-user playback snapshot (`UserData` on the wire).
///
/// `played_percentage` and `unplayed_item_count` are only reported for
/// container items (series and seasons).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct UserActivity {
    pub playback_position_ticks: i64,
    pub play_count: i32,
    pub is_favorite: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_played_date: Option<DateTime<Utc>>,
    pub played: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unplayed_item_count: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub played_percentage: Option<f64>,
}

impl UserActivity {
    /// A container is fully played when the played flag is set and the
    /// aggregate played percentage is exactly 100.
    ///
    /// Leaf items never report a percentage; use [`UserActivity::played`]
    /// for those.
    pub fn is_fully_played(&self) -> bool {
        self.played && self.played_percentage == Some(100.0)
    }

    /// Two snapshots match when everything a migration would write is
    /// equal. `last_played_date` and the container counters are ignored.
    pub fn is_match(&self, other: &UserActivity) -> bool {
        self.is_favorite == other.is_favorite
            && self.played == other.played
            && self.play_count == other.play_count
            && self.playback_position_ticks == other.playback_position_ticks
            && self.rating == other.rating
    }

    /// Copy of this snapshot marked as watched to completion.
    ///
    /// Resume position is cleared and the play count is raised to at least
    /// one; favorite and rating are kept as they are.
    pub fn completed(&self) -> UserActivity {
        UserActivity {
            played: true,
            playback_position_ticks: 0,
            play_count: self.play_count.max(1),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn watched() -> UserActivity {
        UserActivity {
            playback_position_ticks: 0,
            play_count: 2,
            is_favorite: true,
            played: true,
            rating: Some(8.5),
            ..Default::default()
        }
    }

    #[test]
    fn match_is_reflexive_and_symmetric() {
        let a = watched();
        let b = UserActivity {
            played: false,
            ..watched()
        };

        assert!(a.is_match(&a));
        assert!(b.is_match(&b));
        assert_eq!(a.is_match(&b), b.is_match(&a));
        assert!(!a.is_match(&b));
    }

    #[test]
    fn match_ignores_dates_and_counters() {
        let a = watched();
        let b = UserActivity {
            last_played_date: Some(Utc::now()),
            unplayed_item_count: Some(3),
            played_percentage: Some(40.0),
            ..watched()
        };

        assert!(a.is_match(&b));
    }

    #[test]
    fn match_compares_rating_and_ticks() {
        let a = watched();
        assert!(!a.is_match(&UserActivity {
            rating: None,
            ..watched()
        }));
        assert!(!a.is_match(&UserActivity {
            playback_position_ticks: 10,
            ..watched()
        }));
    }

    #[test]
    fn fully_played_needs_flag_and_full_percentage() {
        let mut activity = UserActivity {
            played: true,
            played_percentage: Some(100.0),
            ..Default::default()
        };
        assert!(activity.is_fully_played());

        activity.played_percentage = Some(99.5);
        assert!(!activity.is_fully_played());

        activity.played_percentage = None;
        assert!(!activity.is_fully_played());

        activity.played = false;
        activity.played_percentage = Some(100.0);
        assert!(!activity.is_fully_played());
    }

    #[test]
    fn completed_resets_position_and_keeps_preferences() {
        let in_progress = UserActivity {
            playback_position_ticks: 9_000,
            is_favorite: true,
            rating: Some(7.0),
            ..Default::default()
        };

        let done = in_progress.completed();
        assert!(done.played);
        assert_eq!(done.playback_position_ticks, 0);
        assert_eq!(done.play_count, 1);
        assert!(done.is_favorite);
        assert_eq!(done.rating, Some(7.0));
    }

    #[test]
    fn decodes_wire_user_data() {
        let raw = r#"{
            "PlaybackPositionTicks": 12345,
            "PlayCount": 1,
            "IsFavorite": false,
            "LastPlayedDate": "2023-04-01T20:11:02.1234567Z",
            "Played": true,
            "Key": "tt1160419",
            "ItemId": "00000000000000000000000000000000"
        }"#;

        let activity: UserActivity = serde_json::from_str(raw).unwrap();
        assert_eq!(activity.playback_position_ticks, 12345);
        assert!(activity.played);
        assert!(activity.last_played_date.is_some());
        assert_eq!(activity.rating, None);
    }
}
