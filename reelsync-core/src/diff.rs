//! Matching target items against the source identity index and deciding
//! which of them need a watch-state write.

use std::collections::HashMap;
use std::fmt;

use reelsync_model::{ItemType, LibraryItem, ProviderIds, UserActivity};

use crate::index::{IdentityIndex, IdentityKey};

/// `SeriesId -> ProviderIds` for every series in a target listing, used to
/// resolve the identity of seasons and episodes.
#[derive(Debug, Clone, Default)]
pub struct SeriesTable {
    series: HashMap<String, ProviderIds>,
}

impl SeriesTable {
    pub fn from_items(items: &[LibraryItem]) -> Self {
        SeriesTable {
            series: items
                .iter()
                .filter(|item| item.item_type == ItemType::Series)
                .map(|item| (item.id.clone(), item.provider_ids.clone()))
                .collect(),
        }
    }

    pub fn provider_ids(&self, series_id: &str) -> Option<&ProviderIds> {
        self.series.get(series_id)
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

/// How a target item was found in the index.
#[derive(Debug, Clone, PartialEq)]
pub enum Match<'a> {
    /// The item's own key was present.
    Exact {
        key: IdentityKey,
        activity: &'a UserActivity,
    },
    /// Only an enclosing season or series key was present, which the index
    /// holds only for containers watched to completion.
    ContainerCompleted { key: IdentityKey },
}

impl Match<'_> {
    pub fn key(&self) -> &IdentityKey {
        match self {
            Match::Exact { key, .. } | Match::ContainerCompleted { key } => key,
        }
    }
}

fn probe<'a>(
    index: &'a IdentityIndex,
    ids: &ProviderIds,
    make_key: impl Fn(&str) -> IdentityKey,
) -> Option<(IdentityKey, &'a UserActivity)> {
    ids.iter().find_map(|(_, pid)| {
        let key = make_key(pid);
        index.get(&key).map(|activity| (key, activity))
    })
}

/// Find the source counterpart of a target item.
///
/// Movies and series probe their own imdb, tmdb and tvdb ids in that order.
/// Seasons and episodes probe season or episode keys derived from their
/// series' ids. An episode then falls back to its season's key, and both
/// fall back to the series' bare key.
pub fn lookup<'a>(
    index: &'a IdentityIndex,
    series: &SeriesTable,
    item: &LibraryItem,
) -> Option<Match<'a>> {
    let exact = |(key, activity): (IdentityKey, &'a UserActivity)| {
        Match::Exact { key, activity }
    };

    match item.item_type {
        ItemType::Movie | ItemType::Series => {
            probe(index, &item.provider_ids, IdentityKey::item).map(exact)
        }
        ItemType::Season | ItemType::Episode => {
            let ids = series.provider_ids(item.series_id.as_deref()?)?;
            let completed = |(key, _): (IdentityKey, &'a UserActivity)| {
                Match::ContainerCompleted { key }
            };
            let series_key = || probe(index, ids, IdentityKey::item).map(completed);
            match item.item_type {
                ItemType::Season => {
                    let season = item.index_number?;
                    probe(index, ids, |pid| IdentityKey::season(pid, season))
                        .map(exact)
                        .or_else(series_key)
                }
                _ => {
                    let season = item.parent_index_number?;
                    let episode = item.index_number?;
                    probe(index, ids, |pid| {
                        IdentityKey::episode(pid, season, episode)
                    })
                    .map(exact)
                    .or_else(|| {
                        probe(index, ids, |pid| IdentityKey::season(pid, season))
                            .map(completed)
                    })
                    .or_else(series_key)
                }
            }
        }
        ItemType::Other(_) => None,
    }
}

/// What should happen to a single target item.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    /// Not a reconciled type, or no counterpart in the source.
    Unmatched,
    InSync,
    Update {
        key: IdentityKey,
        change: ActivityChange,
    },
}

/// Decide whether a target item needs its watch state rewritten.
pub fn decide(
    index: &IdentityIndex,
    series: &SeriesTable,
    item: &LibraryItem,
) -> Decision {
    let Some(found) = lookup(index, series, item) else {
        return Decision::Unmatched;
    };

    let current = item.user_data.clone().unwrap_or_default();
    let desired = match &found {
        Match::Exact { activity, .. } => (*activity).clone(),
        Match::ContainerCompleted { .. } => current.completed(),
    };

    if current.is_match(&desired) {
        Decision::InSync
    } else {
        Decision::Update {
            key: found.key().clone(),
            change: ActivityChange {
                before: current,
                after: desired,
            },
        }
    }
}

/// A pending watch-state write. `Display` renders the operator-facing
/// summary.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityChange {
    pub before: UserActivity,
    pub after: UserActivity,
}

impl fmt::Display for ActivityChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "played: {} -> {}, favorite: {} -> {}, ticks: {} -> {}",
            self.before.played,
            self.after.played,
            self.before.is_favorite,
            self.after.is_favorite,
            self.before.playback_position_ticks,
            self.after.playback_position_ticks
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use reelsync_model::ProviderKind;

    fn watched() -> UserActivity {
        UserActivity {
            played: true,
            play_count: 1,
            ..Default::default()
        }
    }

    fn series(id: &str, imdb: &str) -> LibraryItem {
        LibraryItem {
            id: id.into(),
            item_type: ItemType::Series,
            provider_ids: ProviderIds::default().with(ProviderKind::Imdb, imdb),
            ..Default::default()
        }
    }

    fn episode(series_id: &str, season: i32, number: i32) -> LibraryItem {
        LibraryItem {
            id: format!("{series_id}-{season}-{number}"),
            item_type: ItemType::Episode,
            series_id: Some(series_id.into()),
            parent_index_number: Some(season),
            index_number: Some(number),
            user_data: Some(UserActivity::default()),
            ..Default::default()
        }
    }

    #[test]
    fn movies_probe_imdb_before_tmdb() {
        let index: IdentityIndex = [
            (IdentityKey::item("tt1"), watched()),
            (
                IdentityKey::item("603"),
                UserActivity {
                    is_favorite: true,
                    ..watched()
                },
            ),
        ]
        .into_iter()
        .collect();

        let movie = LibraryItem {
            item_type: ItemType::Movie,
            provider_ids: ProviderIds::default()
                .with(ProviderKind::Tmdb, "603")
                .with(ProviderKind::Imdb, "tt1"),
            ..Default::default()
        };

        let found = lookup(&index, &SeriesTable::default(), &movie).unwrap();
        assert_eq!(found.key().as_str(), "tt1");
    }

    #[test]
    fn episodes_resolve_through_series_table() {
        let show = series("s1", "tt0903747");
        let index: IdentityIndex =
            [(IdentityKey::episode("tt0903747", 2, 3), watched())]
                .into_iter()
                .collect();
        let table = SeriesTable::from_items(&[show]);

        let decision = decide(&index, &table, &episode("s1", 2, 3));
        match decision {
            Decision::Update { key, change } => {
                assert_eq!(key.as_str(), "tt0903747-2-3");
                assert!(change.after.played);
            }
            other => panic!("expected update, got {other:?}"),
        }

        assert_eq!(decide(&index, &table, &episode("s1", 2, 4)), Decision::Unmatched);
        assert_eq!(
            decide(&index, &SeriesTable::default(), &episode("s1", 2, 3)),
            Decision::Unmatched
        );
    }

    #[test]
    fn completed_series_marks_missing_episodes_played() {
        let show = series("s1", "tt0903747");
        let index: IdentityIndex = [(
            IdentityKey::item("tt0903747"),
            UserActivity {
                played_percentage: Some(100.0),
                ..watched()
            },
        )]
        .into_iter()
        .collect();
        let table = SeriesTable::from_items(&[show]);

        let mut target = episode("s1", 1, 1);
        target.user_data = Some(UserActivity {
            playback_position_ticks: 5_000,
            is_favorite: true,
            ..Default::default()
        });

        let Decision::Update { key, change } = decide(&index, &table, &target) else {
            panic!("expected update");
        };
        assert_eq!(key.as_str(), "tt0903747");
        assert!(change.after.played);
        assert_eq!(change.after.playback_position_ticks, 0);
        assert_eq!(change.after.play_count, 1);
        assert!(change.after.is_favorite);

        let mut done = episode("s1", 1, 2);
        done.user_data = Some(watched());
        assert_eq!(decide(&index, &table, &done), Decision::InSync);
    }

    #[test]
    fn episodes_of_a_completed_season_are_marked_played() {
        let show = series("s1", "tt1");
        let index: IdentityIndex = [
            (
                IdentityKey::season("tt1", 1),
                UserActivity {
                    played_percentage: Some(100.0),
                    ..watched()
                },
            ),
            (IdentityKey::episode("tt1", 2, 1), watched()),
        ]
        .into_iter()
        .collect();
        let table = SeriesTable::from_items(&[show]);

        let Decision::Update { key, change } = decide(&index, &table, &episode("s1", 1, 4))
        else {
            panic!("expected update");
        };
        assert_eq!(key.as_str(), "tt1-1");
        assert!(change.after.played);
        assert_eq!(change.after.play_count, 1);

        // Other seasons do not inherit the completed season.
        assert_eq!(decide(&index, &table, &episode("s1", 2, 2)), Decision::Unmatched);
        assert!(matches!(
            lookup(&index, &table, &episode("s1", 2, 1)),
            Some(Match::Exact { .. })
        ));
    }

    #[test]
    fn matching_state_is_in_sync() {
        let index: IdentityIndex =
            [(IdentityKey::item("tt1"), watched())].into_iter().collect();
        let movie = LibraryItem {
            item_type: ItemType::Movie,
            provider_ids: ProviderIds::default().with(ProviderKind::Imdb, "tt1"),
            user_data: Some(watched()),
            ..Default::default()
        };

        assert_eq!(decide(&index, &SeriesTable::default(), &movie), Decision::InSync);
    }

    #[test]
    fn other_types_are_ignored() {
        let index: IdentityIndex =
            [(IdentityKey::item("tt1"), watched())].into_iter().collect();
        let folder = LibraryItem {
            item_type: ItemType::Other("BoxSet".into()),
            provider_ids: ProviderIds::default().with(ProviderKind::Imdb, "tt1"),
            ..Default::default()
        };

        assert_eq!(decide(&index, &SeriesTable::default(), &folder), Decision::Unmatched);
    }

    #[test]
    fn change_summary_lists_before_and_after() {
        let change = ActivityChange {
            before: UserActivity::default(),
            after: UserActivity {
                played: true,
                playback_position_ticks: 10,
                ..Default::default()
            },
        };
        assert_eq!(
            change.to_string(),
            "played: false -> true, favorite: false -> false, ticks: 0 -> 10"
        );
    }
}
