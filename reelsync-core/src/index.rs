//! Content-identity index of one user's watch state.
//!
//! Item ids are local to a server, so the two libraries are joined on
//! external provider ids instead. Movies and series are keyed by the bare
//! provider id, seasons by `"{pid}-{season}"` and episodes by
//! `"{pid}-{season}-{episode}"`, where `pid` is the owning series' id.

use std::collections::{HashMap, VecDeque};
use std::fmt;

use reelsync_contracts::{ApiKey, LibraryService, item_filters};
use reelsync_model::{
    ItemFilter, ItemType, LibraryItem, ProviderIds, UserActivity,
};
use tracing::{debug, trace};

use crate::error::{Result, ServiceResultExt};

/// Synthetic cross-server join key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IdentityKey(String);

impl IdentityKey {
    /// Key for a movie or series.
    pub fn item(provider_id: &str) -> Self {
        IdentityKey(provider_id.to_string())
    }

    pub fn season(series_provider_id: &str, season: i32) -> Self {
        IdentityKey(format!("{series_provider_id}-{season}"))
    }

    pub fn episode(series_provider_id: &str, season: i32, episode: i32) -> Self {
        IdentityKey(format!("{series_provider_id}-{season}-{episode}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Read-only lookup table from [`IdentityKey`] to a source activity snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IdentityIndex {
    entries: HashMap<IdentityKey, UserActivity>,
}

impl IdentityIndex {
    pub fn get(&self, key: &IdentityKey) -> Option<&UserActivity> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &IdentityKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&IdentityKey, &UserActivity)> {
        self.entries.iter()
    }

    fn insert_all(
        &mut self,
        keys: impl Iterator<Item = IdentityKey>,
        activity: &UserActivity,
    ) {
        for key in keys {
            trace!(%key, "indexed");
            self.entries.insert(key, activity.clone());
        }
    }
}

impl FromIterator<(IdentityKey, UserActivity)> for IdentityIndex {
    fn from_iter<T: IntoIterator<Item = (IdentityKey, UserActivity)>>(
        iter: T,
    ) -> Self {
        IdentityIndex {
            entries: iter.into_iter().collect(),
        }
    }
}

struct Pending {
    item: LibraryItem,
    /// Provider ids of the owning series, for seasons and episodes.
    series_ids: Option<ProviderIds>,
}

/// Build the identity index for `user_id` from its top-level movies and
/// series.
///
/// Containers that are fully played are indexed as a whole; anything else
/// is expanded one level at a time through `ParentId` queries, so the number
/// of reads equals the number of partially played containers visited.
/// Containers without any provider id are not expanded because nothing
/// below them could be keyed.
pub async fn build_index<L>(
    library: &L,
    key: &ApiKey,
    user_id: &str,
    roots: Vec<LibraryItem>,
) -> Result<IdentityIndex>
where
    L: LibraryService + ?Sized,
{
    let mut index = IdentityIndex::default();
    let mut queue: VecDeque<Pending> = roots
        .into_iter()
        .map(|item| Pending {
            item,
            series_ids: None,
        })
        .collect();
    let mut expanded = 0usize;

    while let Some(Pending { item, series_ids }) = queue.pop_front() {
        let expand = match item.item_type {
            ItemType::Movie => {
                if let Some(activity) = &item.user_data {
                    index.insert_all(
                        item.provider_ids.iter().map(|(_, pid)| IdentityKey::item(pid)),
                        activity,
                    );
                }
                None
            }
            ItemType::Series => {
                if item.provider_ids.is_empty() {
                    debug!(series = %item.name, "no provider ids, skipping");
                    None
                } else if let Some(activity) = item
                    .user_data
                    .as_ref()
                    .filter(|activity| activity.is_fully_played())
                {
                    index.insert_all(
                        item.provider_ids.iter().map(|(_, pid)| IdentityKey::item(pid)),
                        activity,
                    );
                    None
                } else {
                    Some(item.provider_ids.clone())
                }
            }
            ItemType::Season => match (series_ids, item.index_number) {
                (Some(ids), Some(season)) if !ids.is_empty() => {
                    match item
                        .user_data
                        .as_ref()
                        .filter(|activity| activity.is_fully_played())
                    {
                        Some(activity) => {
                            index.insert_all(
                                ids.iter()
                                    .map(|(_, pid)| IdentityKey::season(pid, season)),
                                activity,
                            );
                            None
                        }
                        None => Some(ids),
                    }
                }
                _ => {
                    debug!(season = %item.name, "season without series identity, skipping");
                    None
                }
            },
            ItemType::Episode => {
                match (
                    series_ids,
                    item.parent_index_number,
                    item.index_number,
                    &item.user_data,
                ) {
                    (Some(ids), Some(season), Some(episode), Some(activity)) => {
                        index.insert_all(
                            ids.iter().map(|(_, pid)| {
                                IdentityKey::episode(pid, season, episode)
                            }),
                            activity,
                        );
                    }
                    _ => {
                        trace!(episode = %item.name, "episode not indexable");
                    }
                }
                None
            }
            ItemType::Other(ref kind) => {
                trace!(item = %item.name, %kind, "ignoring item type");
                None
            }
        };

        if let Some(series_ids) = expand {
            let filters = item_filters(library, [(ItemFilter::ParentId, item.id.as_str())]);
            let children = library
                .items_by_user(key, user_id, &filters)
                .await
                .during("items_by_user", format!("children of {}", item.name))?;
            expanded += 1;
            debug!(
                container = %item.name,
                children = children.len(),
                "expanded partially played container"
            );
            queue.extend(children.into_iter().map(|child| Pending {
                item: child,
                series_ids: Some(series_ids.clone()),
            }));
        }
    }

    debug!(keys = index.len(), expanded, "identity index built");
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::*;
    use reelsync_contracts::MockLibraryService;
    use reelsync_model::ProviderKind;

    fn ids(imdb: &str, tvdb: &str) -> ProviderIds {
        ProviderIds::default()
            .with(ProviderKind::Imdb, imdb)
            .with(ProviderKind::Tvdb, tvdb)
    }

    fn played(pct: Option<f64>) -> UserActivity {
        UserActivity {
            played: true,
            play_count: 1,
            played_percentage: pct,
            ..Default::default()
        }
    }

    fn item(id: &str, item_type: ItemType, provider_ids: ProviderIds) -> LibraryItem {
        LibraryItem {
            id: id.into(),
            name: id.into(),
            item_type,
            provider_ids,
            ..Default::default()
        }
    }

    fn library() -> MockLibraryService {
        let mut library = MockLibraryService::new();
        library.expect_filter_name().returning(|filter| match filter {
            ItemFilter::ParentId => "ParentId",
            _ => "Other",
        });
        library
    }

    fn parent(id: &str) -> reelsync_model::ItemFilters {
        [("ParentId".to_string(), id.to_string())].into_iter().collect()
    }

    #[test]
    fn keys_are_deterministic() {
        assert_eq!(IdentityKey::item("tt1").as_str(), "tt1");
        assert_eq!(IdentityKey::season("tt1", 2).as_str(), "tt1-2");
        assert_eq!(IdentityKey::episode("tt1", 2, 5).as_str(), "tt1-2-5");
        assert_eq!(IdentityKey::season("tt1", 2), IdentityKey::season("tt1", 2));
    }

    #[tokio::test]
    async fn movies_are_multi_keyed() {
        let mut movie = item("m1", ItemType::Movie, ids("tt0133093", "169"));
        movie.user_data = Some(played(None));

        let index = build_index(&library(), &ApiKey::new("k"), "u", vec![movie])
            .await
            .unwrap();

        assert_eq!(index.len(), 2);
        assert_eq!(
            index.get(&IdentityKey::item("tt0133093")),
            index.get(&IdentityKey::item("169"))
        );
    }

    #[tokio::test]
    async fn fully_played_series_is_not_expanded() {
        let mut series = item("s1", ItemType::Series, ids("tt0903747", "81189"));
        series.user_data = Some(played(Some(100.0)));

        let mut library = library();
        library.expect_items_by_user().times(0);

        let index = build_index(&library, &ApiKey::new("k"), "u", vec![series])
            .await
            .unwrap();

        assert_eq!(index.len(), 2);
        assert!(index.contains(&IdentityKey::item("tt0903747")));
        assert!(index.contains(&IdentityKey::item("81189")));
    }

    #[tokio::test]
    async fn partial_series_expands_to_seasons_and_episodes() {
        let mut series = item("s1", ItemType::Series, ids("tt0903747", "81189"));
        series.user_data = Some(played(Some(50.0)));
        series.user_data.as_mut().unwrap().played = false;

        let mut season1 = item("se1", ItemType::Season, ProviderIds::default());
        season1.index_number = Some(1);
        season1.user_data = Some(played(Some(100.0)));

        let mut season2 = item("se2", ItemType::Season, ProviderIds::default());
        season2.index_number = Some(2);
        season2.user_data = Some(UserActivity {
            played_percentage: Some(50.0),
            ..Default::default()
        });

        let mut episode = item("e1", ItemType::Episode, ProviderIds::default());
        episode.parent_index_number = Some(2);
        episode.index_number = Some(3);
        episode.user_data = Some(UserActivity {
            playback_position_ticks: 42,
            ..Default::default()
        });

        let mut library = library();
        library
            .expect_items_by_user()
            .with(always(), eq("u"), eq(parent("s1")))
            .times(1)
            .return_once(move |_, _, _| Ok(vec![season1, season2]));
        library
            .expect_items_by_user()
            .with(always(), eq("u"), eq(parent("se2")))
            .times(1)
            .return_once(move |_, _, _| Ok(vec![episode]));

        let index = build_index(&library, &ApiKey::new("k"), "u", vec![series])
            .await
            .unwrap();

        assert!(!index.contains(&IdentityKey::item("tt0903747")));
        assert!(index.contains(&IdentityKey::season("tt0903747", 1)));
        assert!(index.contains(&IdentityKey::season("81189", 1)));
        assert!(!index.contains(&IdentityKey::season("tt0903747", 2)));
        assert_eq!(
            index
                .get(&IdentityKey::episode("81189", 2, 3))
                .map(|a| a.playback_position_ticks),
            Some(42)
        );
        assert_eq!(index.len(), 4);
    }

    #[tokio::test]
    async fn series_without_provider_ids_is_not_fetched() {
        let series = item("s1", ItemType::Series, ProviderIds::default());

        let mut library = library();
        library.expect_items_by_user().times(0);

        let index = build_index(&library, &ApiKey::new("k"), "u", vec![series])
            .await
            .unwrap();
        assert!(index.is_empty());
    }

    #[tokio::test]
    async fn orphan_episodes_and_unwatched_movies_contribute_nothing() {
        let mut episode = item("e1", ItemType::Episode, ids("tt1", "1"));
        episode.parent_index_number = Some(1);
        episode.index_number = Some(1);
        episode.user_data = Some(played(None));
        let movie = item("m1", ItemType::Movie, ids("tt2", "2"));

        let index = build_index(&library(), &ApiKey::new("k"), "u", vec![episode, movie])
            .await
            .unwrap();
        assert!(index.is_empty());
    }

    #[tokio::test]
    async fn fetch_errors_name_the_container() {
        let series = item("s1", ItemType::Series, ids("tt1", "1"));

        let mut library = library();
        library.expect_items_by_user().returning(|_, _, _| {
            Err(reelsync_contracts::ServiceError::NotFound("s1".into()))
        });

        let err = build_index(&library, &ApiKey::new("k"), "u", vec![series])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("children of s1"));
    }
}
