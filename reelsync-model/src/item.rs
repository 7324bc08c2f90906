use std::collections::{BTreeMap, HashMap};
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use crate::activity::UserActivity;

/// The external catalogs used as cross-server join keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProviderKind {
    Imdb,
    Tmdb,
    Tvdb,
}

impl ProviderKind {
    /// Probe order used when matching items across servers.
    pub const ALL: [ProviderKind; 3] =
        [ProviderKind::Imdb, ProviderKind::Tmdb, ProviderKind::Tvdb];

    /// Lower-case provider name as it appears (case-insensitively) in a
    /// `ProviderIds` map.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Imdb => "imdb",
            ProviderKind::Tmdb => "tmdb",
            ProviderKind::Tvdb => "tvdb",
        }
    }

    fn wire_name(&self) -> &'static str {
        match self {
            ProviderKind::Imdb => "Imdb",
            ProviderKind::Tmdb => "Tmdb",
            ProviderKind::Tvdb => "Tvdb",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "imdb" => Some(ProviderKind::Imdb),
            "tmdb" => Some(ProviderKind::Tmdb),
            "tvdb" => Some(ProviderKind::Tvdb),
            _ => None,
        }
    }
}

impl Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// External identifiers of a library item.
///
/// The wire format is a flat `{"Imdb": "tt…", "Tmdb": "…"}` map whose key
/// casing differs between servers; it is flattened into dedicated fields at
/// decode time. Providers other than the three well-known ones are kept in
/// `other` so an item can be written back unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "HashMap<String, String>", into = "BTreeMap<String, String>")]
pub struct ProviderIds {
    pub imdb: Option<String>,
    pub tmdb: Option<String>,
    pub tvdb: Option<String>,
    pub other: BTreeMap<String, String>,
}

impl ProviderIds {
    pub fn get(&self, kind: ProviderKind) -> Option<&str> {
        match kind {
            ProviderKind::Imdb => self.imdb.as_deref(),
            ProviderKind::Tmdb => self.tmdb.as_deref(),
            ProviderKind::Tvdb => self.tvdb.as_deref(),
        }
    }

    pub fn set(&mut self, kind: ProviderKind, id: impl Into<String>) {
        let id = Some(id.into());
        match kind {
            ProviderKind::Imdb => self.imdb = id,
            ProviderKind::Tmdb => self.tmdb = id,
            ProviderKind::Tvdb => self.tvdb = id,
        }
    }

    /// Builder-style variant of [`ProviderIds::set`].
    pub fn with(mut self, kind: ProviderKind, id: impl Into<String>) -> Self {
        self.set(kind, id);
        self
    }

    /// Well-known identifiers in probe order (imdb, tmdb, tvdb).
    pub fn iter(&self) -> impl Iterator<Item = (ProviderKind, &str)> + '_ {
        ProviderKind::ALL
            .into_iter()
            .filter_map(|kind| self.get(kind).map(|id| (kind, id)))
    }

    /// True when none of the well-known identifiers is present.
    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }
}

impl From<HashMap<String, String>> for ProviderIds {
    fn from(raw: HashMap<String, String>) -> Self {
        let mut ids = ProviderIds::default();
        for (name, id) in raw {
            let id = id.trim();
            if id.is_empty() {
                continue;
            }
            match ProviderKind::from_name(&name) {
                Some(kind) => ids.set(kind, id),
                None => {
                    ids.other.insert(name, id.to_string());
                }
            }
        }
        ids
    }
}

impl From<ProviderIds> for BTreeMap<String, String> {
    fn from(ids: ProviderIds) -> Self {
        let mut raw = ids.other.clone();
        for (kind, id) in ids.iter() {
            raw.insert(kind.wire_name().to_string(), id.to_string());
        }
        raw
    }
}

/// Library item classification (`Type` on the wire).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ItemType {
    Movie,
    Series,
    Season,
    Episode,
    /// Folders, collections, music and everything else the migration does
    /// not reconcile.
    Other(String),
}

impl ItemType {
    pub fn as_str(&self) -> &str {
        match self {
            ItemType::Movie => "Movie",
            ItemType::Series => "Series",
            ItemType::Season => "Season",
            ItemType::Episode => "Episode",
            ItemType::Other(name) => name,
        }
    }

    /// Series and seasons aggregate the state of their children.
    pub fn is_container(&self) -> bool {
        matches!(self, ItemType::Series | ItemType::Season)
    }
}

impl Default for ItemType {
    fn default() -> Self {
        ItemType::Other(String::new())
    }
}

impl From<String> for ItemType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Movie" => ItemType::Movie,
            "Series" => ItemType::Series,
            "Season" => ItemType::Season,
            "Episode" => ItemType::Episode,
            _ => ItemType::Other(value),
        }
    }
}

impl From<ItemType> for String {
    fn from(value: ItemType) -> Self {
        value.as_str().to_string()
    }
}

impl Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single library item as seen by one user.
///
/// Only the subset of fields needed to match and update watch state is
/// tracked; both servers return far more.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct LibraryItem {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_id: Option<String>,
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_time_ticks: Option<i64>,
    pub is_folder: bool,
    #[serde(rename = "Type")]
    pub item_type: ItemType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_data: Option<UserActivity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    pub provider_ids: ProviderIds,

    // Hierarchy pointers, only populated for seasons and episodes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub series_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub series_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub season_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index_number: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_index_number: Option<i32>,
}

impl LibraryItem {
    pub fn imdb_id(&self) -> Option<&str> {
        self.provider_ids.imdb.as_deref()
    }

    pub fn tmdb_id(&self) -> Option<&str> {
        self.provider_ids.tmdb.as_deref()
    }

    pub fn tvdb_id(&self) -> Option<&str> {
        self.provider_ids.tvdb.as_deref()
    }
}
