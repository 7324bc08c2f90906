use std::collections::BTreeMap;
use std::fmt;

/// Backend-neutral names for the item query vocabulary.
///
/// Each adapter translates these into its own parameter names and values;
/// `Filters` is a parameter whose values are `IsFolder`, `IsNotFolder` and
/// `IsPlayed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemFilter {
    ParentId,
    Filters,
    IsFolder,
    IsNotFolder,
    IsPlayed,
    Recursive,
    IncludeItemTypes,
}

impl ItemFilter {
    pub fn all() -> &'static [ItemFilter] {
        use ItemFilter::*;
        &[
            ParentId,
            Filters,
            IsFolder,
            IsNotFolder,
            IsPlayed,
            Recursive,
            IncludeItemTypes,
        ]
    }
}

impl fmt::Display for ItemFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Query parameters for an item listing, already spelled in the target
/// backend's vocabulary.
pub type ItemFilters = BTreeMap<String, String>;
