use async_trait::async_trait;
use reelsync_model::{ItemFilter, ItemFilters, LibraryItem, UserActivity};

use crate::credential::{AdminKey, ApiKey};
use crate::error::ServiceResult;

/// Per-user library reads and watch-state writes.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait LibraryService: Send + Sync {
    /// Items visible to `user_id`, narrowed by backend-spelled `filters`
    /// (see [`item_filters`]). Provider ids are always requested.
    async fn items_by_user(
        &self,
        key: &ApiKey,
        user_id: &str,
        filters: &ItemFilters,
    ) -> ServiceResult<Vec<LibraryItem>>;

    async fn update_item(
        &self,
        admin: &AdminKey,
        item_id: &str,
        item: &LibraryItem,
    ) -> ServiceResult<()>;

    /// Push `new` as the user's state for an item whose current state is
    /// `old`. Backends that expose separate played/favorite toggles use
    /// `old` to decide which of them to flip.
    async fn update_item_user_activity(
        &self,
        key: &ApiKey,
        item_id: &str,
        user_id: &str,
        old: &UserActivity,
        new: &UserActivity,
    ) -> ServiceResult<()>;

    /// Backend spelling of a query parameter or filter value.
    fn filter_name(&self, filter: ItemFilter) -> &'static str;
}

/// Build a query map in `library`'s vocabulary.
///
/// ```
/// # use reelsync_contracts::{LibraryService, item_filters};
/// # use reelsync_model::ItemFilter;
/// # fn demo(library: &dyn LibraryService) {
/// let filters = item_filters(library, [
///     (ItemFilter::ParentId, "4f1c".to_string()),
///     (ItemFilter::Filters, library.filter_name(ItemFilter::IsPlayed).to_string()),
/// ]);
/// # let _ = filters;
/// # }
/// ```
pub fn item_filters<L, I, V>(library: &L, pairs: I) -> ItemFilters
where
    L: LibraryService + ?Sized,
    I: IntoIterator<Item = (ItemFilter, V)>,
    V: Into<String>,
{
    pairs
        .into_iter()
        .map(|(filter, value)| {
            (library.filter_name(filter).to_string(), value.into())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_filters_use_backend_spelling() {
        let mut library = MockLibraryService::new();
        library.expect_filter_name().returning(|filter| match filter {
            ItemFilter::ParentId => "parentId",
            ItemFilter::Recursive => "recursive",
            _ => "other",
        });

        let filters = item_filters(
            &library,
            [(ItemFilter::ParentId, "abc"), (ItemFilter::Recursive, "true")],
        );

        assert_eq!(filters.get("parentId").map(String::as_str), Some("abc"));
        assert_eq!(filters.get("recursive").map(String::as_str), Some("true"));
        assert_eq!(filters.len(), 2);
    }
}
