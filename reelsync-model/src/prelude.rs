//! Snapshot of the model surface for adapter and engine code.
//! Prefer importing from this module instead of individual tree nodes.

pub use super::activity::UserActivity;
pub use super::filter::{ItemFilter, ItemFilters};
pub use super::item::{ItemType, LibraryItem, ProviderIds, ProviderKind};
pub use super::query::QueryResult;
pub use super::system::{SystemInfo, SystemLog};
pub use super::user::{User, UserConfiguration, UserPolicy};
