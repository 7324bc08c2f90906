//! Core data model definitions shared across reelsync crates.
//!
//! Both Jellyfin and Emby speak a PascalCase JSON dialect descended from the
//! same MediaBrowser code base, so the types here double as the wire format
//! for both adapters. Backend-specific quirks (paging envelopes, query
//! parameter spelling) are handled in `reelsync-client`.
#![allow(missing_docs)]

pub mod activity;
pub mod filter;
pub mod item;
pub mod prelude;
pub mod query;
pub mod system;
pub mod user;

// Intentionally curated re-exports for downstream consumers.
pub use activity::UserActivity;
pub use filter::{ItemFilter, ItemFilters};
pub use item::{ItemType, LibraryItem, ProviderIds, ProviderKind};
pub use query::QueryResult;
pub use system::{SystemInfo, SystemLog};
pub use user::{
    AccessSchedule, DayOfWeek, SubtitleMode, User, UserConfiguration,
    UserPolicy,
};
