//! Trait surfaces that describe what the migration engine needs from a
//! media server.
//!
//! A backend adapter implements [`SystemService`], [`UserService`] and
//! [`LibraryService`] and ties them together through [`MediaServer`]. Every
//! call takes its credential explicitly: read operations accept an
//! [`ApiKey`], while account management and other elevated operations
//! require an [`AdminKey`], which can only be obtained by elevating an
//! administrator [`Session`].

pub mod credential;
pub mod error;
pub mod library;
pub mod server;
pub mod system;
pub mod user;

pub use credential::{AdminKey, ApiKey, Session};
pub use error::{ServiceError, ServiceResult};
pub use library::{LibraryService, item_filters};
pub use server::{Backend, MediaServer, ParseBackendError};
pub use system::SystemService;
pub use user::UserService;

#[cfg(any(test, feature = "mock"))]
pub use library::MockLibraryService;
#[cfg(any(test, feature = "mock"))]
pub use system::MockSystemService;
#[cfg(any(test, feature = "mock"))]
pub use user::MockUserService;

/// Frequently used trait combinators for engine and adapter crates.
pub mod prelude {
    pub use super::credential::{AdminKey, ApiKey, Session};
    pub use super::error::{ServiceError, ServiceResult};
    pub use super::library::LibraryService;
    pub use super::server::{Backend, MediaServer};
    pub use super::system::SystemService;
    pub use super::user::UserService;
}
