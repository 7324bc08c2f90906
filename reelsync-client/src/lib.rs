//! REST adapters for Jellyfin and Emby.
//!
//! Both clients implement the full [`reelsync_contracts::MediaServer`]
//! surface on top of a shared reqwest client. They differ in base path,
//! authorization scheme, listing envelopes, password handling and how user
//! data is written back; see [`JellyfinClient`] and [`EmbyClient`].
#![allow(missing_docs)]

mod emby;
mod http;
mod jellyfin;
mod wire;

pub use emby::EmbyClient;
pub use http::ClientConfig;
pub use jellyfin::JellyfinClient;
