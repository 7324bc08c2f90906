use async_trait::async_trait;
use reelsync_contracts::{
    AdminKey, ApiKey, Backend, LibraryService, MediaServer, ServiceResult,
    Session, SystemService, UserService,
};
use reelsync_model::{
    ItemFilter, ItemFilters, LibraryItem, QueryResult, SystemInfo, SystemLog,
    User, UserActivity, UserPolicy,
};
use reqwest::Method;
use serde::Serialize;
use tracing::debug;

use crate::http::{ClientConfig, HttpClient, with_provider_ids};
use crate::wire::{AuthenticationResult, Credentials, NewUser};

const SCHEME: &str = "MediaBrowser";
const FIELDS: &str = "fields";

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct ResetPassword<'a> {
    id: &'a str,
    reset_password: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct SetPassword<'a> {
    id: &'a str,
    current_pw: &'a str,
    new_pw: &'a str,
}

/// Adapter for the Jellyfin REST API.
#[derive(Debug, Clone)]
pub struct JellyfinClient {
    http: HttpClient,
}

impl JellyfinClient {
    pub fn new(config: &ClientConfig) -> ServiceResult<Self> {
        Ok(Self {
            http: HttpClient::new(config, SCHEME, "")?,
        })
    }

    /// Toggle a boolean flag exposed as a POST/DELETE resource pair.
    async fn toggle(
        &self,
        key: &ApiKey,
        path: String,
        on: bool,
    ) -> ServiceResult<()> {
        let method = if on { Method::POST } else { Method::DELETE };
        let request = self.http.request(method, &path, Some(key));
        self.http.empty(&path, request).await
    }
}

#[async_trait]
impl SystemService for JellyfinClient {
    async fn ping(&self) -> ServiceResult<()> {
        let request = self.http.request(Method::GET, "/System/Ping", None);
        self.http.empty("/System/Ping", request).await
    }

    async fn public_info(&self) -> ServiceResult<SystemInfo> {
        let request =
            self.http.request(Method::GET, "/System/Info/Public", None);
        self.http.json("/System/Info/Public", request).await
    }

    async fn info(&self, key: &ApiKey) -> ServiceResult<SystemInfo> {
        let request = self.http.request(Method::GET, "/System/Info", Some(key));
        self.http.json("/System/Info", request).await
    }

    async fn logs(&self, admin: &AdminKey) -> ServiceResult<Vec<SystemLog>> {
        let request = self.http.request(
            Method::GET,
            "/System/Logs",
            Some(admin.api_key()),
        );
        self.http.json("/System/Logs", request).await
    }

    async fn log_file(
        &self,
        admin: &AdminKey,
        name: &str,
    ) -> ServiceResult<Vec<u8>> {
        let request = self
            .http
            .request(Method::GET, "/System/Logs/Log", Some(admin.api_key()))
            .query(&[("name", name)]);
        self.http.bytes("/System/Logs/Log", request).await
    }
}

#[async_trait]
impl UserService for JellyfinClient {
    async fn users(
        &self,
        key: &ApiKey,
        public: bool,
    ) -> ServiceResult<Vec<User>> {
        let path = if public { "/Users/Public" } else { "/Users" };
        let request = self.http.request(Method::GET, path, Some(key));
        self.http.json(path, request).await
    }

    async fn user(&self, key: &ApiKey, id: &str) -> ServiceResult<User> {
        let path = format!("/Users/{id}");
        let request = self.http.request(Method::GET, &path, Some(key));
        self.http.json(&path, request).await
    }

    async fn create_user(
        &self,
        admin: &AdminKey,
        name: &str,
    ) -> ServiceResult<User> {
        let request = self
            .http
            .request(Method::POST, "/Users/New", Some(admin.api_key()))
            .json(&NewUser { name });
        self.http.json("/Users/New", request).await
    }

    async fn delete_user(
        &self,
        admin: &AdminKey,
        id: &str,
    ) -> ServiceResult<()> {
        let path = format!("/Users/{id}");
        let request =
            self.http.request(Method::DELETE, &path, Some(admin.api_key()));
        self.http.empty(&path, request).await
    }

    async fn update_user(
        &self,
        admin: &AdminKey,
        id: &str,
        user: &User,
    ) -> ServiceResult<()> {
        let path = format!("/Users/{id}");
        let request = self
            .http
            .request(Method::POST, &path, Some(admin.api_key()))
            .json(user);
        self.http.empty(&path, request).await
    }

    /// Jellyfin only accepts a new password after the current one has been
    /// reset, so the reset always goes first. With `reset` set, the account
    /// is left without a password.
    async fn update_password(
        &self,
        admin: &AdminKey,
        id: &str,
        current: &str,
        new: &str,
        reset: bool,
    ) -> ServiceResult<()> {
        let path = format!("/Users/{id}/Password");
        let request = self
            .http
            .request(Method::POST, &path, Some(admin.api_key()))
            .json(&ResetPassword {
                id,
                reset_password: true,
            });
        self.http.empty(&path, request).await?;
        if reset {
            return Ok(());
        }

        let request = self
            .http
            .request(Method::POST, &path, Some(admin.api_key()))
            .json(&SetPassword {
                id,
                current_pw: current,
                new_pw: new,
            });
        self.http.empty(&path, request).await
    }

    async fn update_policy(
        &self,
        admin: &AdminKey,
        id: &str,
        policy: &UserPolicy,
    ) -> ServiceResult<()> {
        let path = format!("/Users/{id}/Policy");
        let request = self
            .http
            .request(Method::POST, &path, Some(admin.api_key()))
            .json(policy);
        self.http.empty(&path, request).await
    }

    async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> ServiceResult<Session> {
        let request = self
            .http
            .request(Method::POST, "/Users/AuthenticateByName", None)
            .json(&Credentials { username, password });
        let result: AuthenticationResult =
            self.http.json("/Users/AuthenticateByName", request).await?;
        debug!(user = %result.user.name, "authenticated");
        Ok(Session::new(result.user, result.access_token))
    }
}

#[async_trait]
impl LibraryService for JellyfinClient {
    async fn items_by_user(
        &self,
        key: &ApiKey,
        user_id: &str,
        filters: &ItemFilters,
    ) -> ServiceResult<Vec<LibraryItem>> {
        let path = format!("/Users/{user_id}/Items");
        let request = self
            .http
            .request(Method::GET, &path, Some(key))
            .query(&with_provider_ids(filters, FIELDS));
        let page: QueryResult<LibraryItem> =
            self.http.json(&path, request).await?;
        Ok(page.items)
    }

    async fn update_item(
        &self,
        admin: &AdminKey,
        item_id: &str,
        item: &LibraryItem,
    ) -> ServiceResult<()> {
        let path = format!("/Items/{item_id}");
        let request = self
            .http
            .request(Method::POST, &path, Some(admin.api_key()))
            .json(item);
        self.http.empty(&path, request).await
    }

    /// Played and favorite state have dedicated resources; the remaining
    /// counters go through the generic user data endpoint, and only when
    /// they changed.
    async fn update_item_user_activity(
        &self,
        key: &ApiKey,
        item_id: &str,
        user_id: &str,
        old: &UserActivity,
        new: &UserActivity,
    ) -> ServiceResult<()> {
        if old.played != new.played {
            self.toggle(
                key,
                format!("/Users/{user_id}/PlayedItems/{item_id}"),
                new.played,
            )
            .await?;
        }

        if old.is_favorite != new.is_favorite {
            self.toggle(
                key,
                format!("/Users/{user_id}/FavoriteItems/{item_id}"),
                new.is_favorite,
            )
            .await?;
        }

        if old.playback_position_ticks != new.playback_position_ticks
            || old.play_count != new.play_count
            || old.rating != new.rating
        {
            let path = format!("/UserItems/{item_id}/UserData");
            let request = self
                .http
                .request(Method::POST, &path, Some(key))
                .query(&[("userId", user_id)])
                .json(new);
            self.http.empty(&path, request).await?;
        }

        Ok(())
    }

    fn filter_name(&self, filter: ItemFilter) -> &'static str {
        match filter {
            ItemFilter::ParentId => "parentId",
            ItemFilter::Filters => "filters",
            ItemFilter::IsFolder => "IsFolder",
            ItemFilter::IsNotFolder => "IsNotFolder",
            ItemFilter::IsPlayed => "IsPlayed",
            ItemFilter::Recursive => "recursive",
            ItemFilter::IncludeItemTypes => "includeItemTypes",
        }
    }
}

impl MediaServer for JellyfinClient {
    fn backend(&self) -> Backend {
        Backend::Jellyfin
    }
}
