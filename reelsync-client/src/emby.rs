use async_trait::async_trait;
use reelsync_contracts::{
    AdminKey, ApiKey, Backend, LibraryService, MediaServer, ServiceError,
    ServiceResult, Session, SystemService, UserService,
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

const SCHEME: &str = "Emby";
const BASE_PATH: &str = "/emby";
const FIELDS: &str = "Fields";

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct SetPassword<'a> {
    id: &'a str,
    current_pw: &'a str,
    new_pw: &'a str,
    reset: bool,
}

/// Adapter for the Emby REST API, served under `{url}/emby`.
#[derive(Debug, Clone)]
pub struct EmbyClient {
    http: HttpClient,
}

impl EmbyClient {
    pub fn new(config: &ClientConfig) -> ServiceResult<Self> {
        Ok(Self {
            http: HttpClient::new(config, SCHEME, BASE_PATH)?,
        })
    }

    /// Fetch a paged listing. Emby always reports at least one record for
    /// the listings we use, so an empty count means the query went wrong.
    async fn query<T>(&self, path: &str, key: &ApiKey) -> ServiceResult<Vec<T>>
    where
        T: serde::de::DeserializeOwned,
    {
        let request = self.http.request(Method::GET, path, Some(key));
        let page: QueryResult<T> = self.http.json(path, request).await?;
        if page.total_record_count <= 0 {
            return Err(ServiceError::RecordCount {
                endpoint: path.to_string(),
                count: page.total_record_count,
            });
        }
        Ok(page.items)
    }
}

#[async_trait]
impl SystemService for EmbyClient {
    async fn ping(&self) -> ServiceResult<()> {
        let request = self.http.request(Method::POST, "/System/Ping", None);
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
        self.query("/System/Logs/Query", admin.api_key()).await
    }

    async fn log_file(
        &self,
        admin: &AdminKey,
        name: &str,
    ) -> ServiceResult<Vec<u8>> {
        let path = format!("/System/Logs/{name}");
        let request =
            self.http.request(Method::GET, &path, Some(admin.api_key()));
        self.http.bytes(&path, request).await
    }
}

#[async_trait]
impl UserService for EmbyClient {
    async fn users(
        &self,
        key: &ApiKey,
        public: bool,
    ) -> ServiceResult<Vec<User>> {
        if public {
            let request =
                self.http.request(Method::GET, "/Users/Public", Some(key));
            return self.http.json("/Users/Public", request).await;
        }
        self.query("/Users/Query", key).await
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
            .json(&SetPassword {
                id,
                current_pw: current,
                new_pw: new,
                reset,
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
impl LibraryService for EmbyClient {
    async fn items_by_user(
        &self,
        key: &ApiKey,
        user_id: &str,
        filters: &ItemFilters,
    ) -> ServiceResult<Vec<LibraryItem>> {
        let mut query = with_provider_ids(filters, FIELDS);
        query.insert("UserId".to_string(), user_id.to_string());

        let request = self
            .http
            .request(Method::GET, "/Items", Some(key))
            .query(&query);
        let page: QueryResult<LibraryItem> =
            self.http.json("/Items", request).await?;
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

    /// Emby replaces the whole user data record in one call.
    async fn update_item_user_activity(
        &self,
        key: &ApiKey,
        item_id: &str,
        user_id: &str,
        _old: &UserActivity,
        new: &UserActivity,
    ) -> ServiceResult<()> {
        let path = format!("/Users/{user_id}/Items/{item_id}/UserData");
        let request = self
            .http
            .request(Method::POST, &path, Some(key))
            .json(new);
        self.http.empty(&path, request).await
    }

    fn filter_name(&self, filter: ItemFilter) -> &'static str {
        match filter {
            ItemFilter::ParentId => "ParentId",
            ItemFilter::Filters => "Filters",
            ItemFilter::IsFolder => "IsFolder",
            ItemFilter::IsNotFolder => "IsNotFolder",
            ItemFilter::IsPlayed => "IsPlayed",
            ItemFilter::Recursive => "Recursive",
            ItemFilter::IncludeItemTypes => "IncludeItemTypes",
        }
    }
}

impl MediaServer for EmbyClient {
    fn backend(&self) -> Backend {
        Backend::Emby
    }
}
