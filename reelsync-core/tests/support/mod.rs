//! In-memory media server for driving `Migrator` end to end.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use reelsync_contracts::{
    AdminKey, ApiKey, Backend, LibraryService, MediaServer, ServiceError,
    ServiceResult, Session, SystemService, UserService,
};
use reelsync_model::{
    ItemFilter, ItemFilters, ItemType, LibraryItem, ProviderIds, ProviderKind,
    SystemInfo, SystemLog, User, UserActivity, UserPolicy,
};

/// Calls that reached the fake, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Users,
    CreateUser(String),
    DeleteUser(String),
    UpdatePassword { id: String, new: String },
    UpdatePolicy(String),
    ItemsByUser { user_id: String, parent: Option<String> },
    UpdateActivity { item_id: String, new: UserActivity },
}

#[derive(Debug, Default)]
pub struct State {
    pub users: Vec<User>,
    /// Recursive listing per user id.
    pub library: HashMap<String, Vec<LibraryItem>>,
    /// Direct children per container id.
    pub children: HashMap<String, Vec<LibraryItem>>,
    pub calls: Vec<Call>,
    /// Name of an operation that should fail with HTTP 500.
    pub fail_on: Option<&'static str>,
    pub delay: Option<Duration>,
    next_id: usize,
}

#[derive(Debug, Clone)]
pub struct FakeServer {
    backend: Backend,
    state: Arc<Mutex<State>>,
}

impl FakeServer {
    pub fn new(backend: Backend) -> Self {
        Self {
            backend,
            state: Arc::new(Mutex::new(State::default())),
        }
    }

    pub fn with_users(self, names: &[&str]) -> Self {
        {
            let mut state = self.state();
            for name in names {
                let id = format!("{}-{name}", self.backend);
                state.users.push(User::named(id, *name));
            }
        }
        self
    }

    pub fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    pub fn user_id(&self, name: &str) -> String {
        self.state()
            .users
            .iter()
            .find(|user| user.name == name)
            .map(|user| user.id.clone())
            .unwrap()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state().calls.clone()
    }

    pub fn updates(&self) -> Vec<(String, UserActivity)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::UpdateActivity { item_id, new } => Some((item_id, new)),
                _ => None,
            })
            .collect()
    }

    pub fn admin(&self) -> AdminKey {
        let mut root = User::named("root", "root");
        root.policy.is_administrator = true;
        Session::new(root, format!("{}-token", self.backend))
            .into_admin()
            .unwrap()
    }

    async fn enter(&self, operation: &'static str, call: Call) -> ServiceResult<()> {
        let delay = {
            let mut state = self.state();
            state.calls.push(call);
            if state.fail_on == Some(operation) {
                return Err(ServiceError::Http {
                    endpoint: operation.to_string(),
                    status: 500,
                    body: "boom".into(),
                });
            }
            state.delay
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(())
    }
}

#[async_trait]
impl SystemService for FakeServer {
    async fn ping(&self) -> ServiceResult<()> {
        Ok(())
    }

    async fn public_info(&self) -> ServiceResult<SystemInfo> {
        Ok(SystemInfo {
            server_name: self.backend.to_string(),
            version: "10.8.13".into(),
            ..Default::default()
        })
    }

    async fn info(&self, _key: &ApiKey) -> ServiceResult<SystemInfo> {
        self.public_info().await
    }

    async fn logs(&self, _admin: &AdminKey) -> ServiceResult<Vec<SystemLog>> {
        Ok(Vec::new())
    }

    async fn log_file(&self, _admin: &AdminKey, name: &str) -> ServiceResult<Vec<u8>> {
        Err(ServiceError::NotFound(name.to_string()))
    }
}

#[async_trait]
impl UserService for FakeServer {
    async fn users(&self, _key: &ApiKey, _public: bool) -> ServiceResult<Vec<User>> {
        self.enter("users", Call::Users).await?;
        Ok(self.state().users.clone())
    }

    async fn user(&self, _key: &ApiKey, id: &str) -> ServiceResult<User> {
        self.state()
            .users
            .iter()
            .find(|user| user.id == id)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound(id.to_string()))
    }

    async fn create_user(&self, _admin: &AdminKey, name: &str) -> ServiceResult<User> {
        self.enter("create_user", Call::CreateUser(name.to_string()))
            .await?;
        let mut state = self.state();
        state.next_id += 1;
        let mut user = User::named(format!("new-{}", state.next_id), name);
        user.policy = UserPolicy {
            enabled_folders: vec!["target-folder".into()],
            enable_all_folders: false,
            ..Default::default()
        };
        state.users.push(user.clone());
        Ok(user)
    }

    async fn delete_user(&self, _admin: &AdminKey, id: &str) -> ServiceResult<()> {
        self.enter("delete_user", Call::DeleteUser(id.to_string()))
            .await?;
        self.state().users.retain(|user| user.id != id);
        Ok(())
    }

    async fn update_user(
        &self,
        _admin: &AdminKey,
        _id: &str,
        _user: &User,
    ) -> ServiceResult<()> {
        Ok(())
    }

    async fn update_password(
        &self,
        _admin: &AdminKey,
        id: &str,
        _current: &str,
        new: &str,
        _reset: bool,
    ) -> ServiceResult<()> {
        self.enter(
            "update_password",
            Call::UpdatePassword {
                id: id.to_string(),
                new: new.to_string(),
            },
        )
        .await
    }

    async fn update_policy(
        &self,
        _admin: &AdminKey,
        id: &str,
        policy: &UserPolicy,
    ) -> ServiceResult<()> {
        self.enter("update_policy", Call::UpdatePolicy(id.to_string()))
            .await?;
        if let Some(user) = self.state().users.iter_mut().find(|user| user.id == id) {
            user.policy = policy.clone();
        }
        Ok(())
    }

    async fn authenticate(&self, username: &str, _password: &str) -> ServiceResult<Session> {
        let user = self
            .state()
            .users
            .iter()
            .find(|user| user.name == username)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound(username.to_string()))?;
        Ok(Session::new(user, "session"))
    }
}

#[async_trait]
impl LibraryService for FakeServer {
    async fn items_by_user(
        &self,
        _key: &ApiKey,
        user_id: &str,
        filters: &ItemFilters,
    ) -> ServiceResult<Vec<LibraryItem>> {
        let parent = filters.get("ParentId").cloned();
        self.enter(
            "items_by_user",
            Call::ItemsByUser {
                user_id: user_id.to_string(),
                parent: parent.clone(),
            },
        )
        .await?;

        let state = self.state();
        if let Some(parent) = parent {
            return Ok(state.children.get(&parent).cloned().unwrap_or_default());
        }

        let types: Option<Vec<&str>> = filters
            .get("IncludeItemTypes")
            .map(|types| types.split(',').collect());
        Ok(state
            .library
            .get(user_id)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .filter(|item| {
                types
                    .as_ref()
                    .is_none_or(|types| types.contains(&item.item_type.as_str()))
            })
            .collect())
    }

    async fn update_item(
        &self,
        _admin: &AdminKey,
        _item_id: &str,
        _item: &LibraryItem,
    ) -> ServiceResult<()> {
        Ok(())
    }

    async fn update_item_user_activity(
        &self,
        _key: &ApiKey,
        item_id: &str,
        _user_id: &str,
        _old: &UserActivity,
        new: &UserActivity,
    ) -> ServiceResult<()> {
        self.enter(
            "update_item_user_activity",
            Call::UpdateActivity {
                item_id: item_id.to_string(),
                new: new.clone(),
            },
        )
        .await
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

impl MediaServer for FakeServer {
    fn backend(&self) -> Backend {
        self.backend
    }
}

pub fn tmdb(id: &str) -> ProviderIds {
    ProviderIds::default().with(ProviderKind::Tmdb, id)
}

pub fn imdb(id: &str) -> ProviderIds {
    ProviderIds::default().with(ProviderKind::Imdb, id)
}

pub fn item(id: &str, name: &str, item_type: ItemType, provider_ids: ProviderIds) -> LibraryItem {
    LibraryItem {
        id: id.into(),
        name: name.into(),
        item_type,
        provider_ids,
        user_data: Some(UserActivity::default()),
        ..Default::default()
    }
}

pub fn watched() -> UserActivity {
    UserActivity {
        played: true,
        play_count: 1,
        ..Default::default()
    }
}

pub fn fully_played() -> UserActivity {
    UserActivity {
        played_percentage: Some(100.0),
        ..watched()
    }
}
