use async_trait::async_trait;
use reelsync_model::{User, UserPolicy};

use crate::credential::{AdminKey, ApiKey, Session};
use crate::error::ServiceResult;

/// Account listing, management and authentication.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait UserService: Send + Sync {
    /// List accounts. `public` restricts the listing to users shown on the
    /// login screen.
    async fn users(&self, key: &ApiKey, public: bool)
    -> ServiceResult<Vec<User>>;

    async fn user(&self, key: &ApiKey, id: &str) -> ServiceResult<User>;

    async fn create_user(
        &self,
        admin: &AdminKey,
        name: &str,
    ) -> ServiceResult<User>;

    async fn delete_user(&self, admin: &AdminKey, id: &str)
    -> ServiceResult<()>;

    async fn update_user(
        &self,
        admin: &AdminKey,
        id: &str,
        user: &User,
    ) -> ServiceResult<()>;

    /// Change a password. With `reset` the current password is cleared
    /// first and `current` is ignored by the server.
    async fn update_password(
        &self,
        admin: &AdminKey,
        id: &str,
        current: &str,
        new: &str,
        reset: bool,
    ) -> ServiceResult<()>;

    async fn update_policy(
        &self,
        admin: &AdminKey,
        id: &str,
        policy: &UserPolicy,
    ) -> ServiceResult<()>;

    async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> ServiceResult<Session>;
}
