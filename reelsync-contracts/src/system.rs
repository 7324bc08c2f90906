use async_trait::async_trait;
use reelsync_model::{SystemInfo, SystemLog};

use crate::credential::{AdminKey, ApiKey};
use crate::error::ServiceResult;

/// Server health, identity and log access.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait SystemService: Send + Sync {
    /// Cheap liveness probe; needs no credential.
    async fn ping(&self) -> ServiceResult<()>;

    /// Unauthenticated subset of the server identity.
    async fn public_info(&self) -> ServiceResult<SystemInfo>;

    async fn info(&self, key: &ApiKey) -> ServiceResult<SystemInfo>;

    /// Server version string, taken from the public info record.
    async fn version(&self) -> ServiceResult<String> {
        Ok(self.public_info().await?.version)
    }

    async fn logs(&self, admin: &AdminKey) -> ServiceResult<Vec<SystemLog>>;

    /// Raw contents of one log file.
    async fn log_file(
        &self,
        admin: &AdminKey,
        name: &str,
    ) -> ServiceResult<Vec<u8>>;
}
