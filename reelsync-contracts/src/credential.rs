//! Two-tier credentials.
//!
//! Servers accept any access token for reads and self-service calls, but only
//! an administrator's token for account management. The two tiers are kept
//! apart at the type level: [`ApiKey`] is a plain token, [`AdminKey`] wraps
//! one and can only be produced by [`Session::into_admin`] from a session
//! whose user carries the administrator policy flag.
//!
//! ```compile_fail
//! use reelsync_contracts::{AdminKey, ApiKey};
//!
//! // There is no way to promote a bare token.
//! let admin: AdminKey = ApiKey::new("token").into();
//! ```

use std::fmt;

use reelsync_model::User;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{ServiceError, ServiceResult};

/// Access token for read and self-service operations.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct ApiKey {
    token: String,
}

impl ApiKey {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiKey").field("token", &"<redacted>").finish()
    }
}

/// Elevated access token.
///
/// Required by every operation that creates, deletes or rewrites accounts,
/// changes item metadata or reads server logs.
#[derive(Clone, PartialEq, Eq)]
pub struct AdminKey {
    key: ApiKey,
}

impl AdminKey {
    /// The underlying token, for operations that only need base access.
    pub fn api_key(&self) -> &ApiKey {
        &self.key
    }

    pub fn token(&self) -> &str {
        self.key.token()
    }
}

impl fmt::Debug for AdminKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminKey").field("token", &"<redacted>").finish()
    }
}

/// Result of a successful `AuthenticateByName` call.
#[derive(Debug, Clone)]
pub struct Session {
    user: User,
    key: ApiKey,
}

impl Session {
    pub fn new(user: User, access_token: impl Into<String>) -> Self {
        Self {
            user,
            key: ApiKey::new(access_token),
        }
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn api_key(&self) -> &ApiKey {
        &self.key
    }

    /// Elevate the session, failing unless its user is an administrator.
    pub fn into_admin(self) -> ServiceResult<AdminKey> {
        if self.user.is_administrator() {
            Ok(AdminKey { key: self.key })
        } else {
            Err(ServiceError::NotAdministrator {
                username: self.user.name,
            })
        }
    }
}
