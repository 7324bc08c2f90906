use std::fmt;
use std::time::Duration;

use reelsync_contracts::ServiceError;
use thiserror::Error;

use crate::report::Progress;

/// Which end of a migration an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Source,
    Target,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Source => f.write_str("source"),
            Side::Target => f.write_str("target"),
        }
    }
}

#[derive(Error, Debug)]
pub enum MigrateError {
    #[error("{operation} failed for {context}: {source}")]
    Service {
        operation: &'static str,
        context: String,
        #[source]
        source: ServiceError,
    },

    #[error("User {username} not found on {side} server")]
    UserNotFound { side: Side, username: String },

    #[error("Confirmation prompt failed: {0}")]
    Prompt(#[source] std::io::Error),

    #[error("Failed to render user record: {0}")]
    Render(#[from] serde_json::Error),

    #[error("Migration did not finish within {}", humanize(.0))]
    DeadlineExceeded(Duration),

    /// The run failed after it had already written to the target server.
    #[error("Migration interrupted after {progress}: {source}")]
    Interrupted {
        progress: Progress,
        #[source]
        source: Box<MigrateError>,
    },
}

impl MigrateError {
    /// Progress reached before the failure, if any writes happened.
    pub fn progress(&self) -> Option<&Progress> {
        match self {
            MigrateError::Interrupted { progress, .. } => Some(progress),
            _ => None,
        }
    }

    /// The underlying failure, looking through [`MigrateError::Interrupted`].
    pub fn root(&self) -> &MigrateError {
        match self {
            MigrateError::Interrupted { source, .. } => source.root(),
            other => other,
        }
    }
}

fn humanize(duration: &Duration) -> String {
    format!("{:.1}s", duration.as_secs_f64())
}

pub type Result<T> = std::result::Result<T, MigrateError>;

/// Attach an operation name and subject to a service failure.
pub trait ServiceResultExt<T> {
    fn during(
        self,
        operation: &'static str,
        context: impl fmt::Display,
    ) -> Result<T>;
}

impl<T> ServiceResultExt<T> for std::result::Result<T, ServiceError> {
    fn during(
        self,
        operation: &'static str,
        context: impl fmt::Display,
    ) -> Result<T> {
        self.map_err(|source| MigrateError::Service {
            operation,
            context: context.to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_errors_carry_operation_and_subject() {
        let failed: std::result::Result<(), _> =
            Err(ServiceError::NotFound("user 42".into()));
        let err = failed.during("delete_user", "user bob").unwrap_err();

        assert_eq!(
            err.to_string(),
            "delete_user failed for user bob: Not found: user 42"
        );
    }

    #[test]
    fn interrupted_exposes_progress_and_root() {
        let err = MigrateError::Interrupted {
            progress: Progress {
                users_created: 2,
                ..Default::default()
            },
            source: Box::new(MigrateError::DeadlineExceeded(
                Duration::from_millis(1500),
            )),
        };

        assert_eq!(err.progress().map(|p| p.users_created), Some(2));
        assert!(matches!(err.root(), MigrateError::DeadlineExceeded(_)));
        assert!(err.to_string().contains("1.5s"));
    }
}
