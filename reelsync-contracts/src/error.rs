use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failures surfaced by a backend adapter.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Transport error calling {endpoint}: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: BoxError,
    },

    #[error("{endpoint} returned HTTP {status}: {body}")]
    Http {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("Failed to decode response from {endpoint}: {source}")]
    Decoding {
        endpoint: String,
        #[source]
        source: BoxError,
    },

    #[error("Not found: {0}")]
    NotFound(String),

    /// A paged listing reported zero or a negative record count.
    #[error("{endpoint} reported {count} records")]
    RecordCount { endpoint: String, count: i32 },

    #[error("User {username} is not an administrator")]
    NotAdministrator { username: String },
}

impl ServiceError {
    pub fn transport(
        endpoint: impl Into<String>,
        source: impl Into<BoxError>,
    ) -> Self {
        ServiceError::Transport {
            endpoint: endpoint.into(),
            source: source.into(),
        }
    }

    pub fn decoding(
        endpoint: impl Into<String>,
        source: impl Into<BoxError>,
    ) -> Self {
        ServiceError::Decoding {
            endpoint: endpoint.into(),
            source: source.into(),
        }
    }

    /// HTTP status of the failed call, when the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ServiceError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_error_mentions_status_and_body() {
        let err = ServiceError::Http {
            endpoint: "/Users/New".into(),
            status: 400,
            body: "name taken".into(),
        };
        assert_eq!(err.status(), Some(400));
        assert_eq!(err.to_string(), "/Users/New returned HTTP 400: name taken");
    }

    #[test]
    fn decoding_keeps_source_chain() {
        let source = "expected value".to_string();
        let err = ServiceError::decoding("/Users", source);
        assert!(std::error::Error::source(&err).is_some());
        assert_eq!(err.status(), None);
    }
}
