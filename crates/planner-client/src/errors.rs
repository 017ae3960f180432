use std::fmt;
use std::time::Duration;

/// Typed error decoded from an `error` frame sent by the backend mid-stream.
///
/// Every variant keeps the message exactly as the backend sent it. Metadata
/// fields are best-effort extractions and are `None` when the text carries no
/// matching hint.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClassifiedError {
    /// The API quota is exhausted (HTTP 429 / `RESOURCE_EXHAUSTED`).
    #[error("quota exceeded: {message}")]
    Quota {
        message: String,
        retry_after_seconds: Option<f64>,
        quota_limit: Option<u64>,
    },
    /// The backend rejected its credentials (401/403, bad API key).
    #[error("invalid credential: {message}")]
    InvalidCredential { message: String },
    /// The session id is unknown to the backend and must be recreated.
    #[error("session not found: {message}")]
    SessionNotFound { message: String },
    /// Short-term rate limiting, distinct from quota exhaustion.
    #[error("rate limited: {message}")]
    RateLimit {
        message: String,
        retry_after_seconds: Option<f64>,
    },
    /// The backend or one of its model calls timed out.
    #[error("backend timeout: {message}")]
    BackendTimeout { message: String },
    /// The configured model cannot be used.
    #[error("model error: {message}")]
    ModelUnavailable { message: String },
    /// Any other backend-reported failure.
    #[error("API error: {message}")]
    Generic { message: String },
}

impl ClassifiedError {
    /// Returns the kind of this error without its payload.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Quota { .. } => ErrorKind::Quota,
            Self::InvalidCredential { .. } => ErrorKind::InvalidCredential,
            Self::SessionNotFound { .. } => ErrorKind::SessionNotFound,
            Self::RateLimit { .. } => ErrorKind::RateLimit,
            Self::BackendTimeout { .. } => ErrorKind::BackendTimeout,
            Self::ModelUnavailable { .. } => ErrorKind::ModelUnavailable,
            Self::Generic { .. } => ErrorKind::Generic,
        }
    }

    /// Returns the message as sent by the backend.
    pub fn message(&self) -> &str {
        match self {
            Self::Quota { message, .. }
            | Self::InvalidCredential { message }
            | Self::SessionNotFound { message }
            | Self::RateLimit { message, .. }
            | Self::BackendTimeout { message }
            | Self::ModelUnavailable { message }
            | Self::Generic { message } => message,
        }
    }

    /// Retry delay hinted by the backend, if any.
    ///
    /// Only quota and rate-limit errors carry one.
    pub fn retry_after_seconds(&self) -> Option<f64> {
        match self {
            Self::Quota {
                retry_after_seconds,
                ..
            }
            | Self::RateLimit {
                retry_after_seconds,
                ..
            } => *retry_after_seconds,
            _ => None,
        }
    }

    /// Same as [`retry_after_seconds`](Self::retry_after_seconds) as a `Duration`.
    ///
    /// Negative or non-finite values are discarded.
    pub fn retry_after(&self) -> Option<Duration> {
        self.retry_after_seconds()
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
    }

    /// Quota limit reported by the backend, if any.
    pub fn quota_limit(&self) -> Option<u64> {
        match self {
            Self::Quota { quota_limit, .. } => *quota_limit,
            _ => None,
        }
    }
}

/// Payload-free discriminant of [`ClassifiedError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Quota,
    InvalidCredential,
    SessionNotFound,
    RateLimit,
    BackendTimeout,
    ModelUnavailable,
    Generic,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Quota => "quota",
            Self::InvalidCredential => "invalid_credential",
            Self::SessionNotFound => "session_not_found",
            Self::RateLimit => "rate_limit",
            Self::BackendTimeout => "backend_timeout",
            Self::ModelUnavailable => "model_unavailable",
            Self::Generic => "generic",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Top-level error type for the client API.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClientError {
    /// Invalid client configuration.
    #[error("config error: {0}")]
    Config(String),
    /// Invalid caller input, rejected before any request is sent.
    #[error("validation error: {0}")]
    Validation(String),
    /// Connection failure, read failure, or a non-success HTTP status.
    #[error("transport error: {message}")]
    Transport {
        message: String,
        status_code: Option<u16>,
    },
    /// The backend reported an error inside the event stream.
    #[error(transparent)]
    Backend(ClassifiedError),
    /// Unexpected response shape or any other failure while consuming a stream.
    #[error("protocol error: {0}")]
    Protocol(String),
}

impl ClientError {
    /// Creates a transport-level error.
    pub fn transport(message: impl Into<String>, status_code: Option<u16>) -> Self {
        Self::Transport {
            message: message.into(),
            status_code,
        }
    }

    /// Returns the classified backend error, if this is one.
    pub fn classified(&self) -> Option<&ClassifiedError> {
        match self {
            Self::Backend(err) => Some(err),
            _ => None,
        }
    }

    /// HTTP status attached to a transport failure.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Transport { status_code, .. } => *status_code,
            _ => None,
        }
    }
}

impl From<ClassifiedError> for ClientError {
    fn from(value: ClassifiedError) -> Self {
        ClientError::Backend(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retry_after_converts_seconds_to_duration() {
        let err = ClassifiedError::RateLimit {
            message: "rate limit".into(),
            retry_after_seconds: Some(1.5),
        };
        assert_eq!(err.retry_after(), Some(Duration::from_millis(1500)));
        assert_eq!(err.quota_limit(), None);
    }

    #[test]
    fn non_retry_kinds_have_no_delay() {
        let err = ClassifiedError::BackendTimeout {
            message: "timed out".into(),
        };
        assert_eq!(err.retry_after_seconds(), None);
        assert_eq!(err.retry_after(), None);
    }

    #[test]
    fn backend_error_display_is_transparent() {
        let err = ClientError::from(ClassifiedError::SessionNotFound {
            message: "Session not found".into(),
        });
        assert_eq!(err.to_string(), "session not found: Session not found");
        assert_eq!(
            err.classified().map(ClassifiedError::kind),
            Some(ErrorKind::SessionNotFound)
        );
    }
}
