//! Backend contract used by [`PlannerClient`](crate::PlannerClient) and the
//! reqwest-based HTTP implementation.
mod config;
mod http;

pub use config::{ClientConfig, DEFAULT_APP_NAME, DEFAULT_BASE_URL};
pub use http::HttpBackend;

use crate::errors::ClientError;
use crate::session::SessionInfo;
use crate::stream::ByteStream;

/// Input for creating a backend session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionRequest {
    pub app_name: String,
    pub user_id: String,
}

/// Input for a single streaming run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunRequest {
    pub app_name: String,
    pub user_id: String,
    pub session_id: String,
    /// User message forwarded to the root agent.
    pub message: String,
}

/// Transport-level operations exposed by an agent backend.
///
/// Implementations report connection failures and non-success statuses as
/// [`ClientError::Transport`]; they never classify error text themselves.
#[async_trait::async_trait]
pub trait AgentBackend: Send + Sync {
    /// Creates a session for `req.user_id`.
    async fn create_session(&self, req: SessionRequest) -> Result<SessionInfo, ClientError>;

    /// Starts a run and returns the raw event-stream body once the backend has
    /// accepted the request.
    async fn open_stream(&self, req: RunRequest) -> Result<ByteStream, ClientError>;
}
