use std::sync::Arc;

use tracing::debug;

use crate::backend::{AgentBackend, ClientConfig, HttpBackend, RunRequest, SessionRequest};
use crate::errors::ClientError;
use crate::session::{SessionInfo, generate_user_id};
use crate::stream::AgentStream;

/// Entry point for creating sessions and streaming planner runs.
#[derive(Clone)]
pub struct PlannerClient {
    backend: Arc<dyn AgentBackend>,
    app_name: String,
}

impl PlannerClient {
    /// Starts a builder for a client over a custom backend.
    pub fn builder() -> PlannerClientBuilder {
        PlannerClientBuilder::default()
    }

    /// Creates a client talking HTTP to the server described by `config`.
    pub fn from_config(config: ClientConfig) -> Result<Self, ClientError> {
        let app_name = config.app_name.clone();
        Self::builder()
            .backend(Arc::new(HttpBackend::new(config)?))
            .app_name(app_name)
            .build()
    }

    /// Same as [`from_config`](Self::from_config) with [`ClientConfig::from_env`].
    pub fn from_env() -> Result<Self, ClientError> {
        Self::from_config(ClientConfig::from_env())
    }

    /// Application name sent with every request.
    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    /// Creates a backend session for a freshly generated user id.
    pub async fn create_session(&self) -> Result<SessionInfo, ClientError> {
        self.create_session_for(generate_user_id()).await
    }

    /// Creates a backend session for the given user id.
    pub async fn create_session_for(
        &self,
        user_id: impl Into<String>,
    ) -> Result<SessionInfo, ClientError> {
        let user_id = user_id.into();
        if user_id.trim().is_empty() {
            return Err(ClientError::Validation("user_id must not be empty".into()));
        }
        self.backend
            .create_session(SessionRequest {
                app_name: self.app_name.clone(),
                user_id,
            })
            .await
    }

    /// Sends `message` to the session and returns the lazy event stream.
    ///
    /// A rejected request (non-success status, connection failure) fails here
    /// with [`ClientError::Transport`]; errors reported by the backend while
    /// streaming are yielded by the returned stream.
    pub async fn stream(
        &self,
        session_id: &str,
        user_id: &str,
        message: &str,
    ) -> Result<AgentStream, ClientError> {
        if session_id.trim().is_empty() {
            return Err(ClientError::Validation("session_id must not be empty".into()));
        }
        if user_id.trim().is_empty() {
            return Err(ClientError::Validation("user_id must not be empty".into()));
        }
        if message.trim().is_empty() {
            return Err(ClientError::Validation("message must not be empty".into()));
        }

        debug!(session_id, user_id, "opening planner stream");
        let body = self
            .backend
            .open_stream(RunRequest {
                app_name: self.app_name.clone(),
                user_id: user_id.to_string(),
                session_id: session_id.to_string(),
                message: message.to_string(),
            })
            .await?;
        Ok(AgentStream::from_bytes(body))
    }

    /// Streams into an existing [`SessionInfo`].
    pub async fn stream_session(
        &self,
        session: &SessionInfo,
        message: &str,
    ) -> Result<AgentStream, ClientError> {
        self.stream(&session.session_id, &session.user_id, message)
            .await
    }
}

/// Builder used to pick a backend and application name before creating a
/// [`PlannerClient`].
#[derive(Default)]
pub struct PlannerClientBuilder {
    backend: Option<Arc<dyn AgentBackend>>,
    app_name: Option<String>,
}

impl PlannerClientBuilder {
    /// Sets the backend implementation.
    pub fn backend(mut self, backend: Arc<dyn AgentBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Sets the application name (defaults to `WeekendPlanner`).
    pub fn app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = Some(app_name.into());
        self
    }

    /// Builds the client, rejecting a missing backend or blank app name.
    pub fn build(self) -> Result<PlannerClient, ClientError> {
        let backend = self
            .backend
            .ok_or_else(|| ClientError::Config("a backend must be registered".into()))?;
        let app_name = self
            .app_name
            .unwrap_or_else(|| crate::backend::DEFAULT_APP_NAME.to_string());
        if app_name.trim().is_empty() {
            return Err(ClientError::Config("app_name must not be empty".into()));
        }
        Ok(PlannerClient { backend, app_name })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{ClassifiedError, ErrorKind};
    use crate::stream::{ByteStream, StreamState};
    use futures::stream;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeBackend {
        body: Vec<&'static str>,
        reject_with: Option<u16>,
        runs: Mutex<Vec<RunRequest>>,
        sessions: Mutex<Vec<SessionRequest>>,
    }

    #[async_trait::async_trait]
    impl AgentBackend for FakeBackend {
        async fn create_session(&self, req: SessionRequest) -> Result<SessionInfo, ClientError> {
            let info = SessionInfo::new("session-1", req.user_id.clone());
            self.sessions.lock().expect("lock").push(req);
            Ok(info)
        }

        async fn open_stream(&self, req: RunRequest) -> Result<ByteStream, ClientError> {
            self.runs.lock().expect("lock").push(req);
            if let Some(status) = self.reject_with {
                return Err(ClientError::transport(
                    format!("agent execution failed: {status}"),
                    Some(status),
                ));
            }
            let chunks = self
                .body
                .iter()
                .copied()
                .map(|c| Ok(bytes::Bytes::from_static(c.as_bytes())))
                .collect::<Vec<Result<bytes::Bytes, ClientError>>>();
            Ok(Box::pin(stream::iter(chunks)))
        }
    }

    fn client(backend: Arc<FakeBackend>) -> PlannerClient {
        PlannerClient::builder()
            .backend(backend)
            .app_name("WeekendPlanner")
            .build()
            .expect("client")
    }

    #[test]
    fn build_requires_backend() {
        let result = PlannerClient::builder().build();
        assert!(
            matches!(result, Err(ClientError::Config(message)) if message.contains("backend"))
        );
    }

    #[test]
    fn build_defaults_app_name() {
        let client = PlannerClient::builder()
            .backend(Arc::new(FakeBackend::default()))
            .build()
            .expect("client");
        assert_eq!(client.app_name(), "WeekendPlanner");
    }

    #[tokio::test]
    async fn create_session_generates_user_id_and_forwards_app_name() {
        let backend = Arc::new(FakeBackend::default());
        let session = client(backend.clone())
            .create_session()
            .await
            .expect("session");
        assert_eq!(session.session_id, "session-1");
        assert!(session.user_id.starts_with("user_"));
        let sessions = backend.sessions.lock().expect("lock");
        assert_eq!(sessions[0].app_name, "WeekendPlanner");
        assert_eq!(sessions[0].user_id, session.user_id);
    }

    #[tokio::test]
    async fn stream_rejects_blank_arguments_without_calling_backend() {
        let backend = Arc::new(FakeBackend::default());
        let client = client(backend.clone());
        for (session, user, message) in [("", "u", "m"), ("s", " ", "m"), ("s", "u", "\n")] {
            let result = client.stream(session, user, message).await;
            assert!(matches!(result, Err(ClientError::Validation(_))));
        }
        assert!(backend.runs.lock().expect("lock").is_empty());
    }

    #[tokio::test]
    async fn stream_yields_events_and_forwards_request() {
        let backend = Arc::new(FakeBackend {
            body: vec![
                "data: {\"author\":\"WeatherAgent\",\"content\":{\"parts\":[{\"text\":\"good\"}]}}\n",
                "data: {\"author\":\"SummarizerAgent\",\"content\":{\"parts\":[{\"text\":\"plan\"}]}}\n",
            ],
            ..Default::default()
        });
        let session = SessionInfo::new("s-1", "user_1");
        let mut stream = client(backend.clone())
            .stream_session(&session, "90210 kids are 5 and 8")
            .await
            .expect("stream");

        let mut authors = Vec::new();
        while let Some(event) = stream.next_event().await {
            authors.push(event.expect("event").author);
        }
        assert_eq!(authors, vec!["WeatherAgent", "SummarizerAgent"]);
        assert_eq!(stream.state(), StreamState::Completed);

        let runs = backend.runs.lock().expect("lock");
        assert_eq!(
            runs[0],
            RunRequest {
                app_name: "WeekendPlanner".into(),
                user_id: "user_1".into(),
                session_id: "s-1".into(),
                message: "90210 kids are 5 and 8".into(),
            }
        );
    }

    #[tokio::test]
    async fn rejected_request_is_an_unclassified_transport_error() {
        let backend = Arc::new(FakeBackend {
            reject_with: Some(500),
            ..Default::default()
        });
        let result = client(backend).stream("s", "u", "hello").await;
        let err = result.expect_err("rejected");
        assert_eq!(err.status_code(), Some(500));
        assert!(err.classified().is_none());
    }

    #[tokio::test]
    async fn mid_stream_error_is_classified() {
        let backend = Arc::new(FakeBackend {
            body: vec!["data: {\"error\":\"Session not found: s\"}\n"],
            ..Default::default()
        });
        let err = client(backend)
            .stream("s", "u", "hello")
            .await
            .expect("stream")
            .collect_events()
            .await
            .expect_err("classified");
        assert!(matches!(
            err,
            ClientError::Backend(ClassifiedError::SessionNotFound { .. })
        ));
        assert_eq!(err.classified().map(|e| e.kind()), Some(ErrorKind::SessionNotFound));
    }
}
