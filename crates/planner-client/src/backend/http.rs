use futures::StreamExt as _;
use reqwest::header::ACCEPT;
use tracing::debug;

use super::config::ClientConfig;
use super::{AgentBackend, RunRequest, SessionRequest};
use crate::errors::ClientError;
use crate::session::SessionInfo;
use crate::stream::ByteStream;

/// Backend adapter for an agent server exposing `/apps/.../sessions` and
/// `/run_sse`.
pub struct HttpBackend {
    client: reqwest::Client,
    config: ClientConfig,
}

impl HttpBackend {
    /// Creates a backend from explicit configuration.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        config.validate()?;
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| ClientError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    /// Creates a backend using `ADK_API_URL` / `ADK_APP_NAME`.
    pub fn from_env() -> Result<Self, ClientError> {
        Self::new(ClientConfig::from_env())
    }
}

#[async_trait::async_trait]
impl AgentBackend for HttpBackend {
    async fn create_session(&self, req: SessionRequest) -> Result<SessionInfo, ClientError> {
        let url = self.config.sessions_url(&req.app_name, &req.user_id);
        debug!(%url, user_id = %req.user_id, "creating session");

        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({}))
            .send()
            .await
            .map_err(|e| ClientError::transport(format!("session request failed: {e}"), None))?;
        let response = ensure_success(response, "failed to create session").await?;

        let body: serde_json::Value = response.json().await.map_err(|e| {
            ClientError::Protocol(format!("session response is not valid JSON: {e}"))
        })?;
        let session_id = body
            .get("id")
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ClientError::Protocol("session response has no `id` field".into()))?;

        debug!(session_id, user_id = %req.user_id, "session created");
        Ok(SessionInfo::new(session_id, req.user_id))
    }

    async fn open_stream(&self, req: RunRequest) -> Result<ByteStream, ClientError> {
        let body = build_run_body(&req);
        debug!(session_id = %req.session_id, user_id = %req.user_id, app = %req.app_name, "starting agent run stream");

        let response = self
            .client
            .post(self.config.run_sse_url())
            .header(ACCEPT, "text/event-stream")
            .json(&body)
            .send()
            .await
            .map_err(|e| ClientError::transport(format!("agent run request failed: {e}"), None))?;
        let response = ensure_success(response, "agent execution failed").await?;

        let stream = response.bytes_stream().map(|chunk| {
            chunk.map_err(|e| ClientError::transport(format!("stream read failed: {e}"), None))
        });
        Ok(Box::pin(stream))
    }
}

async fn ensure_success(
    response: reqwest::Response,
    context: &str,
) -> Result<reqwest::Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<unreadable body>".to_string());
    Err(ClientError::transport(
        format!("{context}: {status} - {body}"),
        Some(status.as_u16()),
    ))
}

pub(crate) fn build_run_body(req: &RunRequest) -> serde_json::Value {
    serde_json::json!({
        "app_name": req.app_name,
        "user_id": req.user_id,
        "session_id": req.session_id,
        "new_message": {
            "role": "user",
            "parts": [{ "text": req.message }],
        },
        "streaming": true,
    })
}
