use std::time::Duration;

use crate::errors::ClientError;

/// Default backend address used when `ADK_API_URL` is not set.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
/// Agent application served by the backend.
pub const DEFAULT_APP_NAME: &str = "WeekendPlanner";

/// Configuration for the HTTP backend.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Base URL of the agent server (scheme, host, and optional path prefix).
    pub base_url: String,
    /// Application name the backend routes runs to.
    pub app_name: String,
    /// Timeout for establishing the TCP/TLS connection.
    ///
    /// Reading the event stream is never timed out by the client.
    pub connect_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            app_name: DEFAULT_APP_NAME.to_string(),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl ClientConfig {
    /// Builds a config from `ADK_API_URL` and `ADK_APP_NAME`, falling back to
    /// the defaults for unset or blank values.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(url) = non_blank_env("ADK_API_URL") {
            config.base_url = url;
        }
        if let Some(app) = non_blank_env("ADK_APP_NAME") {
            config.app_name = app;
        }
        config
    }

    /// Overrides the base URL.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Overrides the application name.
    pub fn app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = app_name.into();
        self
    }

    /// Overrides the connect timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub(crate) fn validate(&self) -> Result<(), ClientError> {
        if self.base_url.trim().is_empty() {
            return Err(ClientError::Config("base_url must not be empty".into()));
        }
        if self.app_name.trim().is_empty() {
            return Err(ClientError::Config("app_name must not be empty".into()));
        }
        Ok(())
    }

    pub(crate) fn sessions_url(&self, app_name: &str, user_id: &str) -> String {
        format!(
            "{}/apps/{app_name}/users/{user_id}/sessions",
            self.base_url.trim_end_matches('/')
        )
    }

    pub(crate) fn run_sse_url(&self) -> String {
        format!("{}/run_sse", self.base_url.trim_end_matches('/'))
    }
}

fn non_blank_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
