/// Identifiers of a backend session, opaque to the client.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SessionInfo {
    pub session_id: String,
    pub user_id: String,
}

impl SessionInfo {
    pub fn new(session_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            user_id: user_id.into(),
        }
    }
}

/// Generates a user id of the form `user_<unix millis>`.
pub fn generate_user_id() -> String {
    format!("user_{}", chrono::Utc::now().timestamp_millis())
}
