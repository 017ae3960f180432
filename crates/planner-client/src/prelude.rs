//! Common imports for typical client usage.
pub use crate::{
    AgentEvent, AgentStream, ClassifiedError, ClientConfig, ClientError, ErrorKind, PlannerClient,
    SessionInfo, StreamState,
};
