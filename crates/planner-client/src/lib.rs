//! Streaming client for the weekend planner agent backend.
//!
//! A run is one `POST /run_sse` whose `text/event-stream` body is decoded
//! lazily into [`AgentEvent`]s. Errors the backend reports inside the stream
//! are classified into [`ClassifiedError`] kinds (quota, credentials, missing
//! session, rate limit, timeout, model) so callers can react to each.
//!
//! ```no_run
//! use planner_client::display::{agent_display_name, format_user_message};
//! use planner_client::prelude::*;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), ClientError> {
//! let client = PlannerClient::from_env()?;
//! let session = client.create_session().await?;
//! let mut events = client
//!     .stream_session(&session, &format_user_message("90210", "5 and 8"))
//!     .await?;
//!
//! while let Some(event) = events.next_event().await {
//!     let event = event?;
//!     println!("{}: {}", agent_display_name(&event.author), event.text);
//! }
//! # Ok(())
//! # }
//! ```

/// Backend contract and the HTTP implementation.
pub mod backend;
/// Keyword classification of backend error text.
pub mod classify;
/// Client entry point and builder.
pub mod client;
/// Agent name labels and input formatting.
pub mod display;
/// Public error types.
pub mod errors;
/// Normalized agent output.
pub mod event;
/// Process-wide tracing setup.
pub mod observability;
/// Common imports for typical usage.
pub mod prelude;
/// Session identifiers.
pub mod session;
/// SSE line buffering and frame decoding.
pub mod sse;
/// Lazy event stream over a response body.
pub mod stream;

pub use backend::{AgentBackend, ClientConfig, HttpBackend, RunRequest, SessionRequest};
pub use classify::classify_error;
pub use client::{PlannerClient, PlannerClientBuilder};
pub use errors::{ClassifiedError, ClientError, ErrorKind};
pub use event::AgentEvent;
pub use session::SessionInfo;
pub use stream::{AgentStream, ByteStream, StreamState};
