use std::collections::VecDeque;
use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::stream::{self, FusedStream, Stream, StreamExt as _};
use tracing::debug;

use crate::errors::ClientError;
use crate::event::AgentEvent;
use crate::sse::{LineBuffer, parse_frame};

/// Raw response body as delivered by a backend.
pub type ByteStream =
    Pin<Box<dyn Stream<Item = Result<bytes::Bytes, ClientError>> + Send + 'static>>;

type EventStream = Pin<Box<dyn Stream<Item = Result<AgentEvent, ClientError>> + Send + 'static>>;

/// Lifecycle of an [`AgentStream`]. Both non-`Open` states are terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StreamState {
    /// More events may follow.
    Open,
    /// An error was yielded; no further items will be produced.
    ErrorTerminated,
    /// The backend closed the stream normally.
    Completed,
}

/// Lazy sequence of agent events decoded from one streaming response.
///
/// The body is read only when the next item is requested. The underlying
/// byte stream is owned by this value and dropped as soon as the stream
/// completes, fails, or is itself dropped, so abandoning iteration releases
/// the connection. No deadline is applied here; wrap `next_event` in
/// `tokio::time::timeout` and drop the stream on expiry.
pub struct AgentStream {
    inner: EventStream,
    state: StreamState,
}

impl AgentStream {
    /// Wraps a response body.
    pub fn from_bytes(bytes: ByteStream) -> Self {
        Self {
            inner: Box::pin(decode_events(bytes)),
            state: StreamState::Open,
        }
    }

    /// Returns the current lifecycle state.
    pub fn state(&self) -> StreamState {
        self.state
    }

    /// Waits for the next event.
    ///
    /// Returns `None` once the stream is completed or after an error has been
    /// returned.
    pub async fn next_event(&mut self) -> Option<Result<AgentEvent, ClientError>> {
        self.next().await
    }

    /// Drains the stream and returns every event, or the terminating error.
    pub async fn collect_events(mut self) -> Result<Vec<AgentEvent>, ClientError> {
        let mut events = Vec::new();
        while let Some(item) = self.next().await {
            events.push(item?);
        }
        Ok(events)
    }

    fn terminate(&mut self, state: StreamState) {
        self.state = state;
        self.inner = Box::pin(stream::empty());
    }
}

impl Stream for AgentStream {
    type Item = Result<AgentEvent, ClientError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.state != StreamState::Open {
            return Poll::Ready(None);
        }
        let next = futures::ready!(self.inner.as_mut().poll_next(cx));
        match &next {
            Some(Ok(_)) => {}
            Some(Err(err)) => {
                debug!(error = %err, "agent stream terminated by error");
                self.terminate(StreamState::ErrorTerminated);
            }
            None => {
                debug!("agent stream completed");
                self.terminate(StreamState::Completed);
            }
        }
        Poll::Ready(next)
    }
}

impl FusedStream for AgentStream {
    fn is_terminated(&self) -> bool {
        self.state != StreamState::Open
    }
}

impl fmt::Debug for AgentStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentStream")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

fn decode_events(bytes: ByteStream) -> impl Stream<Item = Result<AgentEvent, ClientError>> + Send {
    struct State {
        bytes: Option<ByteStream>,
        lines: LineBuffer,
        pending: VecDeque<AgentEvent>,
        failure: Option<ClientError>,
    }

    impl State {
        fn decode(&mut self, lines: impl IntoIterator<Item = String>) {
            for line in lines {
                match parse_frame(&line) {
                    Ok(Some(event)) => self.pending.push_back(event),
                    Ok(None) => {}
                    Err(err) => {
                        // Nothing after an error frame is read; release the body now.
                        self.failure = Some(ClientError::Backend(err));
                        self.bytes = None;
                        return;
                    }
                }
            }
        }
    }

    stream::try_unfold(
        State {
            bytes: Some(bytes),
            lines: LineBuffer::new(),
            pending: VecDeque::new(),
            failure: None,
        },
        |mut state| async move {
            loop {
                if let Some(event) = state.pending.pop_front() {
                    return Ok(Some((event, state)));
                }
                if let Some(err) = state.failure.take() {
                    return Err(err);
                }
                let Some(bytes) = state.bytes.as_mut() else {
                    return Ok(None);
                };

                match bytes.next().await {
                    Some(Ok(chunk)) => {
                        let lines = state.lines.push(&chunk);
                        state.decode(lines);
                    }
                    Some(Err(err)) => {
                        state.bytes = None;
                        return Err(err);
                    }
                    None => {
                        state.bytes = None;
                        let residual = std::mem::take(&mut state.lines).finish();
                        state.decode(residual);
                    }
                }
            }
        },
    )
}
