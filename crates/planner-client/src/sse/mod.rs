//! Incremental decoding of the `text/event-stream` body.
//!
//! [`LineBuffer`] reassembles logical lines from arbitrary chunks and
//! [`parse_frame`] turns each `data:` line into an event or a classified
//! error.
mod frame;
mod lines;

pub use frame::{DATA_PREFIX, extract_event, parse_frame};
pub use lines::LineBuffer;
