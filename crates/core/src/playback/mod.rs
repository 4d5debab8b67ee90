//! Playback dispatch - turns a clip name into a queued play request.
//!
//! The dispatcher is the only writer of the per-guild queues; the external
//! audio engine is the only consumer.

mod dispatcher;
mod queue;

pub use dispatcher::*;
pub use queue::*;
