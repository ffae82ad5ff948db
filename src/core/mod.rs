//! Core types for the marker model.
//!
//! Clip-relative time, the clip boundary and the thread-affinity capability.
//! All time values are nanoseconds (i64) since clip start.

pub mod affinity;
pub mod clip;
pub mod time;

// Re-export core data structures for easier access.
pub use affinity::{ExecutionContext, ThreadAffinity};
pub use clip::{Clip, ClipId, ClipSource, StreamInfo, StreamKind};
pub use time::{TimeFormatError, TimeValue, ZERO};
