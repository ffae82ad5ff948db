//! Capture studio shell: timeline in/out markers over recorded sensor clips.
//!
//! The core is [`markers::MarkerCollection`], which owns the in-point and
//! out-point of one clip, keeps them ordered and inside the clip, and decides
//! when edits are committed and persisted. Everything else is the boundary
//! around it: clip-relative time, the clip source, settings storage and a
//! thin egui shell.

pub mod config;
pub mod core;
pub mod markers;
pub mod settings;
pub mod ui;

pub use crate::config::{ConfigError, StudioConfig};
pub use crate::core::{Clip, ClipSource, ExecutionContext, ThreadAffinity, TimeFormatError, TimeValue};
pub use crate::markers::{EditKind, EditOutcome, MarkerCollection, MarkerEvent, MarkerId, MarkerRole, PairState};
pub use crate::settings::{JsonFileStore, MarkerState, MarkerStateStore, MemoryStore, PersistenceWarning};
