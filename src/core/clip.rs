//! Clip boundary: the recorded stream the markers are positioned against.
//!
//! The recording/playback engine is external. The marker model only needs the
//! read-only view captured by [`ClipSource`].

use std::path::PathBuf;
use std::sync::atomic::{AtomicI64, Ordering};

use crate::core::time::{TimeValue, ZERO};

/// Unique identifier for a clip
pub type ClipId = u64;

/// Kind of sensor stream carried by a clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamKind {
    Depth,
    Color,
    Infrared,
    Imu,
    Audio,
}

/// Information about one stream in a recorded clip
#[derive(Debug, Clone, PartialEq)]
pub struct StreamInfo {
    pub index: usize,
    pub kind: StreamKind,
    pub duration: TimeValue,
    pub codec_name: String,
}

/// Read-only capabilities of a clip consumed by the marker model.
///
/// Implementations never see a mutation from the marker side.
pub trait ClipSource: Send + Sync {
    /// Total clip length. Markers are clamped into `[0, duration]`.
    fn duration(&self) -> TimeValue;

    /// Current playback or record position.
    fn current_position(&self) -> TimeValue;

    /// Streams contained in the clip.
    fn streams(&self) -> Vec<StreamInfo>;
}

/// A recorded clip as seen by the studio shell.
///
/// Duration and playhead are atomics so a recorder or transport can update
/// them while the UI thread holds an `Arc` to the same clip.
#[derive(Debug)]
pub struct Clip {
    pub id: ClipId,
    pub source_path: PathBuf,
    duration: AtomicI64,
    playhead: AtomicI64,
    streams: Vec<StreamInfo>,
}

impl Clip {
    /// Create a new clip
    pub fn new(id: ClipId, source_path: PathBuf, duration: TimeValue) -> Self {
        Self {
            id,
            source_path,
            duration: AtomicI64::new(duration.as_nanos().max(0)),
            playhead: AtomicI64::new(0),
            streams: Vec::new(),
        }
    }

    pub fn with_streams(mut self, streams: Vec<StreamInfo>) -> Self {
        self.streams = streams;
        self
    }

    /// Update the duration, e.g. while a recording is still growing.
    /// The playhead is pulled back inside the new bounds.
    pub fn set_duration(&self, duration: TimeValue) {
        let duration = duration.as_nanos().max(0);
        self.duration.store(duration, Ordering::Relaxed);
        let playhead = self.playhead.load(Ordering::Relaxed);
        if playhead > duration {
            self.playhead.store(duration, Ordering::Relaxed);
        }
    }

    /// Set the playhead position, clamped to [0, duration]
    pub fn set_playhead(&self, position: TimeValue) {
        let clamped = position.clamp(ZERO, self.duration());
        self.playhead.store(clamped.as_nanos(), Ordering::Relaxed);
    }
}

impl ClipSource for Clip {
    fn duration(&self) -> TimeValue {
        TimeValue::from_nanos(self.duration.load(Ordering::Relaxed))
    }

    fn current_position(&self) -> TimeValue {
        TimeValue::from_nanos(self.playhead.load(Ordering::Relaxed))
    }

    fn streams(&self) -> Vec<StreamInfo> {
        self.streams.clone()
    }
}
