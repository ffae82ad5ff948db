//! In/out timeline markers.
//!
//! A [`MarkerCollection`] owns exactly two [`TimelineMarker`]s for one clip.
//! Each marker wraps a [`TimeProxy`]; the collection resolves every request
//! before the marker's own notification fires.

pub mod collection;
pub mod edit;
pub mod event;
pub mod marker;
pub mod proxy;

pub use collection::{EditOutcome, MarkerCollection, MarkerEdit};
pub use edit::{EditKind, PairState};
pub use event::{MarkerEvent, ObserverId, Observers};
pub use marker::{MarkerError, MarkerId, MarkerRole, OwnerId, TimelineMarker};
pub use proxy::{ListenerId, TimeProxy};
