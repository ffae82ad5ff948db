//! Timeline markers: a time proxy tagged with a role and its owner.

use std::num::NonZeroU64;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::core::time::TimeValue;
use crate::markers::proxy::{ListenerId, TimeProxy};

/// Error type for marker construction
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MarkerError {
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
}

/// Semantic role of a marker within its pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerRole {
    InPoint,
    OutPoint,
}

impl MarkerRole {
    pub fn opposite(self) -> Self {
        match self {
            MarkerRole::InPoint => MarkerRole::OutPoint,
            MarkerRole::OutPoint => MarkerRole::InPoint,
        }
    }
}

/// Stable identity of a marker slot. Survives role swaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerId {
    A,
    B,
}

impl MarkerId {
    pub const ALL: [MarkerId; 2] = [MarkerId::A, MarkerId::B];

    pub fn index(self) -> usize {
        match self {
            MarkerId::A => 0,
            MarkerId::B => 1,
        }
    }

    pub fn other(self) -> Self {
        match self {
            MarkerId::A => MarkerId::B,
            MarkerId::B => MarkerId::A,
        }
    }
}

/// Non-owning reference from a marker back to the collection that owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OwnerId(NonZeroU64);

static NEXT_OWNER: AtomicU64 = AtomicU64::new(1);

impl OwnerId {
    /// Zero is the null owner and is rejected.
    pub fn new(raw: u64) -> Result<Self, MarkerError> {
        NonZeroU64::new(raw)
            .map(OwnerId)
            .ok_or(MarkerError::InvalidArgument("marker owner must not be null"))
    }

    pub(crate) fn allocate() -> Self {
        let raw = NEXT_OWNER.fetch_add(1, Ordering::Relaxed);
        OwnerId(NonZeroU64::new(raw).unwrap_or(NonZeroU64::MIN))
    }

    pub fn get(self) -> u64 {
        self.0.get()
    }
}

/// One of the two markers of a [`MarkerCollection`](crate::markers::MarkerCollection).
///
/// The marker never changes its own role. Role reassignment and silent
/// writes go through crate-private methods used only by the collection.
#[derive(Debug)]
pub struct TimelineMarker {
    id: MarkerId,
    role: MarkerRole,
    owner: OwnerId,
    proxy: TimeProxy,
}

impl TimelineMarker {
    pub fn new(id: MarkerId, role: MarkerRole, owner: u64, value: TimeValue) -> Result<Self, MarkerError> {
        let owner = OwnerId::new(owner)?;
        Ok(Self::with_owner(id, role, owner, value))
    }

    pub(crate) fn with_owner(id: MarkerId, role: MarkerRole, owner: OwnerId, value: TimeValue) -> Self {
        Self {
            id,
            role,
            owner,
            proxy: TimeProxy::new(value),
        }
    }

    pub fn id(&self) -> MarkerId {
        self.id
    }

    pub fn role(&self) -> MarkerRole {
        self.role
    }

    pub fn is_in_point(&self) -> bool {
        self.role == MarkerRole::InPoint
    }

    pub fn owner(&self) -> OwnerId {
        self.owner
    }

    pub fn value(&self) -> TimeValue {
        self.proxy.value()
    }

    pub fn committed(&self) -> TimeValue {
        self.proxy.committed()
    }

    pub fn is_dirty(&self) -> bool {
        self.proxy.is_dirty()
    }

    pub fn proxy(&self) -> &TimeProxy {
        &self.proxy
    }

    pub(crate) fn assign_role(&mut self, role: MarkerRole) {
        self.role = role;
    }

    pub(crate) fn proxy_mut(&mut self) -> &mut TimeProxy {
        &mut self.proxy
    }

    pub(crate) fn subscribe(&mut self, listener: impl FnMut(TimeValue) + Send + 'static) -> ListenerId {
        self.proxy.subscribe(listener)
    }
}
