//! Edit kinds and the pair state they drive.

/// What a time request means for the marker pair.
///
/// Replaces the `dirty` / `promote` / `save` flag triple. Each step includes
/// the ones before it, so contradictory combinations cannot be expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditKind {
    /// Programmatic assignment of an authoritative value. Not an edit:
    /// the value becomes the committed one without marking the pair dirty.
    Restore,
    /// In-progress value, e.g. while a handle is being dragged.
    TransientEdit,
    /// Promote the resolved value to the committed value.
    Commit,
    /// Promote and write the committed pair to settings storage right away.
    CommitAndPersist,
}

impl EditKind {
    /// Map the legacy flag triple. `save` dominates, then `promote`, then `dirty`.
    ///
    /// All three flags false gives [`EditKind::Restore`], which still commits
    /// the value even though `promote` is false.
    pub fn from_flags(dirty: bool, promote: bool, save: bool) -> Self {
        match (dirty, promote, save) {
            (_, _, true) => EditKind::CommitAndPersist,
            (_, true, false) => EditKind::Commit,
            (true, false, false) => EditKind::TransientEdit,
            (false, false, false) => EditKind::Restore,
        }
    }

    /// Whether the resolved value becomes the committed value.
    pub fn settles(self) -> bool {
        !matches!(self, EditKind::TransientEdit)
    }

    pub fn persists(self) -> bool {
        matches!(self, EditKind::CommitAndPersist)
    }
}

/// Persistence state of a marker pair.
///
/// `Clean -> Dirty -> Committed -> Clean`: an edit makes the pair dirty,
/// promotion commits it, a successful save cleans it. There is no error
/// state; invalid requests are clamped or swapped, never refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PairState {
    /// Committed values equal the last persisted values.
    #[default]
    Clean,
    /// At least one marker holds a transient value.
    Dirty,
    /// Values are committed but not yet persisted.
    Committed,
}

impl PairState {
    pub fn is_clean(self) -> bool {
        self == PairState::Clean
    }

    pub fn has_unsaved_changes(self) -> bool {
        self != PairState::Clean
    }
}
