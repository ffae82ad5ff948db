//! Observable holder of a single time value.

use std::fmt;

use crate::core::time::TimeValue;
use crate::markers::edit::EditKind;

/// Identifier returned by [`TimeProxy::subscribe`].
pub type ListenerId = u64;

type Listener = Box<dyn FnMut(TimeValue) + Send>;

/// A mutable time value that notifies listeners when it changes.
///
/// The proxy tracks the last committed value next to the current one; it is
/// dirty while the two differ.
pub struct TimeProxy {
    value: TimeValue,
    committed: TimeValue,
    listeners: Vec<(ListenerId, Listener)>,
    next_listener: ListenerId,
}

impl TimeProxy {
    pub fn new(value: TimeValue) -> Self {
        Self {
            value,
            committed: value,
            listeners: Vec::new(),
            next_listener: 0,
        }
    }

    pub fn value(&self) -> TimeValue {
        self.value
    }

    pub fn committed(&self) -> TimeValue {
        self.committed
    }

    pub fn is_dirty(&self) -> bool {
        self.value != self.committed
    }

    /// Request a new value.
    ///
    /// The full request goes to `owner` before any local state changes. The
    /// owner receives `(current, requested, edit)` and returns the value it
    /// lets stand; that value is stored, promoted when `edit` settles, and
    /// announced once if it differs from the previous value.
    pub fn set_time<F>(&mut self, requested: TimeValue, edit: EditKind, owner: F) -> TimeValue
    where
        F: FnOnce(TimeValue, TimeValue, EditKind) -> TimeValue,
    {
        let previous = self.value;
        let resolved = owner(previous, requested, edit);
        self.value = resolved;
        if edit.settles() {
            self.committed = resolved;
        }
        self.notify_if_changed(previous);
        resolved
    }

    /// Request a new value with no owner; the request always stands.
    pub fn set_time_unowned(&mut self, requested: TimeValue, edit: EditKind) -> TimeValue {
        self.set_time(requested, edit, |_, requested, _| requested)
    }

    pub fn subscribe(&mut self, listener: impl FnMut(TimeValue) + Send + 'static) -> ListenerId {
        let id = self.next_listener;
        self.next_listener += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    /// Write the backing store without notifying anyone.
    pub(crate) fn store_silently(&mut self, value: TimeValue) {
        self.value = value;
    }

    pub(crate) fn promote(&mut self) {
        self.committed = self.value;
    }

    /// Replace the committed value without touching the current one.
    pub(crate) fn set_committed(&mut self, value: TimeValue) {
        self.committed = value;
    }

    /// Drop a transient value in favour of the committed one, silently.
    pub(crate) fn revert(&mut self) {
        self.value = self.committed;
    }

    /// Announce the current value if it differs from `previous`.
    pub(crate) fn notify_if_changed(&mut self, previous: TimeValue) -> bool {
        if self.value == previous {
            return false;
        }
        let value = self.value;
        for (_, listener) in &mut self.listeners {
            listener(value);
        }
        true
    }
}

impl fmt::Debug for TimeProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimeProxy")
            .field("value", &self.value)
            .field("committed", &self.committed)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
