//! Notifications raised by a marker collection.
//! Delivered synchronously, on the collection's affinity thread.

use crossbeam::channel::{self, Receiver, Sender};

use crate::core::time::TimeValue;
use crate::markers::edit::PairState;
use crate::markers::marker::{MarkerId, MarkerRole};

/// Identifier returned by [`Observers::subscribe`].
pub type ObserverId = u64;

#[derive(Debug, Clone, PartialEq)]
pub enum MarkerEvent {
    /// A marker settled on a new value. Always the resolved value.
    ValueChanged {
        marker: MarkerId,
        role: MarkerRole,
        value: TimeValue,
    },
    /// The two markers exchanged roles.
    RolesSwapped {
        in_point: MarkerId,
        out_point: MarkerId,
    },
    StateChanged {
        from: PairState,
        to: PairState,
    },
}

type Callback = Box<dyn FnMut(&MarkerEvent) + Send>;

/// Callback and channel subscribers of one collection.
#[derive(Default)]
pub struct Observers {
    callbacks: Vec<(ObserverId, Callback)>,
    senders: Vec<Sender<MarkerEvent>>,
    next_id: ObserverId,
}

impl Observers {
    pub fn subscribe(&mut self, callback: impl FnMut(&MarkerEvent) + Send + 'static) -> ObserverId {
        let id = self.next_id;
        self.next_id += 1;
        self.callbacks.push((id, Box::new(callback)));
        id
    }

    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        let before = self.callbacks.len();
        self.callbacks.retain(|(observer, _)| *observer != id);
        self.callbacks.len() != before
    }

    /// Events are queued on the returned receiver as they are dispatched.
    /// Dropping the receiver ends the subscription.
    pub fn channel(&mut self) -> Receiver<MarkerEvent> {
        let (tx, rx) = channel::unbounded();
        self.senders.push(tx);
        rx
    }

    pub fn dispatch(&mut self, events: &[MarkerEvent]) {
        if events.is_empty() {
            return;
        }
        for event in events {
            for (_, callback) in &mut self.callbacks {
                callback(event);
            }
        }
        self.senders
            .retain(|tx| events.iter().all(|event| tx.send(event.clone()).is_ok()));
    }

    pub fn len(&self) -> usize {
        self.callbacks.len() + self.senders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for Observers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observers")
            .field("callbacks", &self.callbacks.len())
            .field("channels", &self.senders.len())
            .finish()
    }
}
