//! UI-affinity capability.
//!
//! The marker model runs on one designated thread. Instead of consulting a
//! hidden global, each owner is handed an [`ExecutionContext`] at construction
//! and checks it before touching state. A failed check is a defect and panics.

use std::fmt;
use std::thread::{self, ThreadId};

/// Answers whether the caller is running on the designated execution context.
pub trait ExecutionContext: Send + Sync + fmt::Debug {
    fn is_current(&self) -> bool;

    /// Human-readable name of the designated context, used in panic messages.
    fn describe(&self) -> String;

    /// Fail fast when invoked off the designated context.
    fn check(&self, operation: &str) {
        if !self.is_current() {
            panic!(
                "{operation} called on thread {:?} but is bound to {}",
                thread::current().name().unwrap_or("<unnamed>"),
                self.describe()
            );
        }
    }
}

/// Affinity to the thread that created it.
#[derive(Debug, Clone)]
pub struct ThreadAffinity {
    owner: ThreadId,
    name: String,
}

impl ThreadAffinity {
    /// Bind to the calling thread.
    pub fn current() -> Self {
        let current = thread::current();
        Self {
            owner: current.id(),
            name: current.name().unwrap_or("<unnamed>").to_string(),
        }
    }

    pub fn thread_id(&self) -> ThreadId {
        self.owner
    }
}

impl ExecutionContext for ThreadAffinity {
    fn is_current(&self) -> bool {
        thread::current().id() == self.owner
    }

    fn describe(&self) -> String {
        format!("thread {:?} ({:?})", self.name, self.owner)
    }
}
