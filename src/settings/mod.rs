//! Settings storage for marker pairs.

pub mod json;
pub mod store;

pub use json::JsonFileStore;
pub use store::{MarkerState, MarkerStateStore, MemoryStore, PersistenceError, PersistenceWarning};
