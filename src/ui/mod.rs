//! egui shell around the marker model.
//! Runs on the UI thread that owns every marker collection.

pub mod app;
pub mod time_field;
pub mod timeline_view;

pub use app::StudioApp;
pub use time_field::TimeField;
pub use timeline_view::TimelineView;
