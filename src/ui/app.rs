//! Main application UI for the capture studio shell.
//! Hosts one clip: transport row, marker ruler and in/out text fields.

use std::sync::Arc;

use eframe::egui::*;
use eframe::{App, CreationContext};
use tracing::debug;

use crate::config::StudioConfig;
use crate::core::clip::{Clip, ClipSource};
use crate::core::time::{TimeValue, ZERO};
use crate::markers::{EditKind, EditOutcome, MarkerCollection, PairState, TimeProxy};
use crate::ui::time_field::TimeField;
use crate::ui::timeline_view::TimelineView;

pub struct StudioApp {
    config: StudioConfig,
    clip: Arc<Clip>,
    markers: MarkerCollection,
    timeline: TimelineView,
    in_field: TimeField,
    out_field: TimeField,
    playhead: TimeProxy,
    status: Option<String>,
}

impl StudioApp {
    /// Called by eframe during application initialization, on the UI thread.
    pub fn new(
        _cc: &CreationContext<'_>,
        config: StudioConfig,
        clip: Arc<Clip>,
        mut markers: MarkerCollection,
    ) -> Self {
        let precision = config.precision();
        let timeline = TimelineView::new(&mut markers);
        let in_field = TimeField::new(markers.in_point(), precision);
        let out_field = TimeField::new(markers.out_point(), precision);

        let mut playhead = TimeProxy::new(clip.current_position());
        let transport = Arc::clone(&clip);
        playhead.subscribe(move |position| transport.set_playhead(position));

        Self {
            config,
            clip,
            markers,
            timeline,
            in_field,
            out_field,
            playhead,
            status: None,
        }
    }

    fn seek(&mut self, requested: TimeValue) {
        let duration = self.clip.duration();
        let position = self
            .playhead
            .set_time(requested, EditKind::Commit, |_, requested, _| requested.clamp(ZERO, duration));
        debug!(%position, "seek");
    }

    fn apply(&mut self, outcome: EditOutcome) {
        self.status = outcome.warning.map(|warning| warning.to_string());
    }

    fn state_label(&self) -> &'static str {
        match self.markers.state() {
            PairState::Clean => "saved",
            PairState::Dirty => "editing",
            PairState::Committed => "unsaved",
        }
    }
}

impl App for StudioApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let release = self.config.release_edit();
        let precision = self.config.precision();

        TopBottomPanel::top("transport")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.monospace(self.playhead.value().format_with_precision(precision));
                    if ui.button("Mark In").clicked() {
                        let outcome = self.markers.mark_in_at_playhead(release);
                        self.apply(outcome);
                    }
                    if ui.button("Mark Out").clicked() {
                        let outcome = self.markers.mark_out_at_playhead(release);
                        self.apply(outcome);
                    }
                    if ui.button("Reset").clicked() {
                        let outcome = self.markers.reset(release);
                        self.apply(outcome);
                    }
                    if ui.button("Discard").clicked() {
                        let outcome = self.markers.discard();
                        self.apply(outcome);
                    }
                    if ui.button("Save").clicked() {
                        let outcome = self.markers.save();
                        self.apply(outcome);
                    }
                    ui.separator();
                    ui.label(self.state_label());
                });
            });

        CentralPanel::default().show(ctx, |ui| {
            ui.heading(self.clip.source_path.display().to_string());

            let playhead = self.playhead.value();
            if let Some(position) = self.timeline.show(ui, &mut self.markers, release, playhead) {
                self.seek(position);
            }

            if let Some(time) = self.in_field.show(ui, "In ") {
                let outcome = self.markers.set_in_point(time, release);
                self.apply(outcome);
            }
            if let Some(time) = self.out_field.show(ui, "Out") {
                let outcome = self.markers.set_out_point(time, release);
                self.apply(outcome);
            }
            self.in_field.sync(self.markers.in_point());
            self.out_field.sync(self.markers.out_point());

            ui.label(format!(
                "Span {}",
                self.markers.span().format_with_precision(precision)
            ));
            if let Some(warning) = self.status.as_deref().or(self.timeline.last_warning()) {
                ui.colored_label(Color32::YELLOW, warning);
            }
        });
    }
}
