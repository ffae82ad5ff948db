//! Timeline ruler showing the in/out range of a clip.
//!
//! Dragging a handle sends transient edits; releasing it commits. A handle
//! dragged past the other one passes through it and changes role.

use crossbeam::channel::Receiver;
use egui::{pos2, vec2, Align2, Color32, FontId, Rect, Sense, Stroke, Ui};

use crate::core::time::{TimeValue, ZERO};
use crate::markers::{EditKind, MarkerCollection, MarkerEvent, MarkerId, MarkerRole};

const RULER_HEIGHT: f32 = 48.0;
/// Horizontal distance within which a press grabs a handle.
const HANDLE_GRAB_RADIUS: f32 = 8.0;

const IN_COLOR: Color32 = Color32::from_rgb(90, 200, 120);
const OUT_COLOR: Color32 = Color32::from_rgb(230, 110, 80);

/// Map a clip time to an x coordinate inside `[left, left + width]`.
pub fn time_to_x(time: TimeValue, duration: TimeValue, left: f32, width: f32) -> f32 {
    if duration <= ZERO {
        return left;
    }
    let fraction = (time.as_seconds() / duration.as_seconds()).clamp(0.0, 1.0);
    left + fraction as f32 * width
}

/// Inverse of [`time_to_x`]; positions outside the ruler map to its ends.
pub fn x_to_time(x: f32, duration: TimeValue, left: f32, width: f32) -> TimeValue {
    if width <= 0.0 || duration <= ZERO {
        return ZERO;
    }
    let fraction = ((x - left) / width).clamp(0.0, 1.0) as f64;
    TimeValue::from_seconds(duration.as_seconds() * fraction)
}

/// The handle closest to `x`, if one is within grabbing distance.
pub fn pick_marker(x: f32, handles: [(MarkerId, f32); 2]) -> Option<MarkerId> {
    handles
        .into_iter()
        .map(|(id, handle_x)| (id, (handle_x - x).abs()))
        .filter(|(_, distance)| *distance <= HANDLE_GRAB_RADIUS)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(id, _)| id)
}

pub struct TimelineView {
    drag: Option<MarkerId>,
    events: Receiver<MarkerEvent>,
    last_warning: Option<String>,
}

impl TimelineView {
    pub fn new(markers: &mut MarkerCollection) -> Self {
        Self {
            drag: None,
            events: markers.event_channel(),
            last_warning: None,
        }
    }

    pub fn dragging(&self) -> Option<MarkerId> {
        self.drag
    }

    pub fn last_warning(&self) -> Option<&str> {
        self.last_warning.as_deref()
    }

    /// Paint the ruler and route drags into `markers`.
    /// Returns a seek position when the ruler is clicked.
    pub fn show(
        &mut self,
        ui: &mut Ui,
        markers: &mut MarkerCollection,
        release_edit: EditKind,
        playhead: TimeValue,
    ) -> Option<TimeValue> {
        let (rect, response) =
            ui.allocate_exact_size(vec2(ui.available_width(), RULER_HEIGHT), Sense::click_and_drag());
        let duration = markers.clip().duration();
        let to_x = |time: TimeValue| time_to_x(time, duration, rect.left(), rect.width());

        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 2.0, Color32::from_gray(28));

        let range = markers.range();
        let selection = Rect::from_min_max(
            pos2(to_x(range.in_point), rect.top()),
            pos2(to_x(range.out_point), rect.bottom()),
        );
        painter.rect_filled(selection, 0.0, Color32::from_rgba_unmultiplied(90, 140, 220, 60));

        let mut handles = [(MarkerId::A, 0.0); 2];
        for (slot, id) in MarkerId::ALL.into_iter().enumerate() {
            let marker = markers.marker(id);
            let x = to_x(marker.value());
            handles[slot] = (id, x);
            let (color, label) = match marker.role() {
                MarkerRole::InPoint => (IN_COLOR, "I"),
                MarkerRole::OutPoint => (OUT_COLOR, "O"),
            };
            painter.line_segment([pos2(x, rect.top()), pos2(x, rect.bottom())], Stroke::new(2.0, color));
            painter.text(pos2(x, rect.top()), Align2::CENTER_TOP, label, FontId::monospace(10.0), color);
        }

        let playhead_x = to_x(playhead);
        painter.line_segment(
            [pos2(playhead_x, rect.top()), pos2(playhead_x, rect.bottom())],
            Stroke::new(1.0, Color32::WHITE),
        );

        if response.drag_started() {
            self.drag = response
                .interact_pointer_pos()
                .and_then(|pos| pick_marker(pos.x, handles));
        }

        if let Some(id) = self.drag {
            if response.dragged() {
                if let Some(pos) = response.interact_pointer_pos() {
                    let time = x_to_time(pos.x, duration, rect.left(), rect.width());
                    let _ = markers.marker_mut(id).set_time(time, EditKind::TransientEdit);
                }
            }
            if response.drag_stopped() {
                // Commit whatever the last transient value resolved to.
                let time = markers.marker(id).value();
                let outcome = markers.marker_mut(id).set_time(time, release_edit);
                self.last_warning = outcome.warning.map(|warning| warning.to_string());
                self.drag = None;
            }
        }

        if self.events.try_iter().count() > 0 {
            ui.ctx().request_repaint();
        }

        if response.clicked() && self.drag.is_none() {
            return response
                .interact_pointer_pos()
                .map(|pos| x_to_time(pos.x, duration, rect.left(), rect.width()));
        }
        None
    }
}
