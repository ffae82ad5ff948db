//! Text entry for a marker time.
//!
//! Parse failures stay inside the field: the last good value is kept and
//! nothing reaches the marker collection.

use egui::{Color32, TextEdit, TextStyle, Ui};

use crate::core::time::{TimeFormatError, TimeValue};

#[derive(Debug, Clone)]
pub struct TimeField {
    value: TimeValue,
    text: String,
    error: Option<TimeFormatError>,
    precision: usize,
}

impl TimeField {
    pub fn new(value: TimeValue, precision: usize) -> Self {
        Self {
            value,
            text: value.format_with_precision(precision),
            error: None,
            precision,
        }
    }

    pub fn value(&self) -> TimeValue {
        self.value
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn error(&self) -> Option<&TimeFormatError> {
        self.error.as_ref()
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// Track an externally changed value. Text being typed survives as long
    /// as the value itself does not move.
    pub fn sync(&mut self, value: TimeValue) {
        if value != self.value {
            self.value = value;
            self.text = value.format_with_precision(self.precision);
            self.error = None;
        }
    }

    /// Parse the current text. On failure the text reverts to the last good
    /// value and the error is kept for display.
    pub fn submit(&mut self) -> Result<TimeValue, TimeFormatError> {
        match TimeValue::parse(&self.text) {
            Ok(value) => {
                self.error = None;
                Ok(value)
            }
            Err(e) => {
                self.text = self.value.format_with_precision(self.precision);
                self.error = Some(e.clone());
                Err(e)
            }
        }
    }

    /// Returns a parsed value when the user presses enter.
    pub fn show(&mut self, ui: &mut Ui, label: &str) -> Option<TimeValue> {
        let mut submitted = None;
        ui.horizontal(|ui| {
            ui.label(label);
            let response = ui.add(
                TextEdit::singleline(&mut self.text)
                    .desired_width(120.0)
                    .font(TextStyle::Monospace),
            );
            if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                submitted = self.submit().ok();
            }
            if let Some(error) = &self.error {
                ui.colored_label(Color32::LIGHT_RED, error.to_string());
            }
        });
        submitted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_text_submits() {
        let mut field = TimeField::new(TimeValue::from_seconds(10.0), 3);
        assert_eq!(field.text(), "00:00:10.000");

        field.set_text("0:45.25");
        assert_eq!(field.submit(), Ok(TimeValue::from_seconds(45.25)));
        assert!(field.error().is_none());
    }

    #[test]
    fn test_invalid_text_keeps_original_value() {
        let mut field = TimeField::new(TimeValue::from_seconds(10.0), 3);
        field.set_text("1:xx");

        assert!(matches!(field.submit(), Err(TimeFormatError::NonNumeric(_))));
        assert_eq!(field.value(), TimeValue::from_seconds(10.0));
        assert_eq!(field.text(), "00:00:10.000");
        assert!(field.error().is_some());
    }

    #[test]
    fn test_sync_only_overwrites_on_change() {
        let mut field = TimeField::new(TimeValue::from_seconds(10.0), 1);
        field.set_text("00:00:1");
        field.sync(TimeValue::from_seconds(10.0));
        assert_eq!(field.text(), "00:00:1");

        field.sync(TimeValue::from_seconds(12.0));
        assert_eq!(field.text(), "00:00:12.0");
    }
}
