//! Marker/Polygon interaction mode and the transient "mode changed" notice.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::MODE_NOTICE_SECONDS;

use super::widget::{DrawMode, DrawingWidget};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Marker,
    Polygon,
}

impl Mode {
    pub fn all() -> &'static [Mode] {
        &[Mode::Marker, Mode::Polygon]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Mode::Marker => "Add Markers (M)",
            Mode::Polygon => "Draw Polygons (P)",
        }
    }

    pub fn hint(&self) -> &'static str {
        match self {
            Mode::Marker => "MARKER MODE: Click map to place pins",
            Mode::Polygon => "POLYGON MODE: Click to draw shapes",
        }
    }

    /// Widget mode that frees clicks for this mode.
    pub fn draw_mode(&self) -> DrawMode {
        match self {
            Mode::Marker => DrawMode::SimpleSelect,
            Mode::Polygon => DrawMode::DrawPolygon,
        }
    }
}

/// Short-lived UI feedback after a mode switch. Has no effect on state.
#[derive(Debug, Clone, PartialEq)]
pub struct ModeNotice {
    pub mode: Mode,
    remaining: Duration,
}

#[derive(Debug, Default)]
pub struct ModeController {
    mode: Mode,
    notice: Option<ModeNotice>,
}

impl ModeController {
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Switches mode, tells the widget, and raises the notice.
    /// Setting the current mode again is allowed and behaves the same.
    pub fn set_mode<W: DrawingWidget>(&mut self, mode: Mode, widget: &mut W) {
        self.apply(mode, widget);
        self.notice = Some(ModeNotice {
            mode,
            remaining: Duration::from_secs_f32(MODE_NOTICE_SECONDS),
        });
    }

    /// Same as [`set_mode`](Self::set_mode) without the notice, for replaying
    /// a saved snapshot.
    pub fn restore<W: DrawingWidget>(&mut self, mode: Mode, widget: &mut W) {
        self.apply(mode, widget);
    }

    fn apply<W: DrawingWidget>(&mut self, mode: Mode, widget: &mut W) {
        self.mode = mode;
        widget.change_mode(mode.draw_mode());
    }

    pub fn tick(&mut self, delta: Duration) {
        if let Some(notice) = &mut self.notice {
            notice.remaining = notice.remaining.saturating_sub(delta);
            if notice.remaining.is_zero() {
                self.notice = None;
            }
        }
    }

    pub fn notice(&self) -> Option<&ModeNotice> {
        self.notice.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::draw::PolygonDraw;

    #[test]
    fn test_default_mode_is_marker() {
        assert_eq!(ModeController::default().mode(), Mode::Marker);
    }

    #[test]
    fn test_set_mode_switches_widget() {
        let mut widget = PolygonDraw::default();
        let mut controller = ModeController::default();

        controller.set_mode(Mode::Polygon, &mut widget);
        assert_eq!(controller.mode(), Mode::Polygon);
        assert_eq!(widget.mode(), DrawMode::DrawPolygon);

        controller.set_mode(Mode::Marker, &mut widget);
        assert_eq!(widget.mode(), DrawMode::SimpleSelect);
    }

    #[test]
    fn test_setting_same_mode_is_allowed() {
        let mut widget = PolygonDraw::default();
        let mut controller = ModeController::default();
        controller.set_mode(Mode::Marker, &mut widget);
        controller.set_mode(Mode::Marker, &mut widget);
        assert_eq!(controller.mode(), Mode::Marker);
        assert!(controller.notice().is_some());
    }

    #[test]
    fn test_notice_expires() {
        let mut widget = PolygonDraw::default();
        let mut controller = ModeController::default();
        controller.set_mode(Mode::Polygon, &mut widget);

        controller.tick(Duration::from_millis(400));
        assert_eq!(controller.notice().map(|n| n.mode), Some(Mode::Polygon));

        controller.tick(Duration::from_millis(700));
        assert!(controller.notice().is_none());
    }

    #[test]
    fn test_restore_has_no_notice() {
        let mut widget = PolygonDraw::default();
        let mut controller = ModeController::default();
        controller.restore(Mode::Polygon, &mut widget);
        assert_eq!(controller.mode(), Mode::Polygon);
        assert!(controller.notice().is_none());
    }

    #[test]
    fn test_mode_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Mode::Polygon).unwrap(), "\"polygon\"");
        let parsed: Mode = serde_json::from_str("\"marker\"").unwrap();
        assert_eq!(parsed, Mode::Marker);
    }
}
