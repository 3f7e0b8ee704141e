//! Centralized color theme for the application.
//!
//! This module provides all colors used throughout the map view and UI.
//! Modify values here to change the application's color scheme.

use bevy::prelude::Color;

// ============================================================================
// Map Colors
// ============================================================================

/// Dark slate behind the map
pub const MAP_BACKGROUND: Color = Color::srgb(0.09, 0.11, 0.14);

/// Semi-transparent grey graticule lines
pub const GRATICULE_COLOR: Color = Color::srgba(0.5, 0.5, 0.5, 0.25);

/// Equator and prime meridian
pub const MERIDIAN_COLOR: Color = Color::srgba(0.6, 0.6, 0.7, 0.6);

/// Outline of the -180..180 / -90..90 world rectangle
pub const WORLD_EDGE_COLOR: Color = Color::srgba(0.8, 0.8, 0.8, 0.8);

// ============================================================================
// Annotation Colors
// ============================================================================

/// Finished polygon outlines and vertices
pub const POLYGON_OUTLINE: Color = Color::srgb(0.2, 0.8, 0.4);

/// Edges of the polygon being drawn
pub const POLYGON_PREVIEW: Color = Color::srgba(1.0, 0.7, 0.2, 0.9);

/// Dashed-looking closing edge back to the first vertex
pub const POLYGON_PREVIEW_CLOSING: Color = Color::srgba(1.0, 0.7, 0.2, 0.35);

/// Light blue for the selected polygon
pub const SELECTION_COLOR: Color = Color::srgb(0.2, 0.6, 1.0);

/// Default pin color (red)
pub const PIN_COLOR: Color = Color::srgb(0.9, 0.15, 0.15);

/// Pin highlighted from the marker list
pub const PIN_SELECTED: Color = Color::srgb(1.0, 0.85, 0.1);

// ============================================================================
// UI Colors (egui)
// ============================================================================

pub mod ui {
    use bevy_egui::egui;

    /// Dark grey panel background
    pub const PANEL_BACKGROUND: egui::Color32 = egui::Color32::from_rgb(45, 45, 48);

    /// Light grey for label text
    pub const LABEL_TEXT: egui::Color32 = egui::Color32::LIGHT_GRAY;

    /// Grey for help/hint text
    pub const HINT_TEXT: egui::Color32 = egui::Color32::GRAY;

    /// Highlight of the active mode button and selected list row
    pub const ACTIVE_FILL: egui::Color32 = egui::Color32::from_rgb(40, 90, 160);

    /// Green for successful operations and the area readout
    pub const SUCCESS_TEXT: egui::Color32 = egui::Color32::from_rgb(100, 200, 100);

    /// Red for error messages
    pub const ERROR_TEXT: egui::Color32 = egui::Color32::RED;

    /// Semi-transparent black behind the mode notice
    pub const NOTICE_BACKGROUND: egui::Color32 = egui::Color32::from_black_alpha(180);
}
