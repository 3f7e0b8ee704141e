//! Centralized constants used across the application.
//!
//! This module contains magic numbers and configuration values that are used
//! in multiple places or would benefit from being named constants.

/// Default window width in pixels (also used for graticule viewport calculations)
pub const DEFAULT_WINDOW_WIDTH: f32 = 1600.0;

/// Default window height in pixels (also used for graticule viewport calculations)
pub const DEFAULT_WINDOW_HEIGHT: f32 = 900.0;

/// How long the "mode changed" overlay stays up, in seconds
pub const MODE_NOTICE_SECONDS: f32 = 1.0;

/// Map center on first launch (New Delhi), as `[lng, lat]`
pub const DEFAULT_CENTER: [f64; 2] = [77.209, 28.6139];

/// World units per degree of longitude/latitude in the map view
pub const WORLD_UNITS_PER_DEGREE: f64 = 1000.0;

/// Initial orthographic scale, chosen so the default view spans a city
pub const DEFAULT_ZOOM: f32 = 0.05;

/// Degrees moved per arrow key press when nudging a polygon
pub const NUDGE_DEGREES: f64 = 0.0001;

/// Pin radius in screen pixels
pub const PIN_RADIUS_PX: f32 = 7.0;
