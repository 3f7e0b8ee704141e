//! Point markers and their id generator.

use serde::{Deserialize, Serialize};

/// Creation time in Unix milliseconds, strictly increasing within a session.
pub type MarkerId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub id: MarkerId,
    pub lng: f64,
    pub lat: f64,
}

impl Marker {
    /// Short label for lists: `#` plus the last four digits of the id.
    pub fn short_label(&self) -> String {
        let digits = self.id.to_string();
        let start = digits.len().saturating_sub(4);
        format!("#{}", &digits[start..])
    }
}

/// True when `lng` is in [-180, 180] and `lat` in [-90, 90].
pub fn is_valid_coordinate(lng: f64, lat: f64) -> bool {
    (-180.0..=180.0).contains(&lng) && (-90.0..=90.0).contains(&lat)
}

/// Hands out timestamp ids that never repeat, even when two markers are
/// created within the same millisecond.
#[derive(Debug, Default)]
pub struct MarkerIdGenerator {
    last: Option<MarkerId>,
}

impl MarkerIdGenerator {
    /// Next id from the clock, or `None` once the sequence has reached
    /// `MarkerId::MAX` and cannot grow any further.
    pub fn next_id(&mut self) -> Option<MarkerId> {
        self.next_at(chrono::Utc::now().timestamp_millis())
    }

    pub fn next_at(&mut self, now_ms: MarkerId) -> Option<MarkerId> {
        let id = match self.last {
            Some(last) if now_ms <= last => last.checked_add(1)?,
            _ => now_ms,
        };
        self.last = Some(id);
        Some(id)
    }

    /// Records an id created elsewhere (e.g. restored from storage) so later
    /// ids stay above it.
    pub fn observe(&mut self, id: MarkerId) {
        self.last = Some(self.last.map_or(id, |last| last.max(id)));
    }
}
