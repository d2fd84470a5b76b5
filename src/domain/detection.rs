use serde::{Deserialize, Serialize};

/// Label used when a candidate's class index has no entry in the class table.
pub const UNKNOWN_LABEL: &str = "Unknown";

/// One decoded detection in the pixel space of the original image.
///
/// `x`/`y` is the top-left corner. `width`/`height` are not corrected when
/// the model emits `max < min`, so they can be negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub label: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub confidence: f32,
}

impl Detection {
    pub fn new(label: impl Into<String>, x: f32, y: f32, width: f32, height: f32, confidence: f32) -> Self {
        Self {
            label: label.into(),
            x,
            y,
            width,
            height,
            confidence,
        }
    }

    /// Box corners as `(left, top, right, bottom)`, ordered so that
    /// `left <= right` and `top <= bottom` even for inverted boxes.
    pub fn corners(&self) -> (f32, f32, f32, f32) {
        let (x2, y2) = (self.x + self.width, self.y + self.height);
        (self.x.min(x2), self.y.min(y2), self.x.max(x2), self.y.max(y2))
    }
}
