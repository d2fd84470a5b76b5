use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use super::detection::Detection;

/// Outcome of one detection pass over a captured image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionReport {
    pub width: u32,
    pub height: u32,
    pub infer_ms: f32,
    pub decode_ms: f32,
    pub detections: Vec<Detection>,
}

/// "2 car, 1 dog" style summary, labels in alphabetical order.
pub fn summarize_detections(detections: &[Detection]) -> String {
    let mut counts = BTreeMap::new();
    for det in detections {
        *counts.entry(det.label.as_str()).or_insert(0) += 1;
    }
    counts.iter()
        .map(|(label, count)| format!("{} {}", count, label))
        .collect::<Vec<_>>()
        .join(", ")
}
