//! Turns the detector's raw output tensor into [`Detection`]s.
//!
//! Decoding is a pure, single pass over the detection row. Candidates come
//! out in slot order; there is no sorting, deduplication or non-maximum
//! suppression.

use std::borrow::Cow;

use ndarray::ArrayView3;

use super::detection::Detection;
use super::errors::DomainResult;
use super::labels::ClassTable;
use super::model::GeometryPolicy;
use super::tensor::{CandidateRecord, OutputLayout};

#[derive(Debug, Clone, Default)]
pub struct DetectionDecoder {
    layout: Option<OutputLayout>,
    geometry: GeometryPolicy,
}

impl DetectionDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejects any tensor whose shape is not exactly `layout`.
    pub fn with_layout(mut self, layout: OutputLayout) -> Self {
        self.layout = Some(layout);
        self
    }

    pub fn with_geometry(mut self, geometry: GeometryPolicy) -> Self {
        self.geometry = geometry;
        self
    }

    /// Decodes every candidate whose confidence is strictly above
    /// `confidence_threshold`, rescaling normalized boxes to an image of
    /// `image_width` x `image_height` pixels.
    pub fn decode(
        &self,
        tensor: ArrayView3<'_, f32>,
        classes: &ClassTable,
        image_width: f32,
        image_height: f32,
        confidence_threshold: f32,
    ) -> DomainResult<Vec<Detection>> {
        let row = OutputLayout::detection_row(self.layout.as_ref(), tensor)?;
        let row: Cow<'_, [f32]> = match row.as_slice() {
            Some(values) => Cow::Borrowed(values),
            None => Cow::Owned(row.to_vec()),
        };

        let count = OutputLayout::detection_count(&row);
        let detections = CandidateRecord::iter_row(&row, count)
            .filter(|record| record.confidence > confidence_threshold)
            .map(|record| self.rescale(&record, classes, image_width, image_height))
            .collect();
        Ok(detections)
    }

    fn rescale(&self, record: &CandidateRecord, classes: &ClassTable, width: f32, height: f32) -> Detection {
        let norm = |v: f32| match self.geometry {
            GeometryPolicy::Passthrough => v,
            GeometryPolicy::Clamp => v.clamp(0.0, 1.0),
        };

        let x = norm(record.x_min) * width;
        let y = norm(record.y_min) * height;
        let x_max = norm(record.x_max) * width;
        let y_max = norm(record.y_max) * height;

        Detection {
            label: classes.label_for(record.class_id()).to_string(),
            x,
            y,
            width: x_max - x,
            height: y_max - y,
            confidence: record.confidence,
        }
    }
}

/// Decodes with no expected layout and unclamped geometry.
pub fn decode(
    tensor: ArrayView3<'_, f32>,
    classes: &ClassTable,
    image_width: f32,
    image_height: f32,
    confidence_threshold: f32,
) -> DomainResult<Vec<Detection>> {
    DetectionDecoder::default().decode(tensor, classes, image_width, image_height, confidence_threshold)
}
