//! Layout of the detector's raw output tensor.
//!
//! The model emits a `[1][C][D]` float tensor. Only the first row
//! (`[0][0][..]`) carries detections:
//!
//! ```text
//! index 3                   number of valid candidates (integer stored as f32)
//! 4 + i*6 .. 4 + i*6 + 5    candidate i: confidence, class index,
//!                           x_min, y_min, x_max, y_max (normalized)
//! ```

use ndarray::{ArrayView1, ArrayView3, Axis};
use serde::{Deserialize, Serialize};

use super::errors::{DomainError, DomainResult};

/// Expected `[1][channels][slots]` shape of the output tensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputLayout {
    pub channels: usize,
    pub slots: usize,
}

impl OutputLayout {
    /// Position of the candidate count inside the detection row.
    pub const COUNT_INDEX: usize = 3;
    /// Position of the first candidate record inside the detection row.
    pub const RECORD_OFFSET: usize = 4;
    /// Floats per candidate record.
    pub const RECORD_WIDTH: usize = 6;

    /// Shape exported by the reference model.
    pub const REFERENCE: OutputLayout = OutputLayout { channels: 25, slots: 8400 };

    /// Whole candidate records that fit in a detection row of `slots` floats.
    pub fn capacity_for(slots: usize) -> usize {
        slots.saturating_sub(Self::RECORD_OFFSET) / Self::RECORD_WIDTH
    }

    pub fn capacity(&self) -> usize {
        Self::capacity_for(self.slots)
    }

    pub fn shape(&self) -> [usize; 3] {
        [1, self.channels, self.slots]
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.channels == 0 || self.slots < Self::RECORD_OFFSET {
            return Err(DomainError::InvalidInput(format!(
                "output layout [1][{}][{}] cannot hold a detection row",
                self.channels, self.slots
            )));
        }
        Ok(())
    }

    /// Checks `tensor` against this layout, or against the minimal
    /// `[1][>=1][>=4]` shape when no layout is configured, and returns the
    /// detection row.
    pub fn detection_row<'a>(
        layout: Option<&OutputLayout>,
        tensor: ArrayView3<'a, f32>,
    ) -> DomainResult<ArrayView1<'a, f32>> {
        let shape = tensor.shape();
        match layout {
            Some(layout) if shape != layout.shape() => {
                return Err(DomainError::shape_mismatch(format!("{:?}", layout.shape()), shape));
            }
            None if shape[0] != 1 || shape[1] == 0 || shape[2] < Self::RECORD_OFFSET => {
                return Err(DomainError::shape_mismatch(
                    format!("[1, >=1, >={}]", Self::RECORD_OFFSET),
                    shape,
                ));
            }
            _ => {}
        }
        Ok(tensor.index_axis_move(Axis(0), 0).index_axis_move(Axis(0), 0))
    }

    /// Candidate count stored in a detection row, truncated toward zero and
    /// clamped to `[0, capacity]`. Negative and NaN counts read as zero.
    pub fn detection_count(row: &[f32]) -> usize {
        let Some(&raw) = row.get(Self::COUNT_INDEX) else {
            return 0;
        };
        // `as` truncates and saturates: NaN and negatives become 0.
        (raw as usize).min(Self::capacity_for(row.len()))
    }
}

/// One candidate as laid out in the detection row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandidateRecord {
    pub confidence: f32,
    pub class_index: f32,
    pub x_min: f32,
    pub y_min: f32,
    pub x_max: f32,
    pub y_max: f32,
}

impl CandidateRecord {
    pub fn from_slice(values: &[f32]) -> Option<Self> {
        let [confidence, class_index, x_min, y_min, x_max, y_max]: [f32; 6] = values.try_into().ok()?;
        Some(Self {
            confidence,
            class_index,
            x_min,
            y_min,
            x_max,
            y_max,
        })
    }

    /// Class index truncated toward zero.
    pub fn class_id(&self) -> i64 {
        self.class_index as i64
    }

    /// Iterates over the first `count` records of a detection row, in slot order.
    pub fn iter_row(row: &[f32], count: usize) -> impl Iterator<Item = CandidateRecord> + '_ {
        row.get(OutputLayout::RECORD_OFFSET..)
            .unwrap_or_default()
            .chunks_exact(OutputLayout::RECORD_WIDTH)
            .take(count)
            .filter_map(CandidateRecord::from_slice)
    }
}
