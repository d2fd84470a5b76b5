#![allow(dead_code)]

pub mod fakes;

use ndarray::Array3;

/// Builds a `[1][channels][slots]` output tensor with `records` written into
/// the detection row and the count slot set to `count`.
pub fn output_tensor(channels: usize, slots: usize, count: f32, records: &[[f32; 6]]) -> Array3<f32> {
    let mut t = Array3::<f32>::zeros((1, channels, slots));
    t[[0, 0, 3]] = count;
    for (i, rec) in records.iter().enumerate() {
        for (k, v) in rec.iter().enumerate() {
            t[[0, 0, 4 + i * 6 + k]] = *v;
        }
    }
    t
}

/// Tiny deterministic generator so property checks are reproducible.
pub struct Lcg(u64);

impl Lcg {
    pub fn new(seed: u64) -> Self {
        Self(seed)
    }

    /// Uniform in [0, 1).
    pub fn next_f32(&mut self) -> f32 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        ((self.0 >> 40) as f32) / ((1u64 << 24) as f32)
    }

    pub fn below(&mut self, n: usize) -> usize {
        ((self.next_f32() * n as f32) as usize).min(n.saturating_sub(1))
    }
}
