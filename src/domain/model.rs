use serde::{Deserialize, Serialize};

use super::errors::{DomainError, DomainResult};
use super::tensor::OutputLayout;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelId {
    pub name: String,      // logical name, e.g. "best_float32"
    pub onnx_path: String, // filesystem path
}

/// What the decoder does with normalized coordinates outside `[0, 1]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeometryPolicy {
    /// Values are rescaled as emitted by the model.
    #[default]
    Passthrough,
    /// Values are clamped to `[0, 1]` before rescaling.
    Clamp,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorParams {
    pub input_size: u32,                     // square side fed to the model, 640 typical
    pub conf_threshold: f32,                 // strict lower bound on confidence
    pub output_layout: Option<OutputLayout>, // expected [1][C][D], None accepts any
    pub geometry: GeometryPolicy,
    pub intra_threads: usize,
}

impl Default for DetectorParams {
    fn default() -> Self {
        Self {
            input_size: 640,
            conf_threshold: 0.1,
            output_layout: None,
            geometry: GeometryPolicy::Passthrough,
            intra_threads: 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceConfig {
    pub model: ModelId,
    pub labels_path: String,
    #[serde(default)]
    pub params: DetectorParams,
}

impl InferenceConfig {
    pub fn validate(&self) -> DomainResult<()> {
        if self.model.onnx_path.trim().is_empty() {
            return Err(DomainError::InvalidInput("onnx_path empty".into()));
        }
        if self.labels_path.trim().is_empty() {
            return Err(DomainError::InvalidInput("labels_path empty".into()));
        }
        if self.params.input_size == 0 {
            return Err(DomainError::InvalidInput("input_size must be positive".into()));
        }
        if !self.params.conf_threshold.is_finite() {
            return Err(DomainError::InvalidInput("conf_threshold must be finite".into()));
        }
        if self.params.intra_threads == 0 {
            return Err(DomainError::InvalidInput("intra_threads must be positive".into()));
        }
        if let Some(layout) = &self.params.output_layout {
            layout.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> InferenceConfig {
        InferenceConfig {
            model: ModelId {
                name: "best".into(),
                onnx_path: "models/best.onnx".into(),
            },
            labels_path: "models/class.txt".into(),
            params: DetectorParams::default(),
        }
    }

    #[test]
    fn defaults_match_reference_model() {
        let params = DetectorParams::default();
        assert_eq!(params.input_size, 640);
        assert!((params.conf_threshold - 0.1).abs() < f32::EPSILON);
        assert_eq!(params.geometry, GeometryPolicy::Passthrough);
        assert!(config().validate().is_ok());
    }

    #[test]
    fn rejects_empty_paths_and_zero_sizes() {
        let mut cfg = config();
        cfg.model.onnx_path = "  ".into();
        assert!(matches!(cfg.validate(), Err(DomainError::InvalidInput(_))));

        let mut cfg = config();
        cfg.labels_path.clear();
        assert!(matches!(cfg.validate(), Err(DomainError::InvalidInput(_))));

        let mut cfg = config();
        cfg.params.input_size = 0;
        assert!(matches!(cfg.validate(), Err(DomainError::InvalidInput(_))));

        let mut cfg = config();
        cfg.params.output_layout = Some(OutputLayout { channels: 25, slots: 2 });
        assert!(matches!(cfg.validate(), Err(DomainError::InvalidInput(_))));
    }

    #[test]
    fn params_deserialize_with_defaults() {
        let cfg: InferenceConfig = serde_json::from_str(
            r#"{"model":{"name":"m","onnx_path":"m.onnx"},"labels_path":"c.txt","params":{"conf_threshold":0.5,"geometry":"clamp"}}"#,
        )
        .unwrap();
        assert_eq!(cfg.params.input_size, 640);
        assert_eq!(cfg.params.geometry, GeometryPolicy::Clamp);
        assert!((cfg.params.conf_threshold - 0.5).abs() < f32::EPSILON);
    }
}
