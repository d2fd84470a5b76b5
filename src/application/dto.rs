use serde::{Deserialize, Serialize};

use crate::domain::model::{DetectorParams, InferenceConfig, ModelId};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DetectQuery {
    pub threshold: Option<f32>,
}

/// Flat form of [`InferenceConfig`] accepted by `POST /api/config`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigureDetectorRequest {
    #[serde(default)]
    pub model_name: Option<String>,
    pub onnx_path: String,
    pub labels_path: String,
    #[serde(default)]
    pub params: DetectorParams,
}

impl From<ConfigureDetectorRequest> for InferenceConfig {
    fn from(r: ConfigureDetectorRequest) -> Self {
        let name = r.model_name.unwrap_or_else(|| model_name_from_path(&r.onnx_path));
        InferenceConfig {
            model: ModelId { name, onnx_path: r.onnx_path },
            labels_path: r.labels_path,
            params: r.params,
        }
    }
}

/// File stem of a model path, `"model"` when there is none.
pub fn model_name_from_path(path: &str) -> String {
    std::path::Path::new(path)
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "model".to_string())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigResponse {
    pub configured: bool,
    pub config: Option<InferenceConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OkResponse {
    pub ok: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
